//! Default configuration values

/// npm scope shared by every package in the family
pub const NAMESPACE: &str = "@arpadroid";

/// Where sibling packages live relative to the base path
pub const PACKAGES_DIR: &str = "node_modules/@arpadroid";

/// Build priority: packages listed here are built before any others, in this order
pub const BUILD_ORDER: &[&str] = &[
    "tools",
    "i18n",
    "application",
    "ui",
    "lists",
    "navigation",
    "messages",
    "form",
];

/// Style priority: order in which dependency stylesheets are concatenated
pub const STYLE_ORDER: &[&str] = &["ui", "lists", "navigation", "messages", "form"];

/// Package whose fonts and icon symbols are propagated to consumers
pub const UI_PACKAGE: &str = "ui";

/// Command prefix used to run package scripts
pub const SCRIPT_RUNNER: &str = "npm run";

/// Workspace settings file name
pub const SETTINGS_FILE: &str = "arpadroid.toml";

/// Default component explorer port
pub const DEFAULT_STORYBOOK_PORT: u16 = 6006;

/// Default browsers for the storybook test runner
pub const DEFAULT_BROWSERS: &str = "webkit chromium firefox";

/// Default build kind
pub const DEFAULT_BUILD_TARGET: &str = "ui-component";

/// Environment variable carrying the serialized compiler configuration to rollup
pub const BUILD_CONFIG_ENV: &str = "ARPADROID_BUILD_CONFIG";

/// Watch debounce window in milliseconds
pub const WATCH_DEBOUNCE_MS: u64 = 500;

/// Component explorer configuration directory, relative to a package
pub const STORYBOOK_CONFIG_DIR: &str = ".storybook";

/// Name of the static component explorer server process in CI
pub const STORYBOOK_CI_SERVER: &str = "srv-storybook";

/// Node.js executable
pub const NODE_COMMAND: &str = "node";

/// Bundler executable
pub const ROLLUP_COMMAND: &str = "rollup";

/// Type declaration compiler executable
pub const TSC_COMMAND: &str = "tsc";

/// Component explorer executable
pub const STORYBOOK_COMMAND: &str = "storybook";

/// Bundler configuration inside the shared tooling package
pub const ROLLUP_CONFIG: &str = "src/rollup/rollup.config.mjs";

/// Environment variable carrying the stylesheet bundler request
pub const STYLE_CONFIG_ENV: &str = "ARPADROID_STYLE_CONFIG";
