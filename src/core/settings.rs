//! Workspace settings
//!
//! Reads optional settings from `arpadroid.toml` in the workspace base path.
//! Every field is optional; unset fields fall back to [`crate::config::defaults`].

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::defaults;
use crate::error::SettingsError;

/// Settings for a workspace of arpadroid packages
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Package layout and ordering
    #[serde(default)]
    pub workspace: WorkspaceSettings,

    /// Component explorer settings
    #[serde(default)]
    pub storybook: StorybookSettings,

    /// Test runner settings
    #[serde(default)]
    pub test: TestSettings,

    /// External tool command overrides
    #[serde(default)]
    pub tools: ToolSettings,
}

/// Package layout and ordering
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceSettings {
    /// npm scope of the package family (e.g. `@arpadroid`)
    pub namespace: Option<String>,

    /// Directory holding sibling packages, relative to the base path
    pub packages_dir: Option<String>,

    /// Build priority list
    pub build_order: Option<Vec<String>>,

    /// Style concatenation priority list
    pub style_order: Option<Vec<String>>,

    /// Command prefix used to run package scripts
    pub script_runner: Option<String>,
}

/// Component explorer settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorybookSettings {
    /// Port for the dev server and the test runner
    pub port: Option<u16>,

    /// Configuration directory, relative to the project
    pub config_dir: Option<String>,
}

/// Test runner settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TestSettings {
    /// Space separated browser list
    pub browsers: Option<String>,
}

/// External tool command overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolSettings {
    /// Bundler command
    pub rollup: Option<String>,

    /// Stylesheet bundler command
    pub stylesheet_bundler: Option<String>,

    /// Type declaration compiler command
    pub tsc: Option<String>,

    /// Node.js executable
    pub node: Option<String>,

    /// Component explorer command
    pub storybook: Option<String>,
}

impl Settings {
    /// Load settings from `arpadroid.toml` in `base_path`
    ///
    /// A missing file yields the defaults; an unreadable or invalid file is an error.
    pub fn load(base_path: &Path) -> Result<Self, SettingsError> {
        Self::load_from_path(&base_path.join(defaults::SETTINGS_FILE))
    }

    /// Load settings from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SettingsError::ReadError {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| SettingsError::ParseError {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Effective npm scope
    pub fn namespace(&self) -> &str {
        self.workspace
            .namespace
            .as_deref()
            .unwrap_or(defaults::NAMESPACE)
    }

    /// Namespace prefix that package names carry in manifests (`@scope/`)
    pub fn namespace_prefix(&self) -> String {
        format!("{}/", self.namespace().trim_end_matches('/'))
    }

    /// Effective sibling package directory
    pub fn packages_dir(&self) -> &str {
        self.workspace
            .packages_dir
            .as_deref()
            .unwrap_or(defaults::PACKAGES_DIR)
    }

    /// Effective build priority list
    pub fn build_order(&self) -> Vec<String> {
        self.workspace
            .build_order
            .clone()
            .unwrap_or_else(|| to_owned_list(defaults::BUILD_ORDER))
    }

    /// Effective style priority list
    pub fn style_order(&self) -> Vec<String> {
        self.workspace
            .style_order
            .clone()
            .unwrap_or_else(|| to_owned_list(defaults::STYLE_ORDER))
    }

    /// Effective script runner prefix
    pub fn script_runner(&self) -> &str {
        self.workspace
            .script_runner
            .as_deref()
            .unwrap_or(defaults::SCRIPT_RUNNER)
    }

    /// Effective component explorer port
    pub fn storybook_port(&self) -> u16 {
        self.storybook
            .port
            .unwrap_or(defaults::DEFAULT_STORYBOOK_PORT)
    }

    /// Effective browser list
    pub fn browsers(&self) -> &str {
        self.test
            .browsers
            .as_deref()
            .unwrap_or(defaults::DEFAULT_BROWSERS)
    }

    /// Component explorer configuration directory, relative to a package
    pub fn storybook_config_dir(&self) -> &str {
        self.storybook
            .config_dir
            .as_deref()
            .unwrap_or(defaults::STORYBOOK_CONFIG_DIR)
    }

    /// Node.js executable
    pub fn node(&self) -> &str {
        self.tools.node.as_deref().unwrap_or(defaults::NODE_COMMAND)
    }

    /// Bundler command override
    pub fn rollup(&self) -> Option<&str> {
        self.tools.rollup.as_deref()
    }

    /// Stylesheet bundler command override
    pub fn stylesheet_bundler(&self) -> Option<&str> {
        self.tools.stylesheet_bundler.as_deref()
    }

    /// Type declaration compiler command override
    pub fn tsc(&self) -> Option<&str> {
        self.tools.tsc.as_deref()
    }

    /// Component explorer command override
    pub fn storybook_command(&self) -> Option<&str> {
        self.tools.storybook.as_deref()
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
