//! Stylesheet bundler invocation
//!
//! Drives the `@arpadroid/stylesheet-bundler` themes bundler through Node, or a
//! configured command. The request is passed as JSON in an environment variable.

use serde::Serialize;
use std::path::PathBuf;

use crate::config::defaults::STYLE_CONFIG_ENV;
use crate::core::toolchain::{StyleBundleRequest, StylesheetCompiler};
use crate::error::BuildError;
use crate::infra::process;

const BUNDLER_SCRIPT: &str = "import StylesheetBundler from '@arpadroid/stylesheet-bundler'; \
const config = JSON.parse(process.env.ARPADROID_STYLE_CONFIG); \
await new StylesheetBundler.ThemesBundler(config).initialize();";

/// Bundler configuration as the themes bundler expects it
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThemesConfig<'a> {
    export_path: &'a PathBuf,
    minify: bool,
    patterns: &'a [String],
    slim: bool,
    themes: Vec<ThemePath<'a>>,
}

#[derive(Debug, Serialize)]
struct ThemePath<'a> {
    path: &'a PathBuf,
}

impl<'a> From<&'a StyleBundleRequest> for ThemesConfig<'a> {
    fn from(request: &'a StyleBundleRequest) -> Self {
        Self {
            export_path: &request.export_path,
            minify: request.minify,
            patterns: &request.patterns,
            slim: request.slim,
            themes: request.themes.iter().map(|path| ThemePath { path }).collect(),
        }
    }
}

/// Node-backed stylesheet compiler
#[derive(Debug, Clone)]
pub struct ThemesBundler {
    node: String,
    command: Option<String>,
    verbose: bool,
}

impl ThemesBundler {
    /// Run the bundler library with `node`
    pub fn new(node: impl Into<String>, verbose: bool) -> Self {
        Self {
            node: node.into(),
            command: None,
            verbose,
        }
    }

    /// Run `command` instead of the bundler library
    #[must_use]
    pub fn with_command(mut self, command: Option<String>) -> Self {
        self.command = command;
        self
    }

    fn command_line(&self) -> String {
        match &self.command {
            Some(command) => command.clone(),
            None => format!("{} --input-type=module -e \"{BUNDLER_SCRIPT}\"", self.node),
        }
    }
}

impl StylesheetCompiler for ThemesBundler {
    fn bundle(&self, request: &StyleBundleRequest) -> Result<(), BuildError> {
        let payload = serde_json::to_string(&ThemesConfig::from(request)).map_err(|e| {
            BuildError::ToolLaunch {
                package: request.project.clone(),
                tool: "stylesheet bundler".to_string(),
                error: e.to_string(),
            }
        })?;
        tracing::debug!(
            "{}: bundling {} theme(s) into {}",
            request.project,
            request.themes.len(),
            request.export_path.display()
        );

        let mut command = process::shell(&self.command_line());
        command.current_dir(&request.cwd).env(STYLE_CONFIG_ENV, payload);
        process::run_tool(&request.project, "stylesheet bundler", &mut command, self.verbose)?;
        Ok(())
    }
}
