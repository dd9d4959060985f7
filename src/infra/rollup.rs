//! Bundler invocation
//!
//! Runs Rollup with the shared configuration from the tooling package. The
//! per-package [`CompilerConfig`] travels to it as JSON in an environment variable.

use std::path::PathBuf;

use crate::config::defaults::BUILD_CONFIG_ENV;
use crate::core::compiler::CompilerConfig;
use crate::core::toolchain::PackageCompiler;
use crate::error::BuildError;
use crate::infra::process;

/// Rollup-backed package compiler
#[derive(Debug, Clone)]
pub struct RollupCompiler {
    program: String,
    config_file: PathBuf,
    verbose: bool,
}

impl RollupCompiler {
    /// Create a compiler running `program --config <config_file>`
    pub fn new(program: impl Into<String>, config_file: PathBuf, verbose: bool) -> Self {
        Self {
            program: program.into(),
            config_file,
            verbose,
        }
    }

    /// Command line without the environment
    pub fn command_line(&self) -> String {
        format!("{} --config {}", self.program, process::quote_path(&self.config_file))
    }
}

impl PackageCompiler for RollupCompiler {
    fn compile(&self, config: &CompilerConfig) -> Result<(), BuildError> {
        let payload = config.to_json().map_err(|e| BuildError::ToolLaunch {
            package: config.project.clone(),
            tool: "rollup".to_string(),
            error: e.to_string(),
        })?;

        let mut command = process::shell(&self.command_line());
        command.current_dir(&config.cwd).env(BUILD_CONFIG_ENV, payload);
        process::run_tool(&config.project, "rollup", &mut command, self.verbose)?;
        Ok(())
    }
}
