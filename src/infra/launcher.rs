//! Component explorer launcher

use std::path::PathBuf;
use std::process::{Child, Stdio};

use crate::core::project::Project;
use crate::core::workspace::Workspace;
use crate::error::BuildError;
use crate::infra::process;

/// Starts the storybook dev server for a package
#[derive(Debug, Clone)]
pub struct StorybookLauncher {
    program: String,
    config_dir: String,
}

impl StorybookLauncher {
    /// Launcher using the workspace's storybook command and configuration directory
    pub fn for_workspace(workspace: &Workspace) -> Self {
        let settings = workspace.settings();
        let program = settings.storybook_command().map_or_else(
            || process::resolve_tool(crate::config::defaults::STORYBOOK_COMMAND, &workspace.tooling_path()),
            str::to_string,
        );
        Self {
            program,
            config_dir: settings.storybook_config_dir().to_string(),
        }
    }

    /// Configuration directory for `project`
    pub fn config_path(&self, project: &Project) -> PathBuf {
        project.path().join(&self.config_dir)
    }

    /// Dev server command line
    pub fn dev_command(&self, project: &Project, port: u16) -> String {
        format!(
            "{} dev -p {port} -c {}",
            self.program,
            process::quote_path(&self.config_path(project))
        )
    }

    /// Spawn the dev server; the caller owns the child process
    pub fn dev(&self, project: &Project, port: u16) -> Result<Child, BuildError> {
        let line = self.dev_command(project, port);
        tracing::info!("{}: starting storybook on port {port}", project.name());
        tracing::debug!("{line}");
        process::shell(&line)
            .current_dir(project.path())
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| BuildError::ToolLaunch {
                package: project.name().to_string(),
                tool: "storybook".to_string(),
                error: e.to_string(),
            })
    }
}
