//! CLI command for displaying resolved dependencies
//!
//! Implements the `arpadroid deps` command.

use anyhow::Result;

use super::CommandContext;
use crate::core::styles::StyleAggregator;

/// Execute the deps command
pub fn execute(context: &CommandContext, project: Option<String>) -> Result<()> {
    let workspace = context.workspace()?;
    let project = context.project(&workspace, project, None)?;
    let output = &context.output;

    output.line(&format!("{} ({})", project.name(), project.path().display()));

    let dependencies = project.dependencies(&workspace.build_order());
    if dependencies.is_empty() {
        output.line("  dependencies: none");
    } else {
        output.line("  dependencies:");
        for name in &dependencies {
            let marker = if workspace.project(name).is_valid() {
                ""
            } else {
                " (missing)"
            };
            output.line(&format!("    {name}{marker}"));
        }
    }

    let style_packages = StyleAggregator::new(&workspace).style_packages(&project);
    output.line(&format!("  style order: {}", style_packages.join(", ")));

    if project.themes().is_empty() {
        output.line("  themes: none");
    } else {
        output.line(&format!("  themes: {}", project.themes().join(", ")));
    }

    let runner = workspace.settings().script_runner();
    match project.build_command(runner, false, false) {
        Some(command) => output.line(&format!("  build command: {command}")),
        None => output.line("  build command: none"),
    }
    Ok(())
}
