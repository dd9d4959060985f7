//! Build command implementation
//!
//! Implements `arpadroid build`: builds one package, its sibling dependencies
//! first, then optionally keeps watching or serves storybook until Ctrl-C.

use std::path::PathBuf;

use anyhow::{Context, Result};

use super::CommandContext;
use crate::core::compiler::BuildTarget;
use crate::core::coordinator::{BuildCoordinator, BuildResult};
use crate::core::options::BuildOptions;
use crate::infra::launcher::StorybookLauncher;

/// Arguments of `arpadroid build`
#[derive(Debug, Clone, Default)]
pub struct BuildArgs {
    pub project: Option<String>,
    pub path: Option<PathBuf>,
    pub slim: bool,
    pub minify: bool,
    pub watch: bool,
    pub deps: Vec<String>,
    pub style_patterns: Vec<String>,
    pub storybook: Option<Option<u16>>,
    pub except: Vec<String>,
    pub target: String,
}

/// Execute the build command
pub async fn execute(context: &CommandContext, args: BuildArgs) -> Result<()> {
    let target: BuildTarget = args.target.parse()?;
    let workspace = context.workspace()?;
    let project = context.project(&workspace, args.project, args.path)?;

    let storybook = match args.storybook {
        Some(port) if !args.slim => Some(port.unwrap_or_else(|| workspace.settings().storybook_port())),
        _ => None,
    };
    let options = BuildOptions {
        slim: args.slim,
        watch: args.watch,
        minify: args.minify,
        verbose: context.output.forward_tool_output(),
        exceptions: args.except.iter().collect(),
        deps: args.deps,
        style_patterns: args.style_patterns,
        storybook,
        ..BuildOptions::default()
    };

    let toolchain = crate::infra::toolchain_for(&workspace, options.verbose);
    let mut coordinator = BuildCoordinator::new(workspace.clone(), toolchain).with_target(target);

    let spinner = context
        .output
        .spinner(&format!("Building {} ({})", project.name(), options.mode()));
    let (result, coordinator) = {
        let project = project.clone();
        let options = options.clone();
        tokio::task::spawn_blocking(move || {
            let result = coordinator.build(&project, &options);
            (result, coordinator)
        })
        .await
        .context("Build task panicked")?
    };
    spinner.finish_and_clear();

    let result = result.with_context(|| format!("Failed to build '{}'", project.name()))?;
    report(context, &result);

    let mut coordinator = coordinator;
    let sessions = coordinator.take_watch_sessions();
    let mut explorer = match options.storybook {
        Some(port) => Some(StorybookLauncher::for_workspace(&workspace).dev(&project, port)?),
        None => None,
    };

    if !sessions.is_empty() || explorer.is_some() {
        context.output.info("Press Ctrl-C to stop");
        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for Ctrl-C")?;
        drop(sessions);
        if let Some(child) = explorer.as_mut() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
    Ok(())
}

fn report(context: &CommandContext, result: &BuildResult) {
    let output = &context.output;
    let dependencies = result.dependencies();
    if !dependencies.is_empty() {
        output.info(&format!("Dependencies built: {}", dependencies.join(", ")));
    }
    if let Some(styles) = result.styles() {
        for warning in &styles.missing {
            output.warning(&warning.to_string());
        }
        if !styles.themes.is_empty() {
            let themes: Vec<&str> = styles.themes.keys().map(String::as_str).collect();
            output.info(&format!("Themes: {}", themes.join(", ")));
        }
    }
    output.success(&result.message);
}
