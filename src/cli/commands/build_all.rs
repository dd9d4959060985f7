//! Build-all command implementation
//!
//! Implements `arpadroid build-all`: runs every package's own build script,
//! in build priority order.

use anyhow::{bail, Context, Result};

use super::CommandContext;
use crate::core::scheduler::{
    CommandStatus, MultiProjectScheduler, ScheduleOptions, SkipReason,
};
use crate::infra::process::ShellRunner;

/// Arguments of `arpadroid build-all`
#[derive(Debug, Clone, Default)]
pub struct BuildAllArgs {
    pub except: Vec<String>,
    pub projects: Option<Vec<String>>,
    pub watch: bool,
    pub slim: bool,
    pub sequential: bool,
    pub target: String,
    pub dry_run: bool,
}

/// Execute the build-all command
pub async fn execute(context: &CommandContext, args: BuildAllArgs) -> Result<()> {
    let workspace = context.workspace()?;
    let scheduler = MultiProjectScheduler::new(&workspace);
    let options = ScheduleOptions {
        exceptions: args.except.iter().collect(),
        watch: args.watch,
        slim: args.slim,
        sequential: args.sequential,
        projects: args.projects,
        target: Some(args.target),
    };

    let plan = scheduler
        .plan(&options)
        .context("Failed to plan workspace build")?;
    let output = &context.output;

    for skipped in &plan.skipped {
        match &skipped.reason {
            SkipReason::Excepted => {}
            SkipReason::Invalid(reason) => output.warning(reason),
            SkipReason::NoBuildScript => {
                output.info(&format!("{} has no build script, skipping", skipped.package));
            }
        }
    }

    let Some(composite) = plan.composite_command() else {
        output.info("Nothing to build");
        return Ok(());
    };

    if args.dry_run {
        for command in &plan.commands {
            output.line(&format!("{}: {}", command.package, command.shell_line()));
        }
        output.line(&composite);
        return Ok(());
    }

    output.info(&format!("Building {}", plan.packages().join(", ")));
    let report = scheduler.execute(&plan, &ShellRunner).await;

    for outcome in &report.outcomes {
        let elapsed = format!("{:.1}s", outcome.duration.as_secs_f64());
        match &outcome.status {
            CommandStatus::Succeeded => output.success(&format!("{} ({elapsed})", outcome.package)),
            CommandStatus::Failed { code } => output.error(&format!(
                "{}: '{}' exited with {}",
                outcome.package,
                outcome.command,
                code.map_or_else(|| "signal".to_string(), |c| c.to_string())
            )),
            CommandStatus::LaunchFailed(error) => {
                output.error(&format!("{}: failed to start: {error}", outcome.package));
            }
            CommandStatus::NotRun => output.warning(&format!("{}: not run", outcome.package)),
        }
    }

    if !report.success() {
        bail!("Build failed for: {}", report.failed().join(", "));
    }
    Ok(())
}
