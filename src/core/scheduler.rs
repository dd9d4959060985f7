//! Multi-package scheduling
//!
//! Builds many top-level packages by running each one's own build script as an
//! independent process, either one after another or all at once. Planning is
//! pure; dispatch goes through a [`CommandRunner`].

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use futures::future::{join_all, BoxFuture};

use crate::core::compiler::BuildTarget;
use crate::core::options::Exceptions;
use crate::core::registry::sort_by_priority;
use crate::core::workspace::Workspace;
use crate::error::BuildError;
use crate::infra::process::quote_path;

/// Options for [`MultiProjectScheduler::plan`]
#[derive(Debug, Clone, Default)]
pub struct ScheduleOptions {
    /// Packages to leave out
    pub exceptions: Exceptions,
    /// Use watch scripts
    pub watch: bool,
    /// Use slim scripts
    pub slim: bool,
    /// Run one command at a time
    pub sequential: bool,
    /// Explicit candidates; defaults to the root manifest's namespace packages
    pub projects: Option<Vec<String>>,
    /// Build kind name, validated before anything runs
    pub target: Option<String>,
}

/// One package build command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedCommand {
    /// Package name
    pub package: String,
    /// Directory the command runs in
    pub cwd: PathBuf,
    /// Shell command line
    pub command: String,
}

impl PlannedCommand {
    /// `cd <dir> && <command>`, with the directory quoted when needed
    pub fn shell_line(&self) -> String {
        format!("cd {} && {}", quote_path(&self.cwd), self.command)
    }
}

/// Why a candidate was left out of the plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Listed in the exceptions
    Excepted,
    /// Failed validation
    Invalid(String),
    /// Manifest has no suitable build script
    NoBuildScript,
}

/// A candidate left out of the plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedPackage {
    pub package: String,
    pub reason: SkipReason,
}

/// Ordered commands ready for dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulePlan {
    /// Commands in build priority order
    pub commands: Vec<PlannedCommand>,
    /// Candidates left out
    pub skipped: Vec<SkippedPackage>,
    /// Dispatch one at a time
    pub sequential: bool,
}

impl SchedulePlan {
    /// Packages that will be built, in order
    pub fn packages(&self) -> Vec<&str> {
        self.commands.iter().map(|c| c.package.as_str()).collect()
    }

    /// Whether there is nothing to run
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Single shell line equivalent to the plan
    ///
    /// Commands are joined with `&&` when sequential and `&` otherwise.
    pub fn composite_command(&self) -> Option<String> {
        if self.commands.is_empty() {
            return None;
        }
        let separator = if self.sequential { " && " } else { " & " };
        Some(
            self.commands
                .iter()
                .map(PlannedCommand::shell_line)
                .collect::<Vec<_>>()
                .join(separator),
        )
    }
}

/// How a dispatched command ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandStatus {
    /// Exited zero
    Succeeded,
    /// Exited non-zero, or was killed (`None`)
    Failed { code: Option<i32> },
    /// Could not be started
    LaunchFailed(String),
    /// Not started because an earlier sequential command failed
    NotRun,
}

/// Result of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub package: String,
    pub command: String,
    pub status: CommandStatus,
    pub duration: Duration,
}

impl CommandOutcome {
    /// Whether the command exited zero
    pub fn succeeded(&self) -> bool {
        self.status == CommandStatus::Succeeded
    }
}

/// Result of a whole dispatch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleReport {
    /// One entry per planned command, in plan order
    pub outcomes: Vec<CommandOutcome>,
    /// Candidates left out of the plan
    pub skipped: Vec<SkippedPackage>,
}

impl ScheduleReport {
    /// Every command exited zero
    pub fn success(&self) -> bool {
        self.outcomes.iter().all(CommandOutcome::succeeded)
    }

    /// Packages whose command failed or could not start
    pub fn failed(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| {
                matches!(
                    o.status,
                    CommandStatus::Failed { .. } | CommandStatus::LaunchFailed(_)
                )
            })
            .map(|o| o.package.as_str())
            .collect()
    }
}

/// Runs one planned command to completion
pub trait CommandRunner: Send + Sync {
    /// Exit code of the finished command; `None` when killed by a signal
    fn run<'a>(&'a self, command: &'a PlannedCommand) -> BoxFuture<'a, std::io::Result<Option<i32>>>;
}

/// Schedules builds across top-level packages
pub struct MultiProjectScheduler<'a> {
    workspace: &'a Workspace,
}

impl<'a> MultiProjectScheduler<'a> {
    /// Create a scheduler over `workspace`
    pub fn new(workspace: &'a Workspace) -> Self {
        Self { workspace }
    }

    /// Resolve candidates into an ordered command list
    pub fn plan(&self, options: &ScheduleOptions) -> Result<SchedulePlan, BuildError> {
        if let Some(target) = options.target.as_deref() {
            target.parse::<BuildTarget>()?;
        }

        let candidates = match &options.projects {
            Some(projects) => projects.clone(),
            None => {
                let manifest = self.workspace.root_manifest()?;
                self.workspace.registry().namespace_packages(&manifest)
            }
        };

        let runner = self.workspace.settings().script_runner();
        let mut plan = SchedulePlan {
            sequential: options.sequential,
            ..SchedulePlan::default()
        };
        let mut commands = Vec::new();
        let mut seen = HashSet::new();

        for name in candidates {
            if !seen.insert(name.clone()) {
                tracing::debug!("{name} listed more than once, planning it once");
                continue;
            }
            if options.exceptions.contains(&name) {
                plan.skipped.push(SkippedPackage {
                    package: name,
                    reason: SkipReason::Excepted,
                });
                continue;
            }

            let project = self.workspace.project(&name);
            if let Err(e) = project.validate() {
                tracing::error!("{e}");
                plan.skipped.push(SkippedPackage {
                    package: name,
                    reason: SkipReason::Invalid(e.to_string()),
                });
                continue;
            }

            match project.build_command(runner, options.watch, options.slim) {
                Some(command) => commands.push(PlannedCommand {
                    package: name,
                    cwd: project.path().to_path_buf(),
                    command,
                }),
                None => {
                    tracing::debug!("{name} has no build script, skipping");
                    plan.skipped.push(SkippedPackage {
                        package: name,
                        reason: SkipReason::NoBuildScript,
                    });
                }
            }
        }

        plan.commands = sort_by_priority(commands, &self.workspace.build_order(), |c| {
            c.package.as_str()
        });
        Ok(plan)
    }

    /// Run a plan's commands
    ///
    /// Sequential plans stop at the first failure and mark the rest as not run.
    /// Concurrent plans start every command at once and wait for all of them.
    pub async fn execute(&self, plan: &SchedulePlan, runner: &dyn CommandRunner) -> ScheduleReport {
        let mut report = ScheduleReport {
            skipped: plan.skipped.clone(),
            ..ScheduleReport::default()
        };
        if plan.is_empty() {
            tracing::info!("Nothing to build");
            return report;
        }

        if plan.sequential {
            let mut failed = false;
            for command in &plan.commands {
                let outcome = if failed {
                    not_run(command)
                } else {
                    run_one(runner, command).await
                };
                failed |= !outcome.succeeded();
                report.outcomes.push(outcome);
            }
        } else {
            let runs = plan.commands.iter().map(|command| run_one(runner, command));
            report.outcomes = join_all(runs).await;
        }
        report
    }

    /// Plan and run in one step
    pub async fn build_all(
        &self,
        options: &ScheduleOptions,
        runner: &dyn CommandRunner,
    ) -> Result<ScheduleReport, BuildError> {
        let plan = self.plan(options)?;
        Ok(self.execute(&plan, runner).await)
    }
}

async fn run_one(runner: &dyn CommandRunner, command: &PlannedCommand) -> CommandOutcome {
    tracing::debug!("{}: {}", command.package, command.shell_line());
    let started = Instant::now();
    let status = match runner.run(command).await {
        Ok(Some(0)) => CommandStatus::Succeeded,
        Ok(code) => CommandStatus::Failed { code },
        Err(e) => CommandStatus::LaunchFailed(e.to_string()),
    };
    if status != CommandStatus::Succeeded {
        tracing::error!("{} failed: {status:?}", command.package);
    }
    CommandOutcome {
        package: command.package.clone(),
        command: command.command.clone(),
        status,
        duration: started.elapsed(),
    }
}

fn not_run(command: &PlannedCommand) -> CommandOutcome {
    CommandOutcome {
        package: command.package.clone(),
        command: command.command.clone(),
        status: CommandStatus::NotRun,
        duration: Duration::ZERO,
    }
}
