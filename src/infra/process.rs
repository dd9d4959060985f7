//! External process execution
//!
//! Every tool is started through the platform shell so command overrides from
//! `arpadroid.toml` can carry their own arguments.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use futures::future::BoxFuture;

use crate::core::scheduler::{CommandRunner, PlannedCommand};
use crate::core::testing::{StepRunner, TestStep};
use crate::error::{BuildError, TestError};

/// Shell command running `line`
pub fn shell(line: &str) -> Command {
    let mut command = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C");
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c");
        c
    };
    command.arg(line);
    command
}

/// Quote `value` as one shell word unless it only holds characters the shell leaves alone
pub fn quote(value: &str) -> Cow<'_, str> {
    let plain = |c: char| {
        c.is_ascii_alphanumeric() || "/._-+=:,@%".contains(c) || (cfg!(windows) && c == '\\')
    };
    if !value.is_empty() && value.chars().all(plain) {
        return Cow::Borrowed(value);
    }
    if cfg!(windows) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Owned(format!("'{}'", value.replace('\'', "'\\''")))
    }
}

/// [`quote`] for a path
pub fn quote_path(path: &Path) -> String {
    quote(&path.to_string_lossy()).into_owned()
}

/// Async shell command running `line`
pub fn async_shell(line: &str) -> tokio::process::Command {
    tokio::process::Command::from(shell(line))
}

/// Locate an executable: the tooling package's `node_modules/.bin` first, then `PATH`
///
/// The result is quoted for use as the program of a shell line. Falls back to
/// the bare name so the shell reports a missing tool itself.
pub fn resolve_tool(name: &str, tooling: &Path) -> String {
    let local = tooling.join("node_modules").join(".bin").join(name);
    if local.is_file() {
        return quote_path(&local);
    }
    which::which(name)
        .map(|path| quote_path(&path))
        .unwrap_or_else(|_| name.to_string())
}

/// Run a tool to completion, returning its stdout
///
/// Output is captured; with `verbose` it is forwarded to the log, and stderr is
/// always logged on failure.
pub fn run_tool(
    package: &str,
    tool: &str,
    command: &mut Command,
    verbose: bool,
) -> Result<String, BuildError> {
    tracing::debug!("{package}: running {tool}: {command:?}");
    let output = command
        .stdin(Stdio::null())
        .output()
        .map_err(|e| BuildError::ToolLaunch {
            package: package.to_string(),
            tool: tool.to_string(),
            error: e.to_string(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr);
    if verbose {
        for line in stdout.lines().chain(stderr.lines()) {
            tracing::info!("[{package}] {line}");
        }
    }

    if !output.status.success() {
        for line in stderr.lines() {
            tracing::error!("[{package}] {line}");
        }
        return Err(BuildError::ExternalToolFailure {
            package: package.to_string(),
            tool: tool.to_string(),
            code: output.status.code(),
        });
    }
    Ok(stdout)
}

/// Scheduler runner spawning each command through the shell with inherited stdio
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl CommandRunner for ShellRunner {
    fn run<'a>(&'a self, command: &'a PlannedCommand) -> BoxFuture<'a, std::io::Result<Option<i32>>> {
        Box::pin(async move {
            let status = async_shell(&command.command)
                .current_dir(&command.cwd)
                .stdin(Stdio::null())
                .status()
                .await?;
            Ok(status.code())
        })
    }
}

/// Test step runner spawning each step through the shell with inherited stdio
#[derive(Debug, Clone, Default)]
pub struct ShellStepRunner;

impl StepRunner for ShellStepRunner {
    fn run(&self, package: &str, step: &TestStep) -> Result<(), TestError> {
        tracing::debug!("{package}: {}", step.command);
        let status = shell(&step.command)
            .current_dir(&step.cwd)
            .status()
            .map_err(|e| TestError::StepLaunch {
                package: package.to_string(),
                step: step.label.clone(),
                error: e.to_string(),
            })?;
        if status.success() {
            Ok(())
        } else {
            Err(TestError::StepFailed {
                package: package.to_string(),
                step: step.label.clone(),
                code: status.code(),
            })
        }
    }
}

/// Resolve a line of tool output against `base` when relative
pub fn output_path(base: &Path, line: &str) -> PathBuf {
    let path = PathBuf::from(line);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}
