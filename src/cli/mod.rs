//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use commands::{CommandContext, Commands};
use output::OutputConfig;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    "\nbuilt:  ",
    env!("VERGEN_BUILD_DATE"),
    "\ntarget: ",
    env!("VERGEN_CARGO_TARGET_TRIPLE"),
    "\nrustc:  ",
    env!("VERGEN_RUSTC_SEMVER"),
);

/// arpadroid - build orchestrator for the @arpadroid package family
///
/// Builds packages together with their sibling dependencies, aggregates theme
/// stylesheets and runs package tests.
#[derive(Parser, Debug)]
#[command(name = "arpadroid")]
#[command(author, version, long_version = LONG_VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Directory sibling packages are resolved against (defaults to the current directory)
    #[arg(long, global = true, env = "ARPADROID_BASE_PATH")]
    pub base_path: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Output settings selected by the global flags
    pub fn output(&self) -> OutputConfig {
        OutputConfig::new(self.quiet, self.verbose)
    }

    /// Execute the CLI command
    pub async fn run(self) -> Result<()> {
        let output = self.output();
        if let Some(cmd) = self.command {
            let cwd = std::env::current_dir()?;
            let base_path = self.base_path.unwrap_or_else(|| cwd.clone());
            let context = CommandContext {
                cwd,
                base_path,
                output,
            };
            cmd.run(&context).await
        } else {
            // No subcommand provided, show help
            use clap::CommandFactory;
            let mut cmd = Self::command();
            cmd.print_help()?;
            Ok(())
        }
    }
}
