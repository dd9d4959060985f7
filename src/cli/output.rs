//! Output formatting and progress indicators
//!
//! This module provides utilities for displaying spinners, colored status
//! lines and error reports to the user.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::BuildError;

/// Verbosity selected on the command line
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Only errors are printed
    pub quiet: bool,
    /// `-v` count
    pub verbose: u8,
}

impl OutputConfig {
    /// Create an output configuration
    pub fn new(quiet: bool, verbose: u8) -> Self {
        Self { quiet, verbose }
    }

    /// Log level used when `RUST_LOG` is not set
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            return tracing::Level::ERROR;
        }
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            _ => tracing::Level::DEBUG,
        }
    }

    /// Whether external tool output is forwarded
    pub fn forward_tool_output(&self) -> bool {
        self.verbose > 0
    }

    /// Whether spinners may be drawn
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.verbose == 0 && console::Term::stderr().is_term()
    }

    /// Print a success line
    pub fn success(&self, message: &str) {
        if !self.quiet {
            println!("{} {message}", style(status::SUCCESS).green());
        }
    }

    /// Print an informational line
    pub fn info(&self, message: &str) {
        if !self.quiet {
            println!("{} {message}", style(status::INFO).blue());
        }
    }

    /// Print a warning line
    pub fn warning(&self, message: &str) {
        if !self.quiet {
            println!("{} {message}", style(status::WARNING).yellow());
        }
    }

    /// Print an error line; shown even when quiet
    pub fn error(&self, message: &str) {
        eprintln!("{} {message}", style(status::ERROR).red());
    }

    /// Print a plain line
    pub fn line(&self, message: &str) {
        if !self.quiet {
            println!("{message}");
        }
    }

    /// Spinner for `message`, hidden when progress output is off
    pub fn spinner(&self, message: &str) -> ProgressBar {
        if self.show_progress() {
            create_spinner(message)
        } else {
            ProgressBar::hidden()
        }
    }
}

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
        .template("{spinner:.blue} {msg}")
    {
        pb.set_style(spinner_style);
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Print an error and its causes, highlighting the package that failed
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {}", style(status::ERROR).red().bold(), style(error).red());
    for cause in error.chain().skip(1) {
        eprintln!("  {} {cause}", style("caused by:").dim());
    }

    let failing = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<BuildError>())
        .and_then(BuildError::failing_package);
    if let Some(package) = failing {
        eprintln!("  {} {}", style("failing package:").dim(), style(package).yellow().bold());
    }
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Warning prefix (yellow triangle)
    pub const WARNING: &str = "⚠";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}
