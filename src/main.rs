//! arpadroid CLI - build orchestrator for the @arpadroid package family
//!
//! Entry point for the arpadroid command-line application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use arpadroid_build::cli::output::display_error;
use arpadroid_build::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = cli.output();

    // RUST_LOG directives are applied on top of the -v/-q level
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(output.log_level()).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.run().await {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
