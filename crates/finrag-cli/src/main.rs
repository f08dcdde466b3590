//! finrag CLI - Terminal chat over the annual filing
//!
//! This is the terminal adapter for the finrag system.

mod cli;
mod commands;
mod errors;
mod interactive;
mod output;
mod progress;
mod render;
mod setup;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use errors::CliError;

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Quiet by default so log lines do not interleave with the conversation
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let runtime = tokio::runtime::Runtime::new()?;

    match runtime.block_on(commands::execute(cli)) {
        Ok(()) => Ok(()),
        Err(e) => match e.downcast_ref::<CliError>() {
            Some(cli_error) => {
                cli_error.display();
                std::process::exit(1);
            }
            None => Err(e),
        },
    }
}
