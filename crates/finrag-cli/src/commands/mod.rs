//! Command implementations

mod ask;
mod chat;
mod config;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config_file = cli.config.as_deref();

    match cli.command {
        Commands::Chat(args) => chat::execute(args, config_file, &output).await,
        Commands::Ask(args) => ask::execute(args, config_file, &output).await,
        Commands::Config => config::execute(config_file, &output),
    }
}
