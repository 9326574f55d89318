//! Skysift CLI
//!
//! Command-line interface for searching Bluesky posts through a Skysift index.

#![warn(clippy::all)]
#![forbid(unsafe_code)]

use anyhow::Result;
use clap::Parser;
use skysift_cli::config_handlers::handle_config_command;
use skysift_cli::{Cli, Command, SkysiftConfig, commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose {
        "info,skysift=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = cli.config.as_deref();
    match cli.command {
        Command::Config { action } => handle_config_command(config_path, action)?,
        Command::Search(args) => {
            let config = SkysiftConfig::load(config_path)?;
            tracing::debug!(index = %config.client.index_url, "loaded configuration");
            commands::run_search(&config, &args).await?;
        }
        Command::Query(args) => {
            let config = SkysiftConfig::load(config_path)?;
            commands::run_query(&config, &args)?;
        }
        Command::Langs => {
            let config = SkysiftConfig::load(config_path)?;
            commands::run_langs(&config).await?;
        }
    }

    Ok(())
}
