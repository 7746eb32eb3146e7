//! Standings CLI entry point

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use standings_service::cli::{Cli, CliHandler, Commands};
use standings_service::{initialize_logging_with_config, load_config, StandingsService};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;
    initialize_logging_with_config(&config.logging.level, &config.logging.format)?;

    if let Commands::Config = cli.command {
        print!("{}", toml::to_string_pretty(&config).context("Failed to render configuration")?);
        return Ok(());
    }

    info!("Starting standings v{}", env!("CARGO_PKG_VERSION"));
    let service = StandingsService::connect(&config).await?;

    CliHandler::new(service).handle_command(cli.command).await
}
