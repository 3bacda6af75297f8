//! Spotify MCP host CLI entry point.

use anyhow::Result;
use clap::Parser;
use spotify_mcp::cli::{commands, init_logging, Cli, Commands};
use spotify_mcp::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.as_deref().map(Settings::expand_path);
    let settings = Settings::load_from(config_path.as_ref())?;

    init_logging(cli.verbose, &settings.general.log_level);

    match &cli.command {
        Commands::Serve { host, port } => {
            commands::run_serve(host.clone(), *port, settings).await?;
        }

        Commands::Stdio => {
            commands::run_stdio(settings).await?;
        }

        Commands::Tools => {
            commands::run_tools(&settings)?;
        }

        Commands::Ask { query } => {
            commands::run_ask(query, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, cli.config.as_deref())?;
        }
    }

    Ok(())
}
