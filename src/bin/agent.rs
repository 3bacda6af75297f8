//! One-shot agent client: `spotify-agent "<query>"`.

use anyhow::Result;
use clap::Parser;
use spotify_mcp::cli::{commands, init_logging};
use spotify_mcp::config::Settings;

/// Ask a DJ agent to do something with your Spotify account
#[derive(Parser, Debug)]
#[command(name = "spotify-agent")]
#[command(version, about, long_about = None)]
struct Args {
    /// What to ask, e.g. "queue three songs like Teardrop"
    query: String,

    /// Path to configuration file
    #[arg(short, long, env = "SPOTIFY_MCP_CONFIG")]
    config: Option<String>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_path = args.config.as_deref().map(Settings::expand_path);
    let settings = Settings::load_from(config_path.as_ref())?;
    init_logging(args.verbose, &settings.general.log_level);

    commands::run_ask(&args.query, settings).await
}
