//! CLI module for the Spotify MCP host.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// Spotify MCP - playback, queue, search and playlist tools for LLM agents
///
/// Hosts the Spotify tools over MCP (streamable HTTP or stdio) and can run a
/// single agent query against them.
#[derive(Parser, Debug)]
#[command(name = "spotify-mcp")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "SPOTIFY_MCP_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Serve the tools over streamable HTTP
    Serve {
        /// Host to bind to (default from [server])
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (default from [server])
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Serve the tools over stdin/stdout
    Stdio,

    /// Print the tool definitions as JSON
    Tools,

    /// Ask the agent to do something with your music
    Ask {
        /// What to ask, e.g. "play something upbeat"
        query: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `verbose`.
pub fn init_logging(verbose: u8, default_level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let log_level = match verbose {
        0 => default_level,
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| {
            format!("spotify_mcp={},spotify_agent={}", log_level, log_level)
        })))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}
