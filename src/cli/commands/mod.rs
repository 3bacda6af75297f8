//! CLI command implementations.

mod ask;
mod config;
mod serve;
mod stdio;
mod tools;

pub use ask::run_ask;
pub use config::run_config;
pub use serve::run_serve;
pub use stdio::run_stdio;
pub use tools::run_tools;

use crate::config::Settings;
use crate::mcp::McpServer;
use crate::spotify::SpotifyClient;
use crate::tools::ToolHost;
use std::sync::Arc;

/// Build an MCP server backed by the real Spotify client.
fn build_server(settings: &Settings) -> crate::Result<McpServer> {
    let client = SpotifyClient::from_settings(&settings.spotify)?;
    Ok(McpServer::new(ToolHost::new(Arc::new(client))))
}
