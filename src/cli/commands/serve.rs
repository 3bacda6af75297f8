//! Streamable HTTP tool host.

use super::build_server;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::mcp::http;
use anyhow::Result;

/// Serve the tools over HTTP. `host` and `port` override `[server]`.
pub async fn run_serve(host: Option<String>, port: Option<u16>, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Serve, &settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let server = build_server(&settings)?;
    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);
    let addr = format!("{}:{}", host, port);

    Output::header("Spotify MCP Server");
    Output::success(&format!(
        "Listening on http://{}{}",
        addr, settings.server.path
    ));
    Output::info("Endpoints: POST/DELETE MCP, GET /health, GET|POST /success");

    http::serve(server, &addr, &settings.server.path).await
}
