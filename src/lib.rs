//! Spotify MCP - Spotify tools for LLM agents
//!
//! Exposes a Spotify account to language-model agents as five MCP tools
//! (`playback`, `queue`, `get_info`, `search`, `playlist`), each taking an
//! `action` plus action-specific arguments and always answering with a
//! string. A one-shot agent client drives the tools for a single query.
//!
//! # Architecture
//!
//! - `config` - Configuration management
//! - `spotify` - Spotify Web API client behind the `SpotifyApi` trait
//! - `tools` - Tool definitions, request validation and dispatch
//! - `mcp` - MCP server over stdio and streamable HTTP
//! - `agent` - MCP client toolsets and the LLM tool calling loop
//! - `cli` - Command line front end shared by both binaries
//!
//! # Example
//!
//! ```rust,no_run
//! use spotify_mcp::config::Settings;
//! use spotify_mcp::spotify::SpotifyClient;
//! use spotify_mcp::tools::{Capability, ToolHost};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let client = SpotifyClient::from_settings(&settings.spotify)?;
//!     let host = ToolHost::new(Arc::new(client));
//!
//!     let reply = host
//!         .call(Capability::Search, Some(json!({ "query": "Teardrop" })))
//!         .await;
//!     println!("{}", reply);
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod config;
pub mod error;
pub mod mcp;
pub mod openai;
pub mod spotify;
pub mod tools;

pub use error::{Result, SpotifyMcpError};
