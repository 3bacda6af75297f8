//! MCP (Model Context Protocol) server for the Spotify tools.
//!
//! Implements JSON-RPC 2.0 over stdio and over stateless streamable HTTP.
//! The protocol types are shared with the agent's MCP client.

pub mod http;
pub mod protocol;
mod server;

pub use server::McpServer;
