//! One-shot LLM agent driving remote MCP tool hosts.
//!
//! Connects to each configured toolset over streamable HTTP, exposes the
//! union of their tools to an OpenAI-compatible chat model, and runs the
//! tool calling loop for a single query.

mod runner;
mod session;
mod toolset;

pub use runner::{Agent, AgentResponse, ToolCallRecord};
pub use session::{close_all, connect_all, run_once};
pub use toolset::{McpToolset, Toolset};
