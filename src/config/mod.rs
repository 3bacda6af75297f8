//! Configuration module for spotify-mcp.
//!
//! Handles loading the TOML settings shared by the tool host and the agent.

mod settings;

pub use settings::{
    AgentSettings, GeneralSettings, ServerSettings, Settings, SpotifySettings, ToolsetSettings,
    DEFAULT_INSTRUCTIONS,
};
