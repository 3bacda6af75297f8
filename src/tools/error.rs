//! Errors raised inside a tool call.
//!
//! These never cross the tool boundary as errors: [`super::ToolHost::call`]
//! renders them with `Display` and returns the text.

use crate::error::SpotifyMcpError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ToolError {
    /// Unknown action, missing or malformed field. Detected before any
    /// backing call.
    #[error("{0}")]
    Validation(String),

    /// The music service rejected the call.
    #[error("Spotify Client error occurred: {0}")]
    Service(String),

    #[error("Unexpected error occurred: {0}")]
    Unexpected(String),
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        ToolError::Validation(message.into())
    }

    /// Error for an action outside a capability's action set.
    pub fn unknown_action(capability: &str, action: &str, supported: &[&str]) -> Self {
        ToolError::Validation(format!(
            "Unknown {} action: {}. Supported actions are: {}.",
            capability,
            action,
            supported.join(", ")
        ))
    }
}

impl From<SpotifyMcpError> for ToolError {
    fn from(err: SpotifyMcpError) -> Self {
        match err {
            SpotifyMcpError::InvalidUri(message) => ToolError::Validation(message),
            err if err.is_service_error() => ToolError::Service(err.to_string()),
            err => ToolError::Unexpected(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        ToolError::Unexpected(err.to_string())
    }
}
