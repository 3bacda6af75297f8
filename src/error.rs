//! Error types for spotify-mcp.

use thiserror::Error;

/// Library-level error type for spotify-mcp operations.
#[derive(Error, Debug)]
pub enum SpotifyMcpError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error response returned by the Spotify Web API itself.
    #[error("http status: {status}, message: {message}")]
    Spotify { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("MCP error {code}: {message}")]
    Mcp { code: i64, message: String },

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A caller-supplied URI, link or id that cannot be resolved.
    #[error("{0}")]
    InvalidUri(String),

    #[error("Agent error: {0}")]
    Agent(String),
}

impl SpotifyMcpError {
    /// Whether this error originated from the Spotify service rather than
    /// from transport, parsing or local validation.
    pub fn is_service_error(&self) -> bool {
        matches!(self, SpotifyMcpError::Spotify { .. })
    }
}

/// Result type alias for spotify-mcp operations.
pub type Result<T> = std::result::Result<T, SpotifyMcpError>;
