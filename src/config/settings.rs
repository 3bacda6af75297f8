//! Configuration settings for spotify-mcp.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub spotify: SpotifySettings,
    pub server: ServerSettings,
    pub agent: AgentSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

/// Spotify Web API settings.
///
/// Credential fields left empty here are read from the environment
/// (`SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET`, `SPOTIFY_REFRESH_TOKEN`,
/// `SPOTIFY_ACCESS_TOKEN`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpotifySettings {
    /// Base URL of the Web API.
    pub api_base: String,
    /// Base URL of the accounts service used for token refresh.
    pub accounts_base: String,
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    /// Long-lived refresh token obtained from an authorization-code login.
    pub refresh_token: Option<String>,
    /// Fixed access token. Takes precedence over refreshing.
    pub access_token: Option<String>,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for SpotifySettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.spotify.com/v1".to_string(),
            accounts_base: "https://accounts.spotify.com".to_string(),
            client_id: None,
            client_secret: None,
            refresh_token: None,
            access_token: None,
            timeout_secs: 30,
        }
    }
}

impl SpotifySettings {
    pub fn client_id(&self) -> Option<String> {
        resolve(&self.client_id, "SPOTIFY_CLIENT_ID")
    }

    pub fn client_secret(&self) -> Option<String> {
        resolve(&self.client_secret, "SPOTIFY_CLIENT_SECRET")
    }

    pub fn refresh_token(&self) -> Option<String> {
        resolve(&self.refresh_token, "SPOTIFY_REFRESH_TOKEN")
    }

    pub fn access_token(&self) -> Option<String> {
        resolve(&self.access_token, "SPOTIFY_ACCESS_TOKEN")
    }
}

/// Use the configured value if present and non-empty, else the environment.
fn resolve(configured: &Option<String>, env_key: &str) -> Option<String> {
    configured
        .clone()
        .filter(|v| !v.is_empty())
        .or_else(|| std::env::var(env_key).ok().filter(|v| !v.is_empty()))
}

/// Tool host (MCP server) settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Host to bind the streamable HTTP transport to.
    pub host: String,
    pub port: u16,
    /// Path the MCP endpoint is mounted at.
    pub path: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            path: "/mcp".to_string(),
        }
    }
}

/// Default instructions for the agent.
pub const DEFAULT_INSTRUCTIONS: &str = "You are an excellent DJ with global taste at the same time \
niche taste, You are independent, You do not rely on the user's taste before recommendation.";

/// Agent client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// LLM model used by the agent.
    pub model: String,
    /// System instructions given to the model.
    pub instructions: String,
    /// Maximum number of LLM calls per run.
    pub max_iterations: usize,
    /// OpenAI-compatible API base URL (defaults to the OpenAI API).
    pub api_base: Option<String>,
    /// Timeout for LLM and tool host requests, in seconds.
    pub timeout_secs: u64,
    /// Tool hosts made available to the agent.
    pub toolsets: Vec<ToolsetSettings>,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            instructions: DEFAULT_INSTRUCTIONS.to_string(),
            max_iterations: 15,
            api_base: None,
            timeout_secs: 300,
            toolsets: vec![ToolsetSettings::default()],
        }
    }
}

/// A remote tool host reachable over MCP streamable HTTP.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsetSettings {
    pub name: String,
    pub url: String,
    /// Extra HTTP headers sent on every request. Values may reference
    /// environment variables as `${VAR}`.
    pub headers: HashMap<String, String>,
}

impl Default for ToolsetSettings {
    fn default() -> Self {
        Self {
            name: "spotify".to_string(),
            url: "http://127.0.0.1:8000/mcp".to_string(),
            headers: HashMap::new(),
        }
    }
}

impl ToolsetSettings {
    /// Headers with `${VAR}` references expanded from the environment.
    pub fn expanded_headers(&self) -> crate::error::Result<Vec<(String, String)>> {
        self.headers
            .iter()
            .map(|(key, value)| {
                let expanded = shellexpand::env(value).map_err(|e| {
                    crate::error::SpotifyMcpError::Config(format!(
                        "Header '{}' of toolset '{}': {}",
                        key, self.name, e
                    ))
                })?;
                Ok((key.clone(), expanded.into_owned()))
            })
            .collect()
    }
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => Self::expand_path(&p.to_string_lossy()),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("spotify-mcp")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }
}
