//! Pre-flight checks before starting a host or an agent run.
//!
//! Validates that credentials are available before starting operations that
//! would otherwise fail on the first request.

use crate::config::Settings;
use crate::error::{Result, SpotifyMcpError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Serving tools requires Spotify credentials.
    Serve,
    /// An agent run requires an LLM API key.
    Agent,
    /// Listing tools has no external requirements.
    Tools,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Serve => check_spotify_credentials(settings)?,
        Operation::Agent => {
            // Self-hosted OpenAI-compatible endpoints often need no key.
            if settings.agent.api_base.is_none() {
                check_api_key()?;
            }
        }
        Operation::Tools => {}
    }
    Ok(())
}

fn check_spotify_credentials(settings: &Settings) -> Result<()> {
    let spotify = &settings.spotify;
    if spotify.access_token().is_some() {
        return Ok(());
    }

    let missing: Vec<&str> = [
        ("SPOTIFY_CLIENT_ID", spotify.client_id()),
        ("SPOTIFY_CLIENT_SECRET", spotify.client_secret()),
        ("SPOTIFY_REFRESH_TOKEN", spotify.refresh_token()),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_none())
    .map(|(name, _)| name)
    .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(SpotifyMcpError::Config(format!(
            "Spotify credentials missing: {}. Set them in [spotify] or the environment, \
             or provide SPOTIFY_ACCESS_TOKEN",
            missing.join(", ")
        )))
    }
}

fn check_api_key() -> Result<()> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(SpotifyMcpError::Config(
            "OPENAI_API_KEY is empty. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
        Err(_) => Err(SpotifyMcpError::Config(
            "OPENAI_API_KEY not set. Set it with: export OPENAI_API_KEY='sk-...'".to_string(),
        )),
    }
}
