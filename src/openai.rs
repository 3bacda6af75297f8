//! OpenAI client configuration.

use crate::error::Result;
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create an OpenAI client with the given request timeout.
///
/// `api_base` points the client at any OpenAI-compatible endpoint; the API
/// key is read from `OPENAI_API_KEY`.
pub fn create_client(api_base: Option<&str>, timeout: Duration) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder().timeout(timeout).build()?;

    let mut config = OpenAIConfig::default();
    if let Some(base) = api_base {
        config = config.with_api_base(base.trim_end_matches('/'));
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}
