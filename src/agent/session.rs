//! One-shot agent run: connect, answer one query, disconnect.

use super::runner::{Agent, AgentResponse};
use super::toolset::{McpToolset, Toolset};
use crate::config::AgentSettings;
use crate::error::Result;
use crate::openai::create_client;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Connect every configured toolset, run `query` through the agent and close
/// the toolsets again. Toolsets are closed whether or not the run succeeds.
pub async fn run_once(settings: &AgentSettings, query: &str) -> Result<AgentResponse> {
    let timeout = Duration::from_secs(settings.timeout_secs);
    let toolsets = connect_all(settings, timeout).await?;

    let outcome = run_with(settings, &toolsets, query, timeout).await;
    close_all(&toolsets).await;
    outcome
}

async fn run_with(
    settings: &AgentSettings,
    toolsets: &[Arc<dyn Toolset>],
    query: &str,
    timeout: Duration,
) -> Result<AgentResponse> {
    let client = create_client(settings.api_base.as_deref(), timeout)?;
    Agent::new(client, &settings.model, &settings.instructions, toolsets)?
        .with_max_iterations(settings.max_iterations)
        .run(query)
        .await
}

/// Connect all toolsets concurrently. If any connection fails, the ones that
/// did connect are closed and the first error is returned.
pub async fn connect_all(
    settings: &AgentSettings,
    timeout: Duration,
) -> Result<Vec<Arc<dyn Toolset>>> {
    let results = join_all(
        settings
            .toolsets
            .iter()
            .map(|toolset| McpToolset::connect(toolset, timeout)),
    )
    .await;

    let mut connected: Vec<Arc<dyn Toolset>> = Vec::new();
    let mut first_error = None;
    for result in results {
        match result {
            Ok(toolset) => connected.push(Arc::new(toolset)),
            Err(e) if first_error.is_none() => first_error = Some(e),
            Err(e) => warn!("Additional toolset connection failure: {}", e),
        }
    }

    match first_error {
        Some(e) => {
            close_all(&connected).await;
            Err(e)
        }
        None => Ok(connected),
    }
}

/// Close every toolset; failures are logged, not returned.
pub async fn close_all(toolsets: &[Arc<dyn Toolset>]) {
    for (toolset, result) in toolsets
        .iter()
        .zip(join_all(toolsets.iter().map(|t| t.close())).await)
    {
        if let Err(e) = result {
            warn!("Failed to close toolset '{}': {}", toolset.name(), e);
        }
    }
}
