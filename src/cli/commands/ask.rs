//! Ask command implementation: one agent query.

use crate::agent::run_once;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use anyhow::Result;

/// Run `query` through the agent and print its final answer to stdout.
pub async fn run_ask(query: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Agent, &settings) {
        Output::error(&e.to_string());
        return Err(e.into());
    }

    let spinner = Output::spinner("Thinking...");
    let outcome = run_once(&settings.agent, query).await;
    spinner.finish_and_clear();

    let response = outcome?;
    for call in &response.tool_calls {
        tracing::debug!("Tool call: {}", call);
    }
    println!("{}", response.content);
    Ok(())
}
