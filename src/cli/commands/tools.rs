//! Tools command implementation.

use crate::cli::preflight::{self, Operation};
use crate::config::Settings;
use crate::tools::tool_definitions;
use anyhow::Result;

/// Print the advertised tool definitions as JSON.
pub fn run_tools(settings: &Settings) -> Result<()> {
    preflight::check(Operation::Tools, settings)?;
    println!("{}", serde_json::to_string_pretty(&tool_definitions())?);
    Ok(())
}
