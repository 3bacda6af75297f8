//! Stdio tool host.

use super::build_server;
use crate::cli::preflight::{self, Operation};
use crate::config::Settings;
use anyhow::Result;

/// Serve the tools over stdin/stdout until stdin closes.
pub async fn run_stdio(settings: Settings) -> Result<()> {
    preflight::check(Operation::Serve, &settings)?;
    build_server(&settings)?.run_stdio().await
}
