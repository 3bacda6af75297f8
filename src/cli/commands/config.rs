//! Config command implementation.

use crate::cli::ConfigAction;
use crate::config::Settings;
use anyhow::Result;

const MASK: &str = "********";

/// Run the config command.
pub fn run_config(action: &ConfigAction, settings: Settings, path: Option<&str>) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&masked(settings))
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Path => {
            let config_path = match path {
                Some(p) => Settings::expand_path(p),
                None => Settings::default_config_path(),
            };
            println!("{}", config_path.display());
        }
    }

    Ok(())
}

/// Hide configured secrets.
fn masked(mut settings: Settings) -> Settings {
    let spotify = &mut settings.spotify;
    for secret in [
        &mut spotify.client_secret,
        &mut spotify.refresh_token,
        &mut spotify.access_token,
    ] {
        if secret.is_some() {
            *secret = Some(MASK.to_string());
        }
    }
    settings
}
