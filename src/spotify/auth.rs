//! Access token handling for the Web API.

use crate::config::SpotifySettings;
use crate::error::{Result, SpotifyMcpError};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Refresh this long before the reported expiry.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug)]
enum Credentials {
    Static(String),
    Refresh {
        client_id: String,
        client_secret: String,
        refresh_token: String,
    },
}

/// Supplies bearer tokens, refreshing them from a refresh token when needed.
#[derive(Debug)]
pub struct TokenProvider {
    credentials: Credentials,
    token_url: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Build a provider from settings. A configured access token wins;
    /// otherwise client id, client secret and refresh token are all required.
    pub fn from_settings(settings: &SpotifySettings) -> Result<Self> {
        let token_url = format!("{}/api/token", settings.accounts_base.trim_end_matches('/'));

        if let Some(token) = settings.access_token() {
            return Ok(Self::with_credentials(Credentials::Static(token), token_url));
        }

        match (
            settings.client_id(),
            settings.client_secret(),
            settings.refresh_token(),
        ) {
            (Some(client_id), Some(client_secret), Some(refresh_token)) => Ok(Self::with_credentials(
                Credentials::Refresh {
                    client_id,
                    client_secret,
                    refresh_token,
                },
                token_url,
            )),
            _ => Err(SpotifyMcpError::Config(
                "Spotify credentials not set. Provide SPOTIFY_ACCESS_TOKEN, or SPOTIFY_CLIENT_ID, \
                 SPOTIFY_CLIENT_SECRET and SPOTIFY_REFRESH_TOKEN"
                    .to_string(),
            )),
        }
    }

    /// A provider that always returns the given token.
    pub fn fixed(token: &str) -> Self {
        Self::with_credentials(Credentials::Static(token.to_string()), String::new())
    }

    fn with_credentials(credentials: Credentials, token_url: String) -> Self {
        Self {
            credentials,
            token_url,
            cached: Mutex::new(None),
        }
    }

    /// Current access token, refreshing if the cached one is near expiry.
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String> {
        let (client_id, client_secret, refresh_token) = match &self.credentials {
            Credentials::Static(token) => return Ok(token.clone()),
            Credentials::Refresh {
                client_id,
                client_secret,
                refresh_token,
            } => (client_id, client_secret, refresh_token),
        };

        let mut cached = self.cached.lock().await;
        let now = Utc::now();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.access_token.clone());
        }

        debug!("Refreshing Spotify access token");
        let response = http
            .post(&self.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SpotifyMcpError::Auth(format!(
                "Token refresh failed ({}): {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await?;
        info!("Obtained Spotify access token (expires in {}s)", token.expires_in);

        let fresh = CachedToken {
            access_token: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        };
        let access_token = fresh.access_token.clone();
        *cached = Some(fresh);
        Ok(access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_freshness() {
        let now = Utc::now();
        let token = CachedToken {
            access_token: "abc".to_string(),
            expires_at: now + Duration::seconds(3600),
        };
        assert!(token.is_fresh(now));
        assert!(!token.is_fresh(now + Duration::seconds(3590)));
    }

    #[test]
    fn test_static_token_from_settings() {
        let settings = SpotifySettings {
            access_token: Some("configured".to_string()),
            ..Default::default()
        };
        let provider = TokenProvider::from_settings(&settings).unwrap();
        assert!(matches!(provider.credentials, Credentials::Static(ref t) if t == "configured"));
    }

    #[tokio::test]
    async fn test_fixed_provider() {
        let provider = TokenProvider::fixed("token");
        let http = reqwest::Client::new();
        assert_eq!(provider.access_token(&http).await.unwrap(), "token");
    }
}
