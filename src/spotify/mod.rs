//! Spotify backing client.
//!
//! The tool host talks to Spotify only through the [`SpotifyApi`] trait, so the
//! dispatch layer can be exercised against a stub. [`SpotifyClient`] is the
//! Web API implementation used in production.

mod auth;
mod client;
pub mod parse;
pub mod uri;

#[cfg(test)]
pub(crate) mod stub;

pub use auth::TokenProvider;
pub use client::SpotifyClient;
pub use uri::{ItemType, SpotifyUri};

use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Operations the tool host needs from the music service.
///
/// Informational calls return condensed JSON summaries rather than raw API
/// objects.
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// Currently playing track, or `None` when nothing is playing.
    async fn get_current_track(&self) -> Result<Option<Value>>;

    /// Start playback of `spotify_uri`, or resume when `None`.
    async fn start_playback(&self, spotify_uri: Option<&str>) -> Result<()>;

    async fn pause_playback(&self) -> Result<()>;

    /// Skip forward `n` tracks.
    async fn skip_track(&self, n: u32) -> Result<()>;

    async fn add_to_queue(&self, track_id: &str) -> Result<()>;

    async fn get_queue(&self) -> Result<Value>;

    /// Details of a track, album, artist or playlist.
    async fn get_info(&self, item_uri: &str) -> Result<Option<Value>>;

    /// Search the catalog. `qtype` is one or more comma-separated item types.
    async fn search(&self, query: &str, qtype: &str, limit: u32) -> Result<Value>;

    async fn get_current_user_playlists(&self) -> Result<Value>;

    async fn get_playlist_tracks(&self, playlist_id: &str) -> Result<Value>;

    async fn add_tracks_to_playlist(&self, playlist_id: &str, track_ids: &[String]) -> Result<()>;

    async fn remove_tracks_from_playlist(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<()>;

    async fn change_playlist_details(
        &self,
        playlist_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<()>;

    /// Create a playlist owned by the current user and return its summary.
    async fn create_playlist(&self, name: Option<&str>, description: Option<&str>)
        -> Result<Value>;
}
