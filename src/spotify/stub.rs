//! Recording stand-in for [`SpotifyApi`] used by tests.

use super::SpotifyApi;
use crate::error::{Result, SpotifyMcpError};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

/// How the stub answers every call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StubMode {
    Ok,
    /// Nothing playing / item not found.
    Empty,
    ServiceError,
    OtherError,
}

/// A call received by the stub, with its arguments rendered as JSON.
#[derive(Debug, Clone, PartialEq)]
pub struct StubCall {
    pub operation: &'static str,
    pub args: Value,
}

pub struct StubSpotify {
    mode: StubMode,
    canned: Value,
    calls: Mutex<Vec<StubCall>>,
}

impl StubSpotify {
    pub fn new() -> Self {
        Self::with_mode(StubMode::Ok)
    }

    pub fn with_mode(mode: StubMode) -> Self {
        Self {
            mode,
            canned: Self::canned(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The object returned by every informational call in `Ok` mode.
    pub fn canned() -> Value {
        json!({
            "name": "So What",
            "id": "4vLYewWIvqHfKtJDk8c8tq",
            "artist": "Miles Davis",
            "album": "Kind Of Blue",
            "duration_ms": 562640,
            "tags": ["modal", "jazz"],
            "nested": { "rating": 4.5, "plays": [1, 2, 3] }
        })
    }

    pub fn calls(&self) -> Vec<StubCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<StubCall> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn record(&self, operation: &'static str, args: Value) -> Result<()> {
        self.calls.lock().unwrap().push(StubCall { operation, args });
        match self.mode {
            StubMode::ServiceError => Err(SpotifyMcpError::Spotify {
                status: 404,
                message: "No active device found".to_string(),
            }),
            StubMode::OtherError => Err(SpotifyMcpError::InvalidInput(
                "connection reset".to_string(),
            )),
            StubMode::Ok | StubMode::Empty => Ok(()),
        }
    }

    fn maybe(&self) -> Option<Value> {
        match self.mode {
            StubMode::Empty => None,
            _ => Some(self.canned.clone()),
        }
    }
}

#[async_trait]
impl SpotifyApi for StubSpotify {
    async fn get_current_track(&self) -> Result<Option<Value>> {
        self.record("get_current_track", json!({}))?;
        Ok(self.maybe())
    }

    async fn start_playback(&self, spotify_uri: Option<&str>) -> Result<()> {
        self.record("start_playback", json!({ "spotify_uri": spotify_uri }))
    }

    async fn pause_playback(&self) -> Result<()> {
        self.record("pause_playback", json!({}))
    }

    async fn skip_track(&self, n: u32) -> Result<()> {
        self.record("skip_track", json!({ "n": n }))
    }

    async fn add_to_queue(&self, track_id: &str) -> Result<()> {
        self.record("add_to_queue", json!({ "track_id": track_id }))
    }

    async fn get_queue(&self) -> Result<Value> {
        self.record("get_queue", json!({}))?;
        Ok(self.canned.clone())
    }

    async fn get_info(&self, item_uri: &str) -> Result<Option<Value>> {
        self.record("get_info", json!({ "item_uri": item_uri }))?;
        Ok(self.maybe())
    }

    async fn search(&self, query: &str, qtype: &str, limit: u32) -> Result<Value> {
        self.record("search", json!({ "query": query, "qtype": qtype, "limit": limit }))?;
        Ok(self.canned.clone())
    }

    async fn get_current_user_playlists(&self) -> Result<Value> {
        self.record("get_current_user_playlists", json!({}))?;
        Ok(self.canned.clone())
    }

    async fn get_playlist_tracks(&self, playlist_id: &str) -> Result<Value> {
        self.record("get_playlist_tracks", json!({ "playlist_id": playlist_id }))?;
        Ok(self.canned.clone())
    }

    async fn add_tracks_to_playlist(&self, playlist_id: &str, track_ids: &[String]) -> Result<()> {
        self.record(
            "add_tracks_to_playlist",
            json!({ "playlist_id": playlist_id, "track_ids": track_ids }),
        )
    }

    async fn remove_tracks_from_playlist(
        &self,
        playlist_id: &str,
        track_ids: &[String],
    ) -> Result<()> {
        self.record(
            "remove_tracks_from_playlist",
            json!({ "playlist_id": playlist_id, "track_ids": track_ids }),
        )
    }

    async fn change_playlist_details(
        &self,
        playlist_id: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<()> {
        self.record(
            "change_playlist_details",
            json!({ "playlist_id": playlist_id, "name": name, "description": description }),
        )
    }

    async fn create_playlist(
        &self,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<Value> {
        self.record(
            "create_playlist",
            json!({ "name": name, "description": description }),
        )?;
        Ok(self.canned.clone())
    }
}
