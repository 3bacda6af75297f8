//! Action dispatch for the Spotify capabilities.

use super::definitions::{tool_definitions, ToolDefinition};
use super::error::ToolError;
use super::request::{
    Capability, GetInfoRequest, PlaybackRequest, PlaylistRequest, QueueRequest, SearchRequest,
    ToolRequest,
};
use crate::spotify::SpotifyApi;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Executes tool calls against an injected backing client.
///
/// Every call returns text. Validation problems, service errors and
/// unexpected failures are all rendered as sentences so the calling agent can
/// reason over them.
#[derive(Clone)]
pub struct ToolHost {
    spotify: Arc<dyn SpotifyApi>,
}

impl ToolHost {
    pub fn new(spotify: Arc<dyn SpotifyApi>) -> Self {
        Self { spotify }
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Invoke `capability` with raw JSON arguments.
    pub async fn call(&self, capability: Capability, arguments: Option<Value>) -> String {
        let outcome = match ToolRequest::parse(capability, arguments) {
            Ok(request) => self.execute(request).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(text) => text,
            Err(e) => {
                match &e {
                    ToolError::Validation(message) => warn!("{} rejected: {}", capability, message),
                    ToolError::Service(message) => {
                        error!("Spotify Client error in {}: {}", capability, message)
                    }
                    ToolError::Unexpected(message) => {
                        error!("Unexpected error in {}: {}", capability, message)
                    }
                }
                e.to_string()
            }
        }
    }

    /// Run a validated request.
    pub async fn execute(&self, request: ToolRequest) -> Result<String, ToolError> {
        match request {
            ToolRequest::Playback(req) => self.playback(req).await,
            ToolRequest::Queue(req) => self.queue(req).await,
            ToolRequest::GetInfo(req) => self.get_info(req).await,
            ToolRequest::Search(req) => self.search(req).await,
            ToolRequest::Playlist(req) => self.playlist(req).await,
        }
    }

    async fn playback(&self, request: PlaybackRequest) -> Result<String, ToolError> {
        match request {
            PlaybackRequest::Get => {
                info!("Attempting to get current track");
                match self.spotify.get_current_track().await? {
                    Some(track) => {
                        info!(
                            "Current track: {}",
                            track["name"].as_str().unwrap_or("Unknown")
                        );
                        to_json(&track)
                    }
                    None => Ok("No track playing.".to_string()),
                }
            }
            PlaybackRequest::Start { spotify_uri } => {
                info!("Starting playback with spotify_uri: {:?}", spotify_uri);
                self.spotify.start_playback(spotify_uri.as_deref()).await?;
                Ok("Playback starting.".to_string())
            }
            PlaybackRequest::Pause => {
                info!("Pausing playback");
                self.spotify.pause_playback().await?;
                Ok("Playback paused.".to_string())
            }
            PlaybackRequest::Skip { num_skips } => {
                info!("Skipping {} track(s)", num_skips);
                self.spotify.skip_track(num_skips).await?;
                Ok("Skipped to next track.".to_string())
            }
        }
    }

    async fn queue(&self, request: QueueRequest) -> Result<String, ToolError> {
        match request {
            QueueRequest::Add { track_id } => {
                info!("Adding track {} to queue", track_id);
                self.spotify.add_to_queue(&track_id).await?;
                Ok("Track added to queue.".to_string())
            }
            QueueRequest::Get => {
                info!("Retrieving queue");
                to_json(&self.spotify.get_queue().await?)
            }
        }
    }

    async fn get_info(&self, request: GetInfoRequest) -> Result<String, ToolError> {
        info!("Retrieving info for item: {}", request.item_uri);
        match self.spotify.get_info(&request.item_uri).await? {
            Some(item) => to_json(&item),
            None => Ok(format!("No information found for {}.", request.item_uri)),
        }
    }

    async fn search(&self, request: SearchRequest) -> Result<String, ToolError> {
        info!("Searching for '{}' with type '{}'", request.query, request.qtype);
        let results = self
            .spotify
            .search(&request.query, &request.qtype, request.limit)
            .await?;
        to_json(&results)
    }

    async fn playlist(&self, request: PlaylistRequest) -> Result<String, ToolError> {
        match request {
            PlaylistRequest::Get => {
                info!("Retrieving user playlists");
                to_json(&self.spotify.get_current_user_playlists().await?)
            }
            PlaylistRequest::GetTracks { playlist_id } => {
                info!("Getting tracks for playlist: {}", playlist_id);
                to_json(&self.spotify.get_playlist_tracks(&playlist_id).await?)
            }
            PlaylistRequest::AddTracks {
                playlist_id,
                track_ids,
            } => {
                info!("Adding tracks {:?} to playlist {}", track_ids, playlist_id);
                self.spotify
                    .add_tracks_to_playlist(&playlist_id, &track_ids)
                    .await?;
                Ok("Tracks added to playlist.".to_string())
            }
            PlaylistRequest::RemoveTracks {
                playlist_id,
                track_ids,
            } => {
                info!("Removing tracks {:?} from playlist {}", track_ids, playlist_id);
                self.spotify
                    .remove_tracks_from_playlist(&playlist_id, &track_ids)
                    .await?;
                Ok("Tracks removed from playlist.".to_string())
            }
            PlaylistRequest::ChangeDetails {
                playlist_id,
                name,
                description,
            } => {
                info!("Changing details for playlist {}", playlist_id);
                self.spotify
                    .change_playlist_details(&playlist_id, name.as_deref(), description.as_deref())
                    .await?;
                Ok("Playlist details changed.".to_string())
            }
            PlaylistRequest::CreatePlaylist { name, description } => {
                info!("Creating playlist {:?}", name);
                let created = self
                    .spotify
                    .create_playlist(name.as_deref(), description.as_deref())
                    .await?;
                to_json(&created)
            }
        }
    }
}

fn to_json(value: &Value) -> Result<String, ToolError> {
    Ok(serde_json::to_string_pretty(value)?)
}
