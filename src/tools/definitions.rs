//! Tool definitions advertised to MCP clients.

use super::request::{
    Capability, PlaybackAction, PlaylistAction, QueueAction, MAX_SEARCH_LIMIT, MAX_SKIPS,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Tool definition (name, description and JSON schema of its arguments).
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub input_schema: Value,
}

/// Definition of a single capability.
pub fn definition(capability: Capability) -> ToolDefinition {
    let (description, input_schema) = match capability {
        Capability::Playback => (
            "Manage playback. Actions:\n\
             - get: Get information about the current track.\n\
             - start: Start playback of a new item (or resume if no URI is provided).\n\
             - pause: Pause playback.\n\
             - skip: Skip the current track (optionally skip multiple tracks using num_skips).",
            json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": PlaybackAction::NAMES,
                        "description": "Playback action to perform"
                    },
                    "spotify_uri": {
                        "type": "string",
                        "description": "Track, album, artist or playlist URI to play (start only)"
                    },
                    "num_skips": {
                        "type": "integer",
                        "description": "Number of tracks to skip (skip only)",
                        "default": 1,
                        "minimum": 1,
                        "maximum": MAX_SKIPS
                    }
                },
                "required": ["action"]
            }),
        ),
        Capability::Queue => (
            "Manage the playback queue. Actions:\n\
             - add: Add track to the queue (requires track_id).\n\
             - get: Retrieve the current queue.",
            json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": QueueAction::NAMES,
                        "description": "Queue action to perform"
                    },
                    "track_id": {
                        "type": "string",
                        "description": "Track id or URI to enqueue (add only)"
                    }
                },
                "required": ["action"]
            }),
        ),
        Capability::GetInfo => (
            "Get detailed information about a Spotify item. \
             The behavior depends on the type of item referenced by item_uri \
             (track, album, artist, or playlist).",
            json!({
                "type": "object",
                "properties": {
                    "item_uri": {
                        "type": "string",
                        "description": "Item URI (spotify:<type>:<id>) or open.spotify.com link"
                    }
                },
                "required": ["item_uri"]
            }),
        ),
        Capability::Search => (
            "Search for Spotify content: tracks, albums, artists, or playlists.",
            json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search term"
                    },
                    "qtype": {
                        "type": "string",
                        "description": "The type of item (track, album, artist, playlist, or multiple comma-separated types)",
                        "default": "track"
                    },
                    "limit": {
                        "type": "integer",
                        "description": "Maximum number of results to return",
                        "default": 10,
                        "minimum": 1,
                        "maximum": MAX_SEARCH_LIMIT
                    }
                },
                "required": ["query"]
            }),
        ),
        Capability::Playlist => (
            "Manage Spotify playlists. Actions:\n\
             - get: Retrieve the current user's playlists.\n\
             - get_tracks: Get tracks for a given playlist (requires playlist_id).\n\
             - add_tracks: Add track(s) to a playlist (requires playlist_id and track_ids).\n\
             - remove_tracks: Remove track(s) from a playlist (requires playlist_id and track_ids).\n\
             - change_details: Update the playlist name and/or description (requires playlist_id).\n\
             - create_playlist: Create a playlist (requires name and/or description).",
            json!({
                "type": "object",
                "properties": {
                    "action": {
                        "type": "string",
                        "enum": PlaylistAction::NAMES,
                        "description": "Playlist action to perform"
                    },
                    "playlist_id": {
                        "type": "string",
                        "description": "Playlist id or URI"
                    },
                    "track_ids": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Track ids or URIs (add_tracks, remove_tracks)"
                    },
                    "name": {
                        "type": "string",
                        "description": "Playlist name (change_details, create_playlist)"
                    },
                    "description": {
                        "type": "string",
                        "description": "Playlist description (change_details, create_playlist)"
                    }
                },
                "required": ["action"]
            }),
        ),
    };

    ToolDefinition {
        name: capability.name().to_string(),
        description: description.to_string(),
        input_schema,
    }
}

/// Definitions of every capability, in registration order.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    Capability::ALL.into_iter().map(definition).collect()
}
