//! Typed tool requests.
//!
//! Raw `arguments` objects are parsed into closed enums here, so unknown
//! actions and missing fields are rejected before anything reaches the
//! backing client.

use super::error::ToolError;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Largest page size the search endpoint accepts.
pub const MAX_SEARCH_LIMIT: u32 = 50;

const DEFAULT_LIMIT: u32 = 10;

/// Most tracks a single skip call may advance. Each skip is one request.
pub const MAX_SKIPS: u32 = 50;

fn default_qtype() -> String {
    "track".to_string()
}

/// The named capabilities exposed by the tool host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Playback,
    Queue,
    GetInfo,
    Search,
    Playlist,
}

impl Capability {
    pub const ALL: [Capability; 5] = [
        Capability::Playback,
        Capability::Queue,
        Capability::GetInfo,
        Capability::Search,
        Capability::Playlist,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Capability::Playback => "playback",
            Capability::Queue => "queue",
            Capability::GetInfo => "get_info",
            Capability::Search => "search",
            Capability::Playlist => "playlist",
        }
    }
}

impl std::str::FromStr for Capability {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Capability::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("Unknown tool: {}", s))
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A validated request for one capability.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolRequest {
    Playback(PlaybackRequest),
    Queue(QueueRequest),
    GetInfo(GetInfoRequest),
    Search(SearchRequest),
    Playlist(PlaylistRequest),
}

impl ToolRequest {
    /// Parse and validate the arguments of a call to `capability`.
    pub fn parse(capability: Capability, arguments: Option<Value>) -> Result<Self, ToolError> {
        let args = Arguments::new(capability, arguments.unwrap_or(Value::Null))?;

        Ok(match capability {
            Capability::Playback => ToolRequest::Playback(PlaybackRequest::parse(&args)?),
            Capability::Queue => ToolRequest::Queue(QueueRequest::parse(&args)?),
            Capability::GetInfo => ToolRequest::GetInfo(GetInfoRequest::parse(&args)?),
            Capability::Search => ToolRequest::Search(SearchRequest::parse(&args)?),
            Capability::Playlist => ToolRequest::Playlist(PlaylistRequest::parse(&args)?),
        })
    }
}

/// Raw arguments of one call. Fields are read on demand, so only the fields
/// an action actually uses are type-checked.
struct Arguments {
    capability: Capability,
    fields: Map<String, Value>,
}

impl Arguments {
    fn new(capability: Capability, value: Value) -> Result<Self, ToolError> {
        match value {
            Value::Null => Ok(Self {
                capability,
                fields: Map::new(),
            }),
            Value::Object(fields) => Ok(Self { capability, fields }),
            other => Err(ToolError::validation(format!(
                "Invalid arguments for {}: expected an object, got {}",
                capability, other
            ))),
        }
    }

    fn invalid(&self, field: &str, detail: impl std::fmt::Display) -> ToolError {
        ToolError::validation(format!(
            "Invalid arguments for {}: {}: {}",
            self.capability, field, detail
        ))
    }

    fn get<T: DeserializeOwned>(&self, field: &str) -> Result<Option<T>, ToolError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => serde_json::from_value(value.clone())
                .map(Some)
                .map_err(|e| self.invalid(field, e)),
        }
    }

    /// A string field; blank strings count as absent.
    fn string(&self, field: &str) -> Result<Option<String>, ToolError> {
        Ok(self.get::<String>(field)?.filter(|v| !v.trim().is_empty()))
    }

    /// A list of ids; blank entries are dropped and an empty list is absent.
    fn strings(&self, field: &str) -> Result<Option<Vec<String>>, ToolError> {
        Ok(self
            .get::<Vec<String>>(field)?
            .map(|ids| ids.into_iter().filter(|id| !id.trim().is_empty()).collect::<Vec<_>>())
            .filter(|ids| !ids.is_empty()))
    }

    /// A non-negative whole number. Integral floats such as `3.0` are
    /// accepted since models often emit them.
    fn count(&self, field: &str) -> Result<Option<u64>, ToolError> {
        let number = match self.fields.get(field) {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::Number(number)) => number,
            Some(other) => {
                return Err(self.invalid(field, format!("expected a whole number, got {}", other)))
            }
        };

        if let Some(n) = number.as_u64() {
            return Ok(Some(n));
        }
        match number.as_f64() {
            Some(f) if f >= 0.0 && f.fract() == 0.0 => Ok(Some(f as u64)),
            _ => Err(self.invalid(
                field,
                format!("expected a non-negative whole number, got {}", number),
            )),
        }
    }

    /// Read `action` and resolve it against the capability's action set.
    /// Runs before any other field is looked at.
    fn action<A>(&self, supported: &[&str]) -> Result<(A, String), ToolError>
    where
        A: std::str::FromStr<Err = ToolError>,
    {
        let action = self.string("action")?.ok_or_else(|| {
            ToolError::validation(format!(
                "action is required for {}. Supported actions are: {}.",
                self.capability,
                supported.join(", ")
            ))
        })?;
        Ok((action.parse()?, action))
    }
}

/// Apply `default` when absent and require `1..=max`.
fn bounded(field: &str, value: Option<u64>, default: u32, max: u32) -> Result<u32, ToolError> {
    match value {
        None => Ok(default),
        Some(n) if (1..=u64::from(max)).contains(&n) => Ok(n as u32),
        Some(_) => Err(ToolError::validation(format!(
            "{} must be between 1 and {}.",
            field, max
        ))),
    }
}

// === playback ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackAction {
    Get,
    Start,
    Pause,
    Skip,
}

impl PlaybackAction {
    pub const NAMES: &'static [&'static str] = &["get", "start", "pause", "skip"];
}

impl std::str::FromStr for PlaybackAction {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(PlaybackAction::Get),
            "start" => Ok(PlaybackAction::Start),
            "pause" => Ok(PlaybackAction::Pause),
            "skip" => Ok(PlaybackAction::Skip),
            _ => Err(ToolError::unknown_action("playback", s, Self::NAMES)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackRequest {
    /// Report the current track.
    Get,
    /// Play `spotify_uri`, or resume when absent.
    Start { spotify_uri: Option<String> },
    Pause,
    Skip { num_skips: u32 },
}

impl PlaybackRequest {
    fn parse(args: &Arguments) -> Result<Self, ToolError> {
        let (action, _) = args.action::<PlaybackAction>(PlaybackAction::NAMES)?;

        Ok(match action {
            PlaybackAction::Get => PlaybackRequest::Get,
            PlaybackAction::Start => PlaybackRequest::Start {
                spotify_uri: args.string("spotify_uri")?,
            },
            PlaybackAction::Pause => PlaybackRequest::Pause,
            PlaybackAction::Skip => PlaybackRequest::Skip {
                num_skips: bounded("num_skips", args.count("num_skips")?, 1, MAX_SKIPS)?,
            },
        })
    }
}

// === queue ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueAction {
    Add,
    Get,
}

impl QueueAction {
    pub const NAMES: &'static [&'static str] = &["add", "get"];
}

impl std::str::FromStr for QueueAction {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(QueueAction::Add),
            "get" => Ok(QueueAction::Get),
            _ => Err(ToolError::unknown_action("queue", s, Self::NAMES)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueueRequest {
    Add { track_id: String },
    Get,
}

impl QueueRequest {
    fn parse(args: &Arguments) -> Result<Self, ToolError> {
        let (action, _) = args.action::<QueueAction>(QueueAction::NAMES)?;

        Ok(match action {
            QueueAction::Add => QueueRequest::Add {
                track_id: args.string("track_id")?.ok_or_else(|| {
                    ToolError::validation("track_id is required for add action.")
                })?,
            },
            QueueAction::Get => QueueRequest::Get,
        })
    }
}

// === get_info ===

#[derive(Debug, Clone, PartialEq)]
pub struct GetInfoRequest {
    pub item_uri: String,
}

impl GetInfoRequest {
    fn parse(args: &Arguments) -> Result<Self, ToolError> {
        let item_uri = args
            .string("item_uri")?
            .ok_or_else(|| ToolError::validation("item_uri is required for get_info."))?;
        Ok(Self { item_uri })
    }
}

// === search ===

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    /// Item type filter; one or more of track, album, artist, playlist,
    /// comma-separated.
    pub qtype: String,
    pub limit: u32,
}

impl SearchRequest {
    fn parse(args: &Arguments) -> Result<Self, ToolError> {
        let query = args
            .string("query")?
            .ok_or_else(|| ToolError::validation("query is required for search."))?;
        let limit = bounded("limit", args.count("limit")?, DEFAULT_LIMIT, MAX_SEARCH_LIMIT)?;

        Ok(Self {
            query,
            qtype: args.string("qtype")?.unwrap_or_else(default_qtype),
            limit,
        })
    }
}

// === playlist ===

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistAction {
    Get,
    GetTracks,
    AddTracks,
    RemoveTracks,
    ChangeDetails,
    CreatePlaylist,
}

impl PlaylistAction {
    pub const NAMES: &'static [&'static str] = &[
        "get",
        "get_tracks",
        "add_tracks",
        "remove_tracks",
        "change_details",
        "create_playlist",
    ];
}

impl std::str::FromStr for PlaylistAction {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(PlaylistAction::Get),
            "get_tracks" => Ok(PlaylistAction::GetTracks),
            "add_tracks" => Ok(PlaylistAction::AddTracks),
            "remove_tracks" => Ok(PlaylistAction::RemoveTracks),
            "change_details" => Ok(PlaylistAction::ChangeDetails),
            "create_playlist" => Ok(PlaylistAction::CreatePlaylist),
            _ => Err(ToolError::unknown_action("playlist", s, Self::NAMES)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PlaylistRequest {
    /// List the current user's playlists.
    Get,
    GetTracks {
        playlist_id: String,
    },
    AddTracks {
        playlist_id: String,
        track_ids: Vec<String>,
    },
    RemoveTracks {
        playlist_id: String,
        track_ids: Vec<String>,
    },
    ChangeDetails {
        playlist_id: String,
        name: Option<String>,
        description: Option<String>,
    },
    CreatePlaylist {
        name: Option<String>,
        description: Option<String>,
    },
}

impl PlaylistRequest {
    fn parse(args: &Arguments) -> Result<Self, ToolError> {
        let (action_kind, action) = args.action::<PlaylistAction>(PlaylistAction::NAMES)?;

        let need_playlist = || {
            ToolError::validation(format!("playlist_id is required for {} action.", action))
        };
        let need_details = || {
            ToolError::validation(format!(
                "At least one of name or description is required for {} action.",
                action
            ))
        };

        Ok(match action_kind {
            PlaylistAction::Get => PlaylistRequest::Get,
            PlaylistAction::GetTracks => PlaylistRequest::GetTracks {
                playlist_id: args.string("playlist_id")?.ok_or_else(need_playlist)?,
            },
            PlaylistAction::AddTracks | PlaylistAction::RemoveTracks => {
                let ids = (args.string("playlist_id")?, args.strings("track_ids")?);
                let (playlist_id, track_ids) = match ids {
                    (Some(p), Some(t)) => (p, t),
                    _ => {
                        return Err(ToolError::validation(format!(
                            "playlist_id and track_ids are required for {} action.",
                            action
                        )))
                    }
                };
                if action_kind == PlaylistAction::AddTracks {
                    PlaylistRequest::AddTracks {
                        playlist_id,
                        track_ids,
                    }
                } else {
                    PlaylistRequest::RemoveTracks {
                        playlist_id,
                        track_ids,
                    }
                }
            }
            PlaylistAction::ChangeDetails => {
                let playlist_id = args.string("playlist_id")?.ok_or_else(need_playlist)?;
                let name = args.string("name")?;
                let description = args.string("description")?;
                if name.is_none() && description.is_none() {
                    return Err(need_details());
                }
                PlaylistRequest::ChangeDetails {
                    playlist_id,
                    name,
                    description,
                }
            }
            PlaylistAction::CreatePlaylist => {
                let name = args.string("name")?;
                let description = args.string("description")?;
                if name.is_none() && description.is_none() {
                    return Err(need_details());
                }
                PlaylistRequest::CreatePlaylist { name, description }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(capability: Capability, args: Value) -> Result<ToolRequest, ToolError> {
        ToolRequest::parse(capability, Some(args))
    }

    #[test]
    fn test_capability_names() {
        for capability in Capability::ALL {
            assert_eq!(capability.name().parse::<Capability>().unwrap(), capability);
        }
        assert!("queue_tool".parse::<Capability>().is_err());
    }

    #[test]
    fn test_skip_defaults_to_one() {
        assert_eq!(
            parse(Capability::Playback, json!({ "action": "skip" })).unwrap(),
            ToolRequest::Playback(PlaybackRequest::Skip { num_skips: 1 })
        );
        assert_eq!(
            parse(Capability::Playback, json!({ "action": "skip", "num_skips": 3 })).unwrap(),
            ToolRequest::Playback(PlaybackRequest::Skip { num_skips: 3 })
        );
    }

    #[test]
    fn test_skip_count_bounds() {
        for n in [json!(0), json!(51), json!(4_000_000_000u64)] {
            let err = parse(Capability::Playback, json!({ "action": "skip", "num_skips": n }))
                .unwrap_err();
            assert_eq!(err.to_string(), "num_skips must be between 1 and 50.");
        }
        assert!(parse(Capability::Playback, json!({ "action": "skip", "num_skips": 50 })).is_ok());
    }

    #[test]
    fn test_integral_floats_are_counts() {
        assert_eq!(
            parse(Capability::Playback, json!({ "action": "skip", "num_skips": 3.0 })).unwrap(),
            ToolRequest::Playback(PlaybackRequest::Skip { num_skips: 3 })
        );
        assert_eq!(
            parse(Capability::Search, json!({ "query": "jazz", "limit": 20.0 })).unwrap(),
            ToolRequest::Search(SearchRequest {
                query: "jazz".to_string(),
                qtype: "track".to_string(),
                limit: 20,
            })
        );

        for bad in [json!(2.5), json!(-1)] {
            let err = parse(Capability::Playback, json!({ "action": "skip", "num_skips": bad }))
                .unwrap_err();
            assert!(err.to_string().starts_with("Invalid arguments for playback: num_skips:"));
        }
    }

    #[test]
    fn test_unknown_action_wins_over_bad_fields() {
        let err = parse(Capability::Playback, json!({ "action": "rewind", "num_skips": "x" }))
            .unwrap_err();
        assert!(err.to_string().starts_with("Unknown playback action: rewind."));

        let err = parse(Capability::Playlist, json!({ "action": "sort", "track_ids": 7 }))
            .unwrap_err();
        assert!(err.to_string().starts_with("Unknown playlist action: sort."));
    }

    #[test]
    fn test_fields_an_action_ignores_are_not_checked() {
        assert_eq!(
            parse(Capability::Playback, json!({ "action": "pause", "num_skips": "three" })).unwrap(),
            ToolRequest::Playback(PlaybackRequest::Pause)
        );
        assert_eq!(
            parse(Capability::Queue, json!({ "action": "get", "track_id": 42 })).unwrap(),
            ToolRequest::Queue(QueueRequest::Get)
        );
        assert_eq!(
            parse(
                Capability::Playlist,
                json!({ "action": "get_tracks", "playlist_id": "p1", "track_ids": "t1" })
            )
            .unwrap(),
            ToolRequest::Playlist(PlaylistRequest::GetTracks {
                playlist_id: "p1".to_string()
            })
        );
    }

    #[test]
    fn test_non_object_arguments() {
        let err = parse(Capability::Search, json!(["jazz"])).unwrap_err();
        assert!(err.to_string().starts_with("Invalid arguments for search: expected an object"));
    }

    #[test]
    fn test_start_without_uri_resumes() {
        assert_eq!(
            parse(Capability::Playback, json!({ "action": "start", "spotify_uri": "" })).unwrap(),
            ToolRequest::Playback(PlaybackRequest::Start { spotify_uri: None })
        );
    }

    #[test]
    fn test_missing_action() {
        let err = ToolRequest::parse(Capability::Queue, None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "action is required for queue. Supported actions are: add, get."
        );
    }

    #[test]
    fn test_wrong_argument_type() {
        let err = parse(Capability::Playback, json!({ "action": "skip", "num_skips": "three" }))
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid arguments for playback:"));
    }

    #[test]
    fn test_search_defaults() {
        assert_eq!(
            parse(Capability::Search, json!({ "query": "jazz" })).unwrap(),
            ToolRequest::Search(SearchRequest {
                query: "jazz".to_string(),
                qtype: "track".to_string(),
                limit: 10,
            })
        );
    }

    #[test]
    fn test_search_limit_bounds() {
        assert!(parse(Capability::Search, json!({ "query": "jazz", "limit": 0 })).is_err());
        assert!(parse(Capability::Search, json!({ "query": "jazz", "limit": 51 })).is_err());
        assert!(parse(Capability::Search, json!({ "query": "jazz", "limit": 50 })).is_ok());
    }

    #[test]
    fn test_empty_track_list_counts_as_missing() {
        let err = parse(
            Capability::Playlist,
            json!({ "action": "remove_tracks", "playlist_id": "p1", "track_ids": [] }),
        )
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "playlist_id and track_ids are required for remove_tracks action."
        );
    }

    #[test]
    fn test_create_playlist_needs_no_id() {
        assert_eq!(
            parse(Capability::Playlist, json!({ "action": "create_playlist", "name": "Late Night" }))
                .unwrap(),
            ToolRequest::Playlist(PlaylistRequest::CreatePlaylist {
                name: Some("Late Night".to_string()),
                description: None,
            })
        );
    }
}
