//! Spotify item identifiers.
//!
//! Items may be referenced by bare id, by `spotify:<type>:<id>` URI, or by an
//! `https://open.spotify.com/<type>/<id>` link.

use crate::error::{Result, SpotifyMcpError};
use regex::Regex;
use std::sync::OnceLock;

/// Kind of catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemType {
    Track,
    Album,
    Artist,
    Playlist,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::Track => "track",
            ItemType::Album => "album",
            ItemType::Artist => "artist",
            ItemType::Playlist => "playlist",
        }
    }
}

impl std::str::FromStr for ItemType {
    type Err = SpotifyMcpError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "track" => Ok(ItemType::Track),
            "album" => Ok(ItemType::Album),
            "artist" => Ok(ItemType::Artist),
            "playlist" => Ok(ItemType::Playlist),
            _ => Err(SpotifyMcpError::InvalidUri(format!(
                "Unsupported Spotify item type: {}. Supported types are: track, album, artist, playlist.",
                s
            ))),
        }
    }
}

impl std::fmt::Display for ItemType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully qualified item reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyUri {
    pub item_type: ItemType,
    pub id: String,
}

fn uri_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^spotify:(track|album|artist|playlist):([A-Za-z0-9]+)$").expect("Invalid regex")
    })
}

fn id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9]+$").expect("Invalid regex"))
}

impl SpotifyUri {
    /// Parse a URI or open.spotify.com link. Bare ids are rejected because
    /// their type is unknown; use [`SpotifyUri::with_default_type`] for those.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if let Some(caps) = uri_regex().captures(input) {
            return Ok(Self {
                item_type: caps[1].parse()?,
                id: caps[2].to_string(),
            });
        }

        if let Ok(link) = url::Url::parse(input) {
            if link.host_str() == Some("open.spotify.com") {
                let segments: Vec<&str> = link
                    .path_segments()
                    .map(|s| s.filter(|seg| !seg.is_empty()).collect())
                    .unwrap_or_default();
                // Localized links look like /intl-de/track/<id>
                let segments: Vec<&str> = segments
                    .into_iter()
                    .skip_while(|seg| seg.starts_with("intl-"))
                    .collect();
                if let [kind, id, ..] = segments.as_slice() {
                    if id_regex().is_match(id) {
                        return Ok(Self {
                            item_type: kind.parse()?,
                            id: id.to_string(),
                        });
                    }
                }
            }
        }

        Err(SpotifyMcpError::InvalidUri(format!(
            "Not a Spotify URI or link: {}. Use spotify:<type>:<id> or an open.spotify.com link.",
            input
        )))
    }

    /// Parse `input`, treating a bare id as an item of `default_type`.
    pub fn with_default_type(input: &str, default_type: ItemType) -> Result<Self> {
        let trimmed = input.trim();
        if id_regex().is_match(trimmed) {
            return Ok(Self {
                item_type: default_type,
                id: trimmed.to_string(),
            });
        }
        Self::parse(trimmed)
    }

    /// Whether the item is played through a context (album, artist, playlist)
    /// rather than as a list of track URIs.
    pub fn is_context(&self) -> bool {
        self.item_type != ItemType::Track
    }
}

impl std::fmt::Display for SpotifyUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "spotify:{}:{}", self.item_type, self.id)
    }
}
