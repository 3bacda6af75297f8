//! Spotify Web API client.

use super::auth::TokenProvider;
use super::parse;
use super::uri::{ItemType, SpotifyUri};
use super::SpotifyApi;
use crate::config::SpotifySettings;
use crate::error::{Result, SpotifyMcpError};
use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Playlist mutation endpoints accept at most this many items per request.
const PLAYLIST_BATCH_SIZE: usize = 100;

/// Page sizes the listing endpoints allow.
const PLAYLISTS_PAGE_SIZE: u32 = 50;
const PLAYLIST_ITEMS_PAGE_SIZE: u32 = 100;

/// Upper bound on pages fetched for one listing.
const MAX_PAGES: usize = 50;

/// Name used when a playlist is created with only a description.
const DEFAULT_PLAYLIST_NAME: &str = "New Playlist";

/// HTTP client for the Spotify Web API.
pub struct SpotifyClient {
    http: reqwest::Client,
    api_base: String,
    tokens: TokenProvider,
}

impl SpotifyClient {
    /// Create a client from settings.
    pub fn from_settings(settings: &SpotifySettings) -> Result<Self> {
        let tokens = TokenProvider::from_settings(settings)?;
        Self::new(&settings.api_base, tokens, Duration::from_secs(settings.timeout_secs))
    }

    /// Create a client against `api_base` with the given token source.
    pub fn new(api_base: &str, tokens: TokenProvider, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    async fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        let token = self.tokens.access_token(&self.http).await?;
        let url = format!("{}{}", self.api_base, path);
        debug!("{} {}", method, url);
        Ok(self.http.request(method, url).bearer_auth(token))
    }

    /// Send a request and return the JSON body, or `None` for empty replies
    /// (204 No Content, or a 2xx with an empty body).
    async fn send(&self, builder: RequestBuilder) -> Result<Option<Value>> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        if status == StatusCode::NO_CONTENT || body.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&body)?))
    }

    async fn get(&self, path: &str) -> Result<Option<Value>> {
        let builder = self.request(Method::GET, path).await?;
        self.send(builder).await
    }

    async fn get_json(&self, path: &str, query: &[(&str, String)]) -> Result<Value> {
        let builder = self.request(Method::GET, path).await?.query(query);
        Ok(self.send(builder).await?.unwrap_or(Value::Null))
    }

    /// Collect every item of a paged collection, advancing `offset` until a
    /// page reports no `next`.
    async fn get_all_items(&self, path: &str, page_size: u32) -> Result<Vec<Value>> {
        let mut items = Vec::new();
        for _ in 0..MAX_PAGES {
            let page = self
                .get_json(
                    path,
                    &[
                        ("limit", page_size.to_string()),
                        ("offset", items.len().to_string()),
                    ],
                )
                .await?;
            let batch = page["items"].as_array().cloned().unwrap_or_default();
            let last = batch.is_empty() || page["next"].is_null();
            items.extend(batch);
            if last {
                return Ok(items);
            }
        }

        warn!("Stopped paging {} after {} pages", path, MAX_PAGES);
        Ok(items)
    }

    async fn current_user_id(&self) -> Result<String> {
        let me = self.get_json("/me", &[]).await?;
        me["id"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| SpotifyMcpError::Auth("Current user has no id".to_string()))
    }
}

/// Map an error response to [`SpotifyMcpError::Spotify`], using the Web API's
/// `{"error": {"status", "message"}}` body when present.
fn api_error(status: StatusCode, body: &str) -> SpotifyMcpError {
    let message = serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v["error"]["message"]
                .as_str()
                .or_else(|| v["error_description"].as_str())
                .map(str::to_string)
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

    SpotifyMcpError::Spotify {
        status: status.as_u16(),
        message,
    }
}

fn track_uris(track_ids: &[String]) -> Result<Vec<String>> {
    track_ids
        .iter()
        .map(|id| SpotifyUri::with_default_type(id, ItemType::Track).map(|uri| uri.to_string()))
        .collect()
}

fn playlist_id(input: &str) -> Result<String> {
    Ok(SpotifyUri::with_default_type(input, ItemType::Playlist)?.id)
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    #[instrument(skip(self))]
    async fn get_current_track(&self) -> Result<Option<Value>> {
        let playing = self.get("/me/player/currently-playing").await?;
        Ok(playing.as_ref().and_then(parse::parse_current_track))
    }

    #[instrument(skip(self))]
    async fn start_playback(&self, spotify_uri: Option<&str>) -> Result<()> {
        let body = match spotify_uri {
            None => None,
            Some(raw) => {
                let uri = SpotifyUri::with_default_type(raw, ItemType::Track)?;
                if uri.is_context() {
                    Some(json!({ "context_uri": uri.to_string() }))
                } else {
                    Some(json!({ "uris": [uri.to_string()] }))
                }
            }
        };

        let mut builder = self.request(Method::PUT, "/me/player/play").await?;
        builder = match body {
            Some(body) => builder.json(&body),
            None => builder.header(reqwest::header::CONTENT_LENGTH, "0"),
        };
        self.send(builder).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn pause_playback(&self) -> Result<()> {
        let builder = self
            .request(Method::PUT, "/me/player/pause")
            .await?
            .header(reqwest::header::CONTENT_LENGTH, "0");
        self.send(builder).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn skip_track(&self, n: u32) -> Result<()> {
        for _ in 0..n {
            let builder = self
                .request(Method::POST, "/me/player/next")
                .await?
                .header(reqwest::header::CONTENT_LENGTH, "0");
            self.send(builder).await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn add_to_queue(&self, track_id: &str) -> Result<()> {
        let uri = SpotifyUri::with_default_type(track_id, ItemType::Track)?;
        let builder = self
            .request(Method::POST, "/me/player/queue")
            .await?
            .query(&[("uri", uri.to_string())])
            .header(reqwest::header::CONTENT_LENGTH, "0");
        self.send(builder).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_queue(&self) -> Result<Value> {
        let queue = self.get_json("/me/player/queue", &[]).await?;
        Ok(parse::parse_queue(&queue))
    }

    #[instrument(skip(self))]
    async fn get_info(&self, item_uri: &str) -> Result<Option<Value>> {
        let uri = SpotifyUri::parse(item_uri)?;
        let info = match uri.item_type {
            ItemType::Track => {
                let track = self.get_json(&format!("/tracks/{}", uri.id), &[]).await?;
                parse::parse_track(&track)
            }
            ItemType::Album => {
                let album = self.get_json(&format!("/albums/{}", uri.id), &[]).await?;
                parse::parse_album(&album, true)
            }
            ItemType::Artist => {
                let artist = self.get_json(&format!("/artists/{}", uri.id), &[]).await?;
                let albums = self
                    .get_json(
                        &format!("/artists/{}/albums", uri.id),
                        &[("limit", "10".to_string())],
                    )
                    .await?;
                parse::parse_artist(&artist).map(|mut summary| {
                    let albums: Vec<Value> = albums["items"]
                        .as_array()
                        .map(|items| {
                            items.iter().filter_map(|a| parse::parse_album(a, false)).collect()
                        })
                        .unwrap_or_default();
                    summary["albums"] = Value::Array(albums);
                    summary
                })
            }
            ItemType::Playlist => {
                let playlist = self.get_json(&format!("/playlists/{}", uri.id), &[]).await?;
                parse::parse_playlist(&playlist, true)
            }
        };
        Ok(info)
    }

    #[instrument(skip(self))]
    async fn search(&self, query: &str, qtype: &str, limit: u32) -> Result<Value> {
        let results = self
            .get_json(
                "/search",
                &[
                    ("q", query.to_string()),
                    ("type", qtype.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;
        Ok(parse::parse_search_results(&results))
    }

    #[instrument(skip(self))]
    async fn get_current_user_playlists(&self) -> Result<Value> {
        let items = self.get_all_items("/me/playlists", PLAYLISTS_PAGE_SIZE).await?;
        let playlists: Vec<Value> = items
            .iter()
            .filter_map(|p| parse::parse_playlist(p, false))
            .collect();
        Ok(Value::Array(playlists))
    }

    #[instrument(skip(self))]
    async fn get_playlist_tracks(&self, playlist: &str) -> Result<Value> {
        let id = playlist_id(playlist)?;
        let items = self
            .get_all_items(&format!("/playlists/{}/tracks", id), PLAYLIST_ITEMS_PAGE_SIZE)
            .await?;
        Ok(parse::parse_playlist_items(&json!({ "items": items })))
    }

    #[instrument(skip(self))]
    async fn add_tracks_to_playlist(&self, playlist: &str, track_ids: &[String]) -> Result<()> {
        let id = playlist_id(playlist)?;
        let uris = track_uris(track_ids)?;
        for batch in uris.chunks(PLAYLIST_BATCH_SIZE) {
            let builder = self
                .request(Method::POST, &format!("/playlists/{}/tracks", id))
                .await?
                .json(&json!({ "uris": batch }));
            self.send(builder).await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn remove_tracks_from_playlist(&self, playlist: &str, track_ids: &[String]) -> Result<()> {
        let id = playlist_id(playlist)?;
        let uris = track_uris(track_ids)?;
        for batch in uris.chunks(PLAYLIST_BATCH_SIZE) {
            let tracks: Vec<Value> = batch.iter().map(|uri| json!({ "uri": uri })).collect();
            let builder = self
                .request(Method::DELETE, &format!("/playlists/{}/tracks", id))
                .await?
                .json(&json!({ "tracks": tracks }));
            self.send(builder).await?;
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn change_playlist_details(
        &self,
        playlist: &str,
        name: Option<&str>,
        description: Option<&str>,
    ) -> Result<()> {
        let id = playlist_id(playlist)?;
        let mut body = serde_json::Map::new();
        if let Some(name) = name {
            body.insert("name".to_string(), json!(name));
        }
        if let Some(description) = description {
            body.insert("description".to_string(), json!(description));
        }
        let builder = self
            .request(Method::PUT, &format!("/playlists/{}", id))
            .await?
            .json(&Value::Object(body));
        self.send(builder).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn create_playlist(&self, name: Option<&str>, description: Option<&str>) -> Result<Value> {
        let user_id = self.current_user_id().await?;
        let builder = self
            .request(Method::POST, &format!("/users/{}/playlists", user_id))
            .await?
            .json(&json!({
                "name": name.unwrap_or(DEFAULT_PLAYLIST_NAME),
                "description": description.unwrap_or_default(),
                "public": false,
            }));
        let created = self.send(builder).await?.unwrap_or(Value::Null);
        parse::parse_playlist(&created, false).ok_or_else(|| {
            SpotifyMcpError::InvalidInput("Playlist creation returned no playlist".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Query, State},
        http::StatusCode as AxumStatus,
        routing::{get, post, put},
        Json, Router,
    };
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    type Seen = Arc<Mutex<Vec<String>>>;

    async fn spawn_api() -> (String, Seen) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));

        let app = Router::new()
            .route(
                "/me/player/currently-playing",
                get(|| async { AxumStatus::NO_CONTENT }),
            )
            .route(
                "/me/player/pause",
                put(|| async {
                    (
                        AxumStatus::NOT_FOUND,
                        Json(json!({ "error": { "status": 404, "message": "No active device found" } })),
                    )
                }),
            )
            .route(
                "/me/player/next",
                post(|State(seen): State<Seen>| async move {
                    seen.lock().unwrap().push("next".to_string());
                    AxumStatus::NO_CONTENT
                }),
            )
            .route(
                "/me/player/queue",
                post(
                    |State(seen): State<Seen>, Query(q): Query<HashMap<String, String>>| async move {
                        seen.lock().unwrap().push(q.get("uri").cloned().unwrap_or_default());
                        AxumStatus::NO_CONTENT
                    },
                ),
            )
            .route(
                "/me/playlists",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    assert_eq!(q.get("limit").map(String::as_str), Some("50"));
                    let playlist = |id: &str| json!({ "name": id, "id": id, "owner": { "display_name": "me" } });
                    match q.get("offset").map(String::as_str) {
                        Some("0") => Json(json!({
                            "items": [playlist("p1"), playlist("p2")],
                            "next": "https://api.spotify.com/v1/me/playlists?offset=2&limit=50"
                        })),
                        _ => Json(json!({ "items": [playlist("p3")], "next": null })),
                    }
                }),
            )
            .route(
                "/search",
                get(|Query(q): Query<HashMap<String, String>>| async move {
                    assert_eq!(q.get("type").map(String::as_str), Some("track"));
                    Json(json!({
                        "tracks": { "items": [{
                            "name": "Blue in Green",
                            "id": "0aWMVrwxPNYkKmFthzmpRi",
                            "artists": [{ "name": "Miles Davis" }],
                            "album": { "name": "Kind Of Blue" },
                            "duration_ms": 337000
                        }] }
                    }))
                }),
            )
            .with_state(seen.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), seen)
    }

    fn client(base: &str) -> SpotifyClient {
        SpotifyClient::new(base, TokenProvider::fixed("test-token"), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_nothing_playing() {
        let (base, _) = spawn_api().await;
        assert!(client(&base).get_current_track().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_api_error_is_service_error() {
        let (base, _) = spawn_api().await;
        let err = client(&base).pause_playback().await.unwrap_err();
        assert!(err.is_service_error());
        match err {
            SpotifyMcpError::Spotify { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "No active device found");
            }
            other => panic!("Expected Spotify error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_skip_issues_one_request_per_track() {
        let (base, seen) = spawn_api().await;
        client(&base).skip_track(3).await.unwrap();
        assert_eq!(seen.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_queue_expands_bare_id() {
        let (base, seen) = spawn_api().await;
        client(&base).add_to_queue("0aWMVrwxPNYkKmFthzmpRi").await.unwrap();
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["spotify:track:0aWMVrwxPNYkKmFthzmpRi".to_string()]
        );
    }

    #[tokio::test]
    async fn test_search_is_condensed() {
        let (base, _) = spawn_api().await;
        let results = client(&base).search("miles", "track", 10).await.unwrap();
        assert_eq!(results["tracks"][0]["name"], "Blue in Green");
        assert_eq!(results["tracks"][0]["artist"], "Miles Davis");
    }

    #[tokio::test]
    async fn test_playlists_follow_paging() {
        let (base, _) = spawn_api().await;
        let playlists = client(&base).get_current_user_playlists().await.unwrap();
        let ids: Vec<&str> = playlists
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, ["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn test_malformed_uri_is_rejected_before_any_request() {
        let (base, seen) = spawn_api().await;
        let err = client(&base).get_info("not a uri").await.unwrap_err();
        assert!(matches!(err, SpotifyMcpError::InvalidUri(_)));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_api_error_without_body() {
        match api_error(StatusCode::TOO_MANY_REQUESTS, "") {
            SpotifyMcpError::Spotify { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "Too Many Requests");
            }
            other => panic!("Expected Spotify error, got {:?}", other),
        }
    }
}
