//! Condense Web API objects into compact summaries.
//!
//! Raw API payloads are large (markets, images, external ids); agents only need
//! names and ids, so each item is reduced to a small JSON object.

use serde_json::{json, Map, Value};

fn str_field(value: &Value, key: &str) -> Value {
    value[key].as_str().map(|s| Value::String(s.to_string())).unwrap_or(Value::Null)
}

/// Names of the artists on a track or album, joined when there are several.
fn artist_names(item: &Value) -> Value {
    let names: Vec<&str> = item["artists"]
        .as_array()
        .map(|artists| artists.iter().filter_map(|a| a["name"].as_str()).collect())
        .unwrap_or_default();

    match names.as_slice() {
        [] => Value::Null,
        [single] => Value::String(single.to_string()),
        many => Value::String(many.join(", ")),
    }
}

/// Summarize a track object. Returns `None` for null entries (removed or
/// local-only tracks show up as null in playlists).
pub fn parse_track(track: &Value) -> Option<Value> {
    if !track.is_object() {
        return None;
    }

    let mut summary = Map::new();
    summary.insert("name".to_string(), str_field(track, "name"));
    summary.insert("id".to_string(), str_field(track, "id"));
    summary.insert("artist".to_string(), artist_names(track));
    if let Some(album) = track["album"]["name"].as_str() {
        summary.insert("album".to_string(), json!(album));
    }
    if let Some(duration) = track["duration_ms"].as_u64() {
        summary.insert("duration_ms".to_string(), json!(duration));
    }
    Some(Value::Object(summary))
}

/// Summarize a currently-playing payload. Returns `None` when the player is
/// idle or playing something other than a track.
pub fn parse_current_track(playing: &Value) -> Option<Value> {
    let mut summary = parse_track(&playing["item"])?;
    if let Some(map) = summary.as_object_mut() {
        map.insert(
            "is_playing".to_string(),
            json!(playing["is_playing"].as_bool().unwrap_or(false)),
        );
        if let Some(progress) = playing["progress_ms"].as_u64() {
            map.insert("progress_ms".to_string(), json!(progress));
        }
    }
    Some(summary)
}

/// Summarize an album. With `detailed`, include the album's track list.
pub fn parse_album(album: &Value, detailed: bool) -> Option<Value> {
    if !album.is_object() {
        return None;
    }

    let mut summary = Map::new();
    summary.insert("name".to_string(), str_field(album, "name"));
    summary.insert("id".to_string(), str_field(album, "id"));
    summary.insert("artist".to_string(), artist_names(album));
    if let Some(date) = album["release_date"].as_str() {
        summary.insert("release_date".to_string(), json!(date));
    }
    if detailed {
        let tracks: Vec<Value> = album["tracks"]["items"]
            .as_array()
            .map(|items| items.iter().filter_map(parse_track).collect())
            .unwrap_or_default();
        summary.insert("tracks".to_string(), Value::Array(tracks));
    }
    Some(Value::Object(summary))
}

pub fn parse_artist(artist: &Value) -> Option<Value> {
    if !artist.is_object() {
        return None;
    }

    let mut summary = Map::new();
    summary.insert("name".to_string(), str_field(artist, "name"));
    summary.insert("id".to_string(), str_field(artist, "id"));
    if let Some(genres) = artist["genres"].as_array() {
        summary.insert("genres".to_string(), Value::Array(genres.clone()));
    }
    Some(Value::Object(summary))
}

/// Summarize a playlist. With `detailed`, include its first page of tracks.
pub fn parse_playlist(playlist: &Value, detailed: bool) -> Option<Value> {
    if !playlist.is_object() {
        return None;
    }

    let mut summary = Map::new();
    summary.insert("name".to_string(), str_field(playlist, "name"));
    summary.insert("id".to_string(), str_field(playlist, "id"));
    summary.insert("owner".to_string(), str_field(&playlist["owner"], "display_name"));
    if let Some(description) = playlist["description"].as_str().filter(|d| !d.is_empty()) {
        summary.insert("description".to_string(), json!(description));
    }
    if let Some(total) = playlist["tracks"]["total"].as_u64() {
        summary.insert("total_tracks".to_string(), json!(total));
    }
    if detailed {
        summary.insert("tracks".to_string(), parse_playlist_items(&playlist["tracks"]));
    }
    Some(Value::Object(summary))
}

/// Summarize a page of playlist items (`{ items: [{ track: ... }] }`).
pub fn parse_playlist_items(page: &Value) -> Value {
    let tracks: Vec<Value> = page["items"]
        .as_array()
        .map(|items| items.iter().filter_map(|item| parse_track(&item["track"])).collect())
        .unwrap_or_default();
    Value::Array(tracks)
}

/// Summarize the player queue.
pub fn parse_queue(queue: &Value) -> Value {
    let upcoming: Vec<Value> = queue["queue"]
        .as_array()
        .map(|items| items.iter().filter_map(parse_track).collect())
        .unwrap_or_default();

    json!({
        "currently_playing": parse_track(&queue["currently_playing"]),
        "queue": upcoming,
    })
}

/// Summarize a search response, keyed by result type (`tracks`, `albums`, ...).
pub fn parse_search_results(results: &Value) -> Value {
    let mut summary = Map::new();

    let sections: [(&str, fn(&Value) -> Option<Value>); 4] = [
        ("tracks", parse_track),
        ("albums", |v| parse_album(v, false)),
        ("artists", parse_artist),
        ("playlists", |v| parse_playlist(v, false)),
    ];

    for (key, parser) in sections {
        if let Some(items) = results[key]["items"].as_array() {
            let parsed: Vec<Value> = items.iter().filter_map(parser).collect();
            summary.insert(key.to_string(), Value::Array(parsed));
        }
    }

    Value::Object(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_track() -> Value {
        json!({
            "name": "So What",
            "id": "4vLYewWIvqHfKtJDk8c8tq",
            "duration_ms": 562640,
            "artists": [{ "name": "Miles Davis" }],
            "album": { "name": "Kind Of Blue", "available_markets": ["US"] },
            "popularity": 70
        })
    }

    #[test]
    fn test_parse_track() {
        let track = parse_track(&sample_track()).unwrap();
        assert_eq!(
            track,
            json!({
                "name": "So What",
                "id": "4vLYewWIvqHfKtJDk8c8tq",
                "artist": "Miles Davis",
                "album": "Kind Of Blue",
                "duration_ms": 562640
            })
        );
        assert!(parse_track(&Value::Null).is_none());
    }

    #[test]
    fn test_multiple_artists_are_joined() {
        let track = json!({
            "name": "Duet",
            "id": "x",
            "artists": [{ "name": "A" }, { "name": "B" }]
        });
        assert_eq!(parse_track(&track).unwrap()["artist"], "A, B");
    }

    #[test]
    fn test_parse_current_track() {
        let playing = json!({ "is_playing": true, "progress_ms": 1000, "item": sample_track() });
        let current = parse_current_track(&playing).unwrap();
        assert_eq!(current["is_playing"], true);
        assert_eq!(current["progress_ms"], 1000);
        assert_eq!(current["name"], "So What");

        assert!(parse_current_track(&json!({ "is_playing": false, "item": null })).is_none());
    }

    #[test]
    fn test_parse_playlist_items_skips_null_tracks() {
        let page = json!({ "items": [{ "track": sample_track() }, { "track": null }] });
        assert_eq!(parse_playlist_items(&page).as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_parse_search_results() {
        let results = json!({
            "tracks": { "items": [sample_track()] },
            "artists": { "items": [{ "name": "Miles Davis", "id": "0kbYTNQb4Pb1rPbbaF0pT4", "genres": ["jazz"] }] }
        });
        let summary = parse_search_results(&results);
        assert_eq!(summary["tracks"][0]["name"], "So What");
        assert_eq!(summary["artists"][0]["genres"][0], "jazz");
        assert!(summary.get("albums").is_none());
    }
}
