use serde_json::{Value, json};

use crate::pagination::Page;

/// A playlist/library entry wrapping a music track.
pub fn track_entry(name: &str, artists: &[&str], uri: &str) -> Value {
    let artists: Vec<Value> = artists.iter().map(|name| json!({ "name": name })).collect();
    json!({
        "added_at": "2024-01-01T00:00:00Z",
        "track": {
            "type": "track",
            "name": name,
            "artists": artists,
            "uri": uri
        }
    })
}

/// A playlist entry wrapping a podcast episode.
pub fn episode_entry(name: &str, uri: &str) -> Value {
    json!({
        "added_at": "2024-01-01T00:00:00Z",
        "track": {
            "type": "episode",
            "name": name,
            "uri": uri
        }
    })
}

/// A simplified playlist object as returned by the playlist listing.
pub fn playlist_object(id: &str, name: &str, owner_id: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "uri": format!("spotify:playlist:{id}"),
        "public": true,
        "collaborative": false,
        "owner": { "id": owner_id, "display_name": owner_id }
    })
}

/// `count` numbered track entries starting at `start`.
pub fn numbered_tracks(start: usize, count: usize) -> Vec<Value> {
    (start..start + count)
        .map(|n| track_entry(&format!("Track {n}"), &["Artist"], &format!("spotify:track:{n}")))
        .collect()
}

pub fn page(items: Vec<Value>, next: Option<String>) -> Page<Value> {
    Page { items, next }
}
