use serde::Deserialize;
use serde_json::Value;

use crate::playlist::{EPISODE_ARTIST, TrackRecord, UNKNOWN_ARTIST, UNKNOWN_TITLE};

/// A music track as returned inside playlist and library pages.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTrack {
    #[serde(default)]
    pub name: Option<String>,
    pub artists: Vec<Option<RemoteArtist>>,
    #[serde(default)]
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteArtist {
    #[serde(default)]
    pub name: Option<String>,
}

/// Anything without an artist list: podcast episodes, audiobook chapters, ...
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteEpisode {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub uri: Option<String>,
}

/// The shapes an entry of a track collection can take.
#[derive(Debug, Clone)]
pub enum RemoteItem {
    /// Placeholder entry (`null`), e.g. a track removed from the catalogue.
    Missing,
    Track(RemoteTrack),
    Episode(RemoteEpisode),
    /// Something we couldn't read. Kept so a best-effort record can still be produced.
    Malformed { value: Value, reason: String },
}

impl RemoteItem {
    /// Classifies the `track` object of a collection entry.
    pub fn classify(value: Value) -> Self {
        match &value {
            Value::Null => RemoteItem::Missing,
            Value::Object(fields) if fields.contains_key("artists") => {
                match serde_json::from_value::<RemoteTrack>(value.clone()) {
                    Ok(track) => RemoteItem::Track(track),
                    Err(error) => RemoteItem::Malformed {
                        value,
                        reason: error.to_string(),
                    },
                }
            }
            Value::Object(_) => match serde_json::from_value::<RemoteEpisode>(value.clone()) {
                Ok(episode) => RemoteItem::Episode(episode),
                Err(error) => RemoteItem::Malformed {
                    value,
                    reason: error.to_string(),
                },
            },
            _ => RemoteItem::Malformed {
                value,
                reason: "item is not an object".to_string(),
            },
        }
    }

    /// Classifies a page entry of the form `{"added_at": ..., "track": {...}}`.
    pub fn from_entry(entry: Value) -> Self {
        match entry {
            Value::Null => RemoteItem::Missing,
            Value::Object(mut fields) => match fields.remove("track") {
                Some(track) => Self::classify(track),
                None => RemoteItem::Malformed {
                    value: Value::Object(fields),
                    reason: "entry has no track".to_string(),
                },
            },
            other => RemoteItem::Malformed {
                value: other,
                reason: "entry is not an object".to_string(),
            },
        }
    }
}

/// Outcome of normalizing one collection entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Record(TrackRecord),
    Skip,
}

impl Normalized {
    pub fn into_record(self) -> Option<TrackRecord> {
        match self {
            Normalized::Record(record) => Some(record),
            Normalized::Skip => None,
        }
    }
}

/// Maps a remote item onto a [`TrackRecord`].
///
/// Never fails: malformed items still produce a record with whatever could be
/// salvaged, so one bad entry can't drop the rest of a playlist.
pub fn normalize(item: RemoteItem) -> Normalized {
    match item {
        RemoteItem::Missing => Normalized::Skip,
        RemoteItem::Track(track) => {
            let artists = track
                .artists
                .into_iter()
                .map(|artist| {
                    artist
                        .and_then(|artist| artist.name)
                        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string())
                })
                .collect();

            Normalized::Record(TrackRecord::new(
                track.name.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
                artists,
                track.uri.unwrap_or_default(),
            ))
        }
        RemoteItem::Episode(episode) => Normalized::Record(TrackRecord::new(
            episode.name.unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
            vec![EPISODE_ARTIST.to_string()],
            episode.uri.unwrap_or_default(),
        )),
        RemoteItem::Malformed { value, reason } => {
            tracing::warn!(%reason, item = %value, "Malformed item in remote collection, using defaults");

            let string_field = |key: &str| {
                value
                    .get(key)
                    .and_then(Value::as_str)
                    .map(str::to_string)
            };

            Normalized::Record(TrackRecord::new(
                string_field("name").unwrap_or_else(|| UNKNOWN_TITLE.to_string()),
                vec![UNKNOWN_ARTIST.to_string()],
                string_field("uri").unwrap_or_default(),
            ))
        }
    }
}

/// Normalizes a raw page entry (the wrapper holding `track`).
pub fn normalize_entry(entry: Value) -> Normalized {
    normalize(RemoteItem::from_entry(entry))
}
