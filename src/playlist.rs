use std::fmt;

/// Artist name used when an artist record carries no name.
pub const UNKNOWN_ARTIST: &str = "Unknown Artist";
/// Title used when an item carries no name.
pub const UNKNOWN_TITLE: &str = "Unknown";
/// Stand-in artist for items that are not music tracks (podcast episodes etc).
pub const EPISODE_ARTIST: &str = "Podcast Episode";
/// Separator between artist names in the serialized `creator` field.
pub const ARTIST_SEPARATOR: &str = ";";
/// Name (and file stem) of the exported saved-tracks library.
pub const SAVED_TRACKS_NAME: &str = "Saved tracks";
/// Owner id of the platform's own editorial playlists.
pub const OFFICIAL_OWNER_ID: &str = "spotify";

/// A flat, serializable track entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRecord {
    title: String,
    artists: Vec<String>,
    uri: String,
}

impl TrackRecord {
    /// Builds a record, substituting defaults so that `title` and `artists` are never empty.
    pub fn new(title: impl Into<String>, artists: Vec<String>, uri: impl Into<String>) -> Self {
        let title = title.into();
        let title = if title.is_empty() {
            UNKNOWN_TITLE.to_string()
        } else {
            title
        };

        let mut artists: Vec<String> = artists
            .into_iter()
            .map(|artist| {
                if artist.is_empty() {
                    UNKNOWN_ARTIST.to_string()
                } else {
                    artist
                }
            })
            .collect();
        if artists.is_empty() {
            artists.push(UNKNOWN_ARTIST.to_string());
        }

        Self {
            title,
            artists,
            uri: uri.into(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn artists(&self) -> &[String] {
        &self.artists
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The artists joined the way they are written to the `creator` field.
    pub fn creator(&self) -> String {
        self.artists().join(ARTIST_SEPARATOR)
    }

    /// Splits a serialized `creator` field back into artist names.
    pub fn artists_from_creator(creator: &str) -> Vec<String> {
        creator
            .split(ARTIST_SEPARATOR)
            .map(str::trim)
            .filter(|artist| !artist.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaylistKind {
    #[default]
    Playlist,
    SavedTracks,
}

impl PlaylistKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaylistKind::Playlist => "playlist",
            PlaylistKind::SavedTracks => "saved_tracks",
        }
    }

    /// Maps a serialized `type` token. Returns `None` for tokens this tool doesn't write.
    pub fn from_token(token: &str) -> Option<Self> {
        match token.trim() {
            "playlist" => Some(PlaylistKind::Playlist),
            "saved_tracks" => Some(PlaylistKind::SavedTracks),
            _ => None,
        }
    }
}

impl fmt::Display for PlaylistKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistMetadata {
    pub name: String,
    pub kind: PlaylistKind,
    /// Remote URI of the playlist (`spotify:playlist:<id>`); never set for saved tracks.
    pub location_uri: Option<String>,
    pub is_public: bool,
    pub is_collaborative: bool,
    pub owner_id: Option<String>,
    /// The playlist belongs to someone other than the exporting account.
    pub is_third_party: bool,
    /// The playlist is curated by the platform itself.
    pub is_official: bool,
}

impl PlaylistMetadata {
    /// Metadata for a regular playlist with default flags.
    pub fn playlist(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PlaylistKind::Playlist,
            location_uri: None,
            is_public: false,
            is_collaborative: false,
            owner_id: None,
            is_third_party: false,
            is_official: false,
        }
    }

    /// Metadata for the account's saved-tracks library.
    pub fn saved_tracks() -> Self {
        Self {
            kind: PlaylistKind::SavedTracks,
            ..Self::playlist(SAVED_TRACKS_NAME)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub metadata: PlaylistMetadata,
    pub tracks: Vec<TrackRecord>,
}

impl Playlist {
    pub fn new(metadata: PlaylistMetadata, tracks: Vec<TrackRecord>) -> Self {
        Self { metadata, tracks }
    }

    /// Track URIs in playlist order.
    pub fn uris(&self) -> Vec<&str> {
        self.tracks.iter().map(TrackRecord::uri).collect()
    }
}

/// Turns a playlist name into a file name: path separators become `_`.
pub fn playlist_file_name(name: &str) -> String {
    let stem: String = name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    let stem = if stem.trim().is_empty() {
        "Untitled".to_string()
    } else {
        stem
    };
    format!("{stem}.xspf")
}

/// Extracts the playlist id from a playlist URI or URL.
///
/// Accepts `spotify:playlist:<id>`, the legacy `spotify:user:<user>:playlist:<id>`
/// and `https://open.spotify.com/playlist/<id>?si=...`.
pub fn playlist_id_from_uri(uri: &str) -> Option<&str> {
    let uri = uri.trim();
    let id = if uri.contains("://") {
        let path = uri.split(['?', '#']).next().unwrap_or(uri);
        path.trim_end_matches('/').rsplit('/').next()
    } else {
        uri.rsplit(':').next()
    };
    id.filter(|id| !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_record_defaults_empty_fields() {
        let record = TrackRecord::new("", vec!["".into()], "");
        assert_eq!(record.title(), UNKNOWN_TITLE);
        assert_eq!(record.artists(), &[UNKNOWN_ARTIST.to_string()]);
        assert_eq!(record.uri(), "");

        let record = TrackRecord::new("Song", vec![], "spotify:track:1");
        assert_eq!(record.artists(), &[UNKNOWN_ARTIST.to_string()]);
    }

    #[test]
    fn test_creator_joins_and_splits() {
        let record = TrackRecord::new("Song", vec!["A".into(), "B".into()], "spotify:track:1");
        assert_eq!(record.creator(), "A;B");
        assert_eq!(
            TrackRecord::artists_from_creator(&record.creator()),
            vec!["A".to_string(), "B".to_string()]
        );
    }

    #[test]
    fn test_playlist_file_name_replaces_separators() {
        assert_eq!(playlist_file_name("Rock/Pop"), "Rock_Pop.xspf");
        assert_eq!(playlist_file_name("a\\b/c"), "a_b_c.xspf");
        assert_eq!(playlist_file_name("Road Trip"), "Road Trip.xspf");
        assert_eq!(playlist_file_name(""), "Untitled.xspf");
    }

    #[test]
    fn test_playlist_id_from_uri() {
        assert_eq!(
            playlist_id_from_uri("spotify:playlist:37i9dQZF1DXcBWIGoYBM5M"),
            Some("37i9dQZF1DXcBWIGoYBM5M")
        );
        assert_eq!(
            playlist_id_from_uri("spotify:user:someone:playlist:abc123"),
            Some("abc123")
        );
        assert_eq!(
            playlist_id_from_uri("https://open.spotify.com/playlist/abc123?si=xyz"),
            Some("abc123")
        );
        assert_eq!(playlist_id_from_uri("spotify:playlist:"), None);
        assert_eq!(playlist_id_from_uri(""), None);
    }

    #[test]
    fn test_saved_tracks_metadata() {
        let metadata = PlaylistMetadata::saved_tracks();
        assert_eq!(metadata.name, SAVED_TRACKS_NAME);
        assert_eq!(metadata.kind, PlaylistKind::SavedTracks);
        assert!(metadata.location_uri.is_none());
        assert!(!metadata.is_public);
        assert!(!metadata.is_collaborative);
    }

    #[test]
    fn test_uris_keep_track_order() {
        let playlist = Playlist::new(
            PlaylistMetadata::playlist("Ordered"),
            vec![
                TrackRecord::new("B", vec![], "spotify:track:b"),
                TrackRecord::new("A", vec![], "spotify:track:a"),
                TrackRecord::new("B", vec![], "spotify:track:b"),
            ],
        );
        assert_eq!(
            playlist.uris(),
            vec!["spotify:track:b", "spotify:track:a", "spotify:track:b"]
        );
    }

    #[test]
    fn test_kind_tokens() {
        assert_eq!(PlaylistKind::from_token("playlist"), Some(PlaylistKind::Playlist));
        assert_eq!(
            PlaylistKind::from_token("saved_tracks"),
            Some(PlaylistKind::SavedTracks)
        );
        assert_eq!(PlaylistKind::from_token("album"), None);
        assert_eq!(PlaylistKind::SavedTracks.to_string(), "saved_tracks");
    }
}
