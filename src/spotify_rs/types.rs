use serde::{Deserialize, Serialize};

/// Spotify user profile
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyUser {
    pub id: String,
}

/// Body of `POST /users/{id}/playlists`
#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest<'a> {
    pub name: &'a str,
    pub public: bool,
}

/// The part of the created playlist we need back
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedPlaylist {
    pub id: String,
}

/// Body of `PUT /playlists/{id}`
#[derive(Debug, Clone, Serialize)]
pub struct PlaylistDetailsRequest {
    pub collaborative: bool,
    /// Collaborative playlists must be private.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

/// Body of `POST /playlists/{id}/tracks`
#[derive(Debug, Clone, Serialize)]
pub struct AddTracksRequest<'a> {
    pub uris: &'a [String],
}

/// Body of `PUT /me/tracks`
#[derive(Debug, Clone, Serialize)]
pub struct SaveTracksRequest<'a> {
    pub ids: Vec<&'a str>,
}
