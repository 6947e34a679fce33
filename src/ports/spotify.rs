use color_eyre::eyre::Result;
use serde::Deserialize;
use serde_json::Value;

use crate::pagination::Page;

/// A playlist as listed in a user's playlist collection.
#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyApiPlaylist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub uri: Option<String>,
    /// `null` when the API doesn't know (e.g. playlists of other users).
    #[serde(default)]
    pub public: Option<bool>,
    #[serde(default)]
    pub collaborative: bool,
    #[serde(default)]
    pub owner: Option<SpotifyApiOwner>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyApiOwner {
    pub id: String,
}

/// Port trait wrapping the Spotify API capabilities the exporter and importer use.
///
/// Paged calls return the raw JSON entries of the first page; later pages are
/// fetched with [`SpotifyClient::next_page`] using the page's `next` cursor.
/// Implementations live in `spotify_rs::client` (production) or test mocks.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SpotifyClient: Send + Sync {
    /// Id of the account the session belongs to.
    async fn current_user_id(&self) -> Result<String>;

    async fn user_playlists(&self, user_id: &str) -> Result<Page<Value>>;

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Page<Value>>;

    async fn saved_tracks(&self) -> Result<Page<Value>>;

    async fn next_page(&self, cursor: String) -> Result<Page<Value>>;

    /// Creates a playlist owned by `user_id` and returns its id.
    async fn create_playlist(&self, user_id: &str, name: &str, public: bool) -> Result<String>;

    async fn set_collaborative(&self, playlist_id: &str, collaborative: bool) -> Result<()>;

    async fn add_tracks_to_playlist(&self, playlist_id: &str, uris: &[String]) -> Result<()>;

    async fn save_tracks_to_library(&self, uris: &[String]) -> Result<()>;

    async fn follow_playlist(&self, playlist_id: &str) -> Result<()>;
}
