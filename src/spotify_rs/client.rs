use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::pagination::Page;
use crate::ports::spotify::SpotifyClient;
use crate::spotify_rs::types::{
    AddTracksRequest, CreatePlaylistRequest, CreatedPlaylist, PlaylistDetailsRequest,
    SaveTracksRequest, SpotifyUser,
};

pub const SPOTIFY_API_BASE_URL: &str = "https://api.spotify.com/v1/";

/// Page sizes are the maximum each endpoint allows.
const PLAYLISTS_PAGE_LIMIT: &str = "50";
const PLAYLIST_TRACKS_PAGE_LIMIT: &str = "100";
const SAVED_TRACKS_PAGE_LIMIT: &str = "50";

/// Only the fields the track normalizer reads.
const PLAYLIST_TRACK_FIELDS: &str = "items(track(name,uri,type,artists(name))),next";

/// Spotify Web API client
pub struct SpotifyHttpClient {
    access_token: String,
    base_url: Url,
    timeout: Duration,
    client: reqwest::Client,
}

impl SpotifyHttpClient {
    pub fn new(access_token: String, base_url: Url, timeout: Duration) -> Self {
        Self {
            access_token,
            base_url,
            timeout,
            client: reqwest::Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .wrap_err_with(|| format!("Invalid Spotify API path: {path}"))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.access_token)
            .timeout(self.timeout)
    }

    async fn get_page(&self, url: Url) -> Result<Page<Value>> {
        tracing::debug!(%url, "GET page");
        let page = self
            .request(Method::GET, url)
            .send()
            .await?
            .error_for_status()?
            .json::<Page<Value>>()
            .await
            .wrap_err("Failed to deserialize Spotify page")?;
        Ok(page)
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> Result<reqwest::Response> {
        tracing::debug!(%method, %url, "Sending request");
        let response = self
            .request(method, url)
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(response)
    }
}

/// The id part of `spotify:track:<id>`; anything else is passed through.
fn track_id(uri: &str) -> &str {
    uri.rsplit(':').next().unwrap_or(uri)
}

#[async_trait::async_trait]
impl SpotifyClient for SpotifyHttpClient {
    async fn current_user_id(&self) -> Result<String> {
        let url = self.endpoint("me")?;
        let user: SpotifyUser = self
            .request(Method::GET, url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .wrap_err("Failed to deserialize Spotify user")?;
        Ok(user.id)
    }

    async fn user_playlists(&self, user_id: &str) -> Result<Page<Value>> {
        let mut url = self.endpoint(&format!("users/{}/playlists", urlencoding::encode(user_id)))?;
        url.query_pairs_mut()
            .append_pair("limit", PLAYLISTS_PAGE_LIMIT);
        self.get_page(url).await
    }

    async fn playlist_tracks(&self, playlist_id: &str) -> Result<Page<Value>> {
        let mut url =
            self.endpoint(&format!("playlists/{}/tracks", urlencoding::encode(playlist_id)))?;
        url.query_pairs_mut()
            .append_pair("limit", PLAYLIST_TRACKS_PAGE_LIMIT)
            .append_pair("additional_types", "track,episode")
            .append_pair("fields", PLAYLIST_TRACK_FIELDS);
        self.get_page(url).await
    }

    async fn saved_tracks(&self) -> Result<Page<Value>> {
        let mut url = self.endpoint("me/tracks")?;
        url.query_pairs_mut()
            .append_pair("limit", SAVED_TRACKS_PAGE_LIMIT);
        self.get_page(url).await
    }

    async fn next_page(&self, cursor: String) -> Result<Page<Value>> {
        let url = Url::parse(&cursor).wrap_err("Invalid next page cursor")?;
        self.get_page(url).await
    }

    async fn create_playlist(&self, user_id: &str, name: &str, public: bool) -> Result<String> {
        let url = self.endpoint(&format!("users/{}/playlists", urlencoding::encode(user_id)))?;
        let created: CreatedPlaylist = self
            .send_json(Method::POST, url, &CreatePlaylistRequest { name, public })
            .await?
            .json()
            .await
            .wrap_err("Failed to deserialize created playlist")?;
        Ok(created.id)
    }

    async fn set_collaborative(&self, playlist_id: &str, collaborative: bool) -> Result<()> {
        let url = self.endpoint(&format!("playlists/{}", urlencoding::encode(playlist_id)))?;
        let body = PlaylistDetailsRequest {
            collaborative,
            public: collaborative.then_some(false),
        };
        self.send_json(Method::PUT, url, &body).await?;
        Ok(())
    }

    async fn add_tracks_to_playlist(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let url =
            self.endpoint(&format!("playlists/{}/tracks", urlencoding::encode(playlist_id)))?;
        self.send_json(Method::POST, url, &AddTracksRequest { uris })
            .await?;
        Ok(())
    }

    async fn save_tracks_to_library(&self, uris: &[String]) -> Result<()> {
        let url = self.endpoint("me/tracks")?;
        let body = SaveTracksRequest {
            ids: uris.iter().map(|uri| track_id(uri)).collect(),
        };
        self.send_json(Method::PUT, url, &body).await?;
        Ok(())
    }

    async fn follow_playlist(&self, playlist_id: &str) -> Result<()> {
        let url = self.endpoint(&format!(
            "playlists/{}/followers",
            urlencoding::encode(playlist_id)
        ))?;
        self.send_json(Method::PUT, url, &serde_json::json!({}))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> SpotifyHttpClient {
        SpotifyHttpClient::new(
            "token".into(),
            Url::parse(SPOTIFY_API_BASE_URL).unwrap(),
            Duration::from_secs(10),
        )
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        let url = client().endpoint("playlists/abc/tracks").unwrap();
        assert_eq!(url.as_str(), "https://api.spotify.com/v1/playlists/abc/tracks");
    }

    #[test]
    fn test_track_id() {
        assert_eq!(track_id("spotify:track:4uLU6hMCjMI75M1A2tKUQC"), "4uLU6hMCjMI75M1A2tKUQC");
        assert_eq!(track_id("4uLU6hMCjMI75M1A2tKUQC"), "4uLU6hMCjMI75M1A2tKUQC");
    }

    #[test]
    fn test_save_request_uses_ids() {
        let uris = vec!["spotify:track:a".to_string(), "spotify:track:b".to_string()];
        let body = SaveTracksRequest {
            ids: uris.iter().map(|uri| track_id(uri)).collect(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "ids": ["a", "b"] })
        );
    }

    #[test]
    fn test_collaborative_request_forces_private() {
        let body = PlaylistDetailsRequest {
            collaborative: true,
            public: Some(false),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({ "collaborative": true, "public": false })
        );
    }
}
