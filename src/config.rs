use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use color_eyre::Result;
use color_eyre::eyre::{Context, eyre};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::batch::{LIBRARY_SAVE_BATCH_SIZE, PLAYLIST_ADD_BATCH_SIZE};
use crate::spotify_rs::client::SPOTIFY_API_BASE_URL;

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub batch: BatchConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpotifyConfig {
    /// Account id; looked up through the API when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            username: None,
            access_token: None,
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Upper bounds for bulk write calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_playlist_add")]
    pub playlist_add: NonZeroUsize,
    #[serde(default = "default_library_save")]
    pub library_save: NonZeroUsize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            playlist_add: PLAYLIST_ADD_BATCH_SIZE,
            library_save: LIBRARY_SAVE_BATCH_SIZE,
        }
    }
}

fn default_api_base_url() -> String {
    SPOTIFY_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_playlist_add() -> NonZeroUsize {
    PLAYLIST_ADD_BATCH_SIZE
}

fn default_library_save() -> NonZeroUsize {
    LIBRARY_SAVE_BATCH_SIZE
}

impl Config {
    /// Load config from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Default location of the config file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|path| path.join("spotify-playlists").join("config.toml"))
    }

    /// Load the default config file, falling back to defaults when there is none
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Write a config template to the default location, if none exists yet
    pub fn create_default() -> Result<PathBuf> {
        let path = Self::config_path().ok_or_else(|| eyre!("No config directory found"))?;
        if path.exists() {
            return Err(eyre!("Config file already exists: {}", path.display()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .wrap_err_with(|| format!("Failed to create {}", parent.display()))?;
        }

        let contents =
            toml::to_string_pretty(&Self::default()).wrap_err("Failed to serialize config")?;
        std::fs::write(&path, contents)
            .wrap_err_with(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(path)
    }

    pub fn api_base_url(&self) -> Result<Url> {
        let mut base = self.spotify.api_base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        Url::parse(&base)
            .wrap_err_with(|| format!("Invalid Spotify API base URL: {}", self.spotify.api_base_url))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.spotify.request_timeout_secs)
    }

    /// The access token, preferring one passed on the command line
    pub fn access_token(&self, override_token: Option<String>) -> Result<String> {
        override_token
            .or_else(|| self.spotify.access_token.clone())
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| {
                eyre!("No Spotify access token. Set SPOTIFY_ACCESS_TOKEN or spotify.access_token in the config file")
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_sections_missing() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.batch, BatchConfig::default());
        assert_eq!(config.batch.playlist_add.get(), 100);
        assert_eq!(config.batch.library_save.get(), 50);
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
        assert_eq!(
            config.api_base_url().unwrap().as_str(),
            "https://api.spotify.com/v1/"
        );
    }

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            [spotify]
            username = "someone"
            access_token = "abc"
            api_base_url = "http://localhost:8080/v1"
            request_timeout_secs = 3

            [batch]
            playlist_add = 20
            "#,
        )
        .unwrap();

        assert_eq!(config.spotify.username.as_deref(), Some("someone"));
        assert_eq!(config.access_token(None).unwrap(), "abc");
        assert_eq!(
            config.api_base_url().unwrap().as_str(),
            "http://localhost:8080/v1/"
        );
        assert_eq!(config.batch.playlist_add.get(), 20);
        assert_eq!(config.batch.library_save.get(), 50);
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        assert!(toml::from_str::<Config>("[batch]\nlibrary_save = 0\n").is_err());
    }

    #[test]
    fn test_access_token_override_and_missing() {
        let config = Config::default();
        assert!(config.access_token(None).is_err());
        assert!(config.access_token(Some("  ".into())).is_err());
        assert_eq!(config.access_token(Some("cli".into())).unwrap(), "cli");
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[spotify]\naccess_token = \"t\"\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.spotify.access_token.as_deref(), Some("t"));

        assert!(Config::from_file(&dir.path().join("missing.toml")).is_err());
    }
}
