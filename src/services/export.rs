use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{Result, WrapErr};
use serde_json::Value;
use tracing::instrument;

use crate::normalize::normalize_entry;
use crate::pagination::{Page, drain};
use crate::playlist::{
    OFFICIAL_OWNER_ID, Playlist, PlaylistKind, PlaylistMetadata, SAVED_TRACKS_NAME, TrackRecord,
    playlist_file_name,
};
use crate::ports::spotify::{SpotifyApiPlaylist, SpotifyClient};
use crate::xspf;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Export destination {0} exists and is not a directory")]
    NotADirectory(PathBuf),
}

/// A playlist that could not be exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFailure {
    pub playlist: String,
    pub reason: String,
}

#[derive(Debug, Default)]
pub struct ExportSummary {
    pub written: Vec<PathBuf>,
    pub failed: Vec<ExportFailure>,
}

/// Creates `path` if needed. Fails if something other than a directory is in the way.
pub async fn ensure_directory(path: &Path) -> Result<()> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(ExportError::NotADirectory(path.to_path_buf()).into()),
        Err(error) if error.kind() == ErrorKind::NotFound => tokio::fs::create_dir_all(path)
            .await
            .wrap_err_with(|| format!("Failed to create {}", path.display())),
        Err(error) => Err(error).wrap_err_with(|| format!("Failed to inspect {}", path.display())),
    }
}

/// File names handed out during one export run, compared case-insensitively.
#[derive(Debug, Default)]
struct FileNames {
    used: HashSet<String>,
}

impl FileNames {
    fn reserve(&mut self, file_name: &str) {
        self.used.insert(file_name.to_lowercase());
    }

    /// A file name for `playlist_name` that no earlier playlist of this run got.
    fn claim(&mut self, playlist_name: &str) -> String {
        let file_name = playlist_file_name(playlist_name);
        if self.used.insert(file_name.to_lowercase()) {
            return file_name;
        }

        let stem = file_name
            .strip_suffix(".xspf")
            .unwrap_or(&file_name)
            .to_string();
        (2..)
            .map(|n| format!("{stem} ({n}).xspf"))
            .find(|candidate| self.used.insert(candidate.to_lowercase()))
            .unwrap_or(file_name)
    }
}

pub struct PlaylistExporter<C: SpotifyClient> {
    client: C,
    account_id: String,
}

impl<C: SpotifyClient> PlaylistExporter<C> {
    pub fn new(client: C, account_id: String) -> Self {
        Self { client, account_id }
    }

    /// Writes one XSPF file per playlist of the account, plus one for its saved tracks.
    ///
    /// A playlist that fails is logged and listed in the summary; the rest of the
    /// run carries on.
    #[instrument(skip(self), fields(account = %self.account_id))]
    pub async fn export_all(&self, destination: &Path) -> Result<ExportSummary> {
        ensure_directory(destination).await?;

        let mut summary = ExportSummary::default();
        let mut file_names = FileNames::default();
        let saved_tracks_file = playlist_file_name(SAVED_TRACKS_NAME);
        file_names.reserve(&saved_tracks_file);

        match self.list_playlists().await {
            Ok(playlists) => {
                tracing::info!(count = playlists.len(), "Found playlists");
                for entry in playlists {
                    let remote = match entry {
                        Ok(remote) => remote,
                        Err(failure) => {
                            tracing::error!(playlist = %failure.playlist, reason = %failure.reason, "Skipping unreadable playlist");
                            summary.failed.push(failure);
                            continue;
                        }
                    };

                    let file_name = file_names.claim(&remote.name);
                    match self
                        .export_playlist(&remote, &destination.join(&file_name))
                        .await
                    {
                        Ok(path) => summary.written.push(path),
                        Err(error) => {
                            tracing::error!(playlist = %remote.name, error = ?error, "Failed to export playlist");
                            summary.failed.push(ExportFailure {
                                playlist: remote.name.clone(),
                                reason: format!("{error:#}"),
                            });
                        }
                    }
                }
            }
            Err(error) => {
                tracing::error!(error = ?error, "Failed to list playlists");
                summary.failed.push(ExportFailure {
                    playlist: "<playlist list>".to_string(),
                    reason: format!("{error:#}"),
                });
            }
        }

        match self
            .export_saved_tracks(&destination.join(&saved_tracks_file))
            .await
        {
            Ok(path) => summary.written.push(path),
            Err(error) => {
                tracing::error!(error = ?error, "Failed to export saved tracks");
                summary.failed.push(ExportFailure {
                    playlist: SAVED_TRACKS_NAME.to_string(),
                    reason: format!("{error:#}"),
                });
            }
        }

        Ok(summary)
    }

    /// All playlists of the account. `null` entries are dropped; entries that
    /// don't look like playlists come back as failures.
    async fn list_playlists(&self) -> Result<Vec<Result<SpotifyApiPlaylist, ExportFailure>>> {
        let first = self
            .client
            .user_playlists(&self.account_id)
            .await
            .wrap_err("Failed to fetch playlists")?;

        drain(
            first,
            |cursor| self.client.next_page(cursor),
            |entry| {
                if entry.is_null() {
                    return None;
                }
                let name = entry
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or("<unnamed playlist>")
                    .to_string();
                Some(
                    serde_json::from_value::<SpotifyApiPlaylist>(entry).map_err(|error| {
                        ExportFailure {
                            playlist: name,
                            reason: error.to_string(),
                        }
                    }),
                )
            },
        )
        .await
    }

    async fn drain_tracks(&self, first: Page<Value>) -> Result<Vec<TrackRecord>> {
        drain(
            first,
            |cursor| self.client.next_page(cursor),
            |entry| normalize_entry(entry).into_record(),
        )
        .await
    }

    #[instrument(skip(self, remote), fields(playlist = %remote.name))]
    async fn export_playlist(&self, remote: &SpotifyApiPlaylist, path: &Path) -> Result<PathBuf> {
        let first = self
            .client
            .playlist_tracks(&remote.id)
            .await
            .wrap_err("Failed to fetch playlist tracks")?;
        let tracks = self.drain_tracks(first).await?;

        let owner_id = remote.owner.as_ref().map(|owner| owner.id.clone());
        let metadata = PlaylistMetadata {
            name: remote.name.clone(),
            kind: PlaylistKind::Playlist,
            location_uri: Some(
                remote
                    .uri
                    .clone()
                    .unwrap_or_else(|| format!("spotify:playlist:{}", remote.id)),
            ),
            is_public: remote.public.unwrap_or(false),
            is_collaborative: remote.collaborative,
            is_third_party: owner_id.as_deref() != Some(self.account_id.as_str()),
            is_official: owner_id.as_deref() == Some(OFFICIAL_OWNER_ID),
            owner_id,
        };

        write_playlist(&Playlist::new(metadata, tracks), path).await
    }

    #[instrument(skip(self))]
    async fn export_saved_tracks(&self, path: &Path) -> Result<PathBuf> {
        let first = self
            .client
            .saved_tracks()
            .await
            .wrap_err("Failed to fetch saved tracks")?;
        let tracks = self.drain_tracks(first).await?;

        write_playlist(&Playlist::new(PlaylistMetadata::saved_tracks(), tracks), path).await
    }
}

async fn write_playlist(playlist: &Playlist, path: &Path) -> Result<PathBuf> {
    let document = xspf::render(playlist)
        .wrap_err_with(|| format!("Failed to render {}", playlist.metadata.name))?;
    tokio::fs::write(path, document)
        .await
        .wrap_err_with(|| format!("Failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), tracks = playlist.tracks.len(), "Wrote playlist");
    Ok(path.to_path_buf())
}
