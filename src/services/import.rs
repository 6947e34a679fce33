use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};
use tracing::instrument;

use crate::batch::chunk;
use crate::config::BatchConfig;
use crate::playlist::{Playlist, PlaylistKind, PlaylistMetadata, playlist_id_from_uri};
use crate::ports::spotify::SpotifyClient;
use crate::services::prompt::{ImportChoice, ImportPrompt};
use crate::xspf;

/// What an import did to the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    /// The original playlist was followed; nothing was created.
    Followed { playlist_id: String },
    /// A new playlist was created and filled.
    Copied {
        playlist_id: String,
        added: usize,
        failed_chunks: usize,
    },
    /// Tracks were saved to the library.
    SavedToLibrary { saved: usize, failed_chunks: usize },
}

pub struct PlaylistImporter<C: SpotifyClient, P: ImportPrompt> {
    client: C,
    prompt: P,
    account_id: String,
    batch: BatchConfig,
}

impl<C: SpotifyClient, P: ImportPrompt> PlaylistImporter<C, P> {
    pub fn new(client: C, prompt: P, account_id: String, batch: BatchConfig) -> Self {
        Self {
            client,
            prompt,
            account_id,
            batch,
        }
    }

    /// Imports one XSPF document into the account.
    ///
    /// An unreadable or structurally invalid document fails before any remote call.
    #[instrument(skip(self), fields(account = %self.account_id))]
    pub async fn import_one(&self, path: &Path) -> Result<ImportOutcome> {
        let document = tokio::fs::read(path)
            .await
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        let parsed = xspf::parse(&document)
            .wrap_err_with(|| format!("Failed to parse {}", path.display()))?;

        let is_third_party = parsed
            .metadata
            .owner_id
            .as_deref()
            .is_some_and(|owner| owner != self.account_id);
        let playlist = Playlist::new(
            PlaylistMetadata {
                is_third_party,
                ..parsed.metadata
            },
            parsed.tracks,
        );

        self.import_playlist(playlist).await
    }

    pub async fn import_playlist(&self, playlist: Playlist) -> Result<ImportOutcome> {
        let metadata = &playlist.metadata;
        let uris = track_uris(&playlist);

        match metadata.kind {
            PlaylistKind::SavedTracks => Ok(self.save_to_library(uris).await),
            PlaylistKind::Playlist => {
                let original_id = metadata
                    .location_uri
                    .as_deref()
                    .and_then(playlist_id_from_uri);

                if let Some(original_id) = original_id {
                    if self.prompt.choose(metadata).await == ImportChoice::Follow {
                        match self.client.follow_playlist(original_id).await {
                            Ok(()) => {
                                tracing::info!(playlist = %metadata.name, id = %original_id, "Followed playlist");
                                return Ok(ImportOutcome::Followed {
                                    playlist_id: original_id.to_string(),
                                });
                            }
                            Err(error) => {
                                tracing::warn!(playlist = %metadata.name, error = ?error, "Failed to follow playlist, creating a copy instead");
                            }
                        }
                    }
                }

                self.copy_playlist(metadata, uris).await
            }
        }
    }

    async fn save_to_library(&self, uris: Vec<String>) -> ImportOutcome {
        let mut saved = 0;
        let mut failed_chunks = 0;

        for (index, group) in chunk(uris, self.batch.library_save).enumerate() {
            match self.client.save_tracks_to_library(&group).await {
                Ok(()) => saved += group.len(),
                Err(error) => {
                    tracing::warn!(chunk = index + 1, tracks = group.len(), error = ?error, "Failed to save tracks to library");
                    failed_chunks += 1;
                }
            }
        }

        tracing::info!(saved, failed_chunks, "Saved tracks to library");
        ImportOutcome::SavedToLibrary {
            saved,
            failed_chunks,
        }
    }

    async fn copy_playlist(
        &self,
        metadata: &PlaylistMetadata,
        uris: Vec<String>,
    ) -> Result<ImportOutcome> {
        let playlist_id = self
            .client
            .create_playlist(&self.account_id, &metadata.name, metadata.is_public)
            .await
            .wrap_err_with(|| format!("Failed to create playlist {}", metadata.name))?;
        tracing::info!(playlist = %metadata.name, id = %playlist_id, "Created playlist");

        // Some accounts can't create a playlist as collaborative directly.
        if metadata.is_collaborative {
            if let Err(error) = self.client.set_collaborative(&playlist_id, true).await {
                tracing::warn!(playlist = %metadata.name, error = ?error, "Failed to mark playlist as collaborative");
            }
        }

        let mut added = 0;
        let mut failed_chunks = 0;
        for (index, group) in chunk(uris, self.batch.playlist_add).enumerate() {
            match self.client.add_tracks_to_playlist(&playlist_id, &group).await {
                Ok(()) => added += group.len(),
                Err(error) => {
                    tracing::warn!(chunk = index + 1, tracks = group.len(), error = ?error, "Failed to add tracks to playlist");
                    failed_chunks += 1;
                }
            }
        }

        tracing::info!(playlist = %metadata.name, added, failed_chunks, "Added tracks");
        Ok(ImportOutcome::Copied {
            playlist_id,
            added,
            failed_chunks,
        })
    }
}

/// Track URIs in order, without entries that have nothing to send.
fn track_uris(playlist: &Playlist) -> Vec<String> {
    let uris: Vec<String> = playlist
        .uris()
        .into_iter()
        .map(str::trim)
        .filter(|uri| !uri.is_empty())
        .map(str::to_string)
        .collect();

    let skipped = playlist.tracks.len() - uris.len();
    if skipped > 0 {
        tracing::warn!(playlist = %playlist.metadata.name, skipped, "Skipping tracks without location");
    }
    uris
}
