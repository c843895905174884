//! On-disk storage of raw game payloads, one `<id>.json` file per game.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::domain::models::{GameId, Outcome};
use crate::domain::ports::GameFilter;

/// Directory of raw game payloads.
#[derive(Debug, Clone)]
pub struct GameStore {
    root: PathBuf,
}

impl GameStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, game_id: GameId) -> PathBuf {
        self.root.join(format!("{game_id}.json"))
    }

    /// Create the target directory if needed.
    pub async fn ensure_layout(&self) -> Result<()> {
        if tokio::fs::try_exists(&self.root).await.unwrap_or(false) {
            info!(path = %self.root.display(), "Recognized download folder structure");
            return Ok(());
        }

        info!(path = %self.root.display(), "Creating download folder structure");
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("Failed to create {}", self.root.display()))
    }

    /// Write the raw response bytes of an outcome, replacing any previous
    /// file. Returns the written path, or `None` when the outcome carries
    /// no response (skipped, or failed without ever getting one).
    pub async fn persist(&self, outcome: &Outcome) -> Result<Option<PathBuf>> {
        let Some(bytes) = outcome.raw_bytes() else {
            debug!(game_id = %outcome.game_id(), kind = outcome.kind().as_str(), "Nothing to write");
            return Ok(None);
        };

        let path = self.path_for(outcome.game_id());
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;

        info!(bytes = bytes.len(), path = %path.display(), "Written game payload");
        Ok(Some(path))
    }

    /// Filter that only lets through games without a file in this store.
    pub fn missing_file_filter(&self) -> MissingFileFilter {
        MissingFileFilter {
            store: self.clone(),
        }
    }
}

/// Accepts a game only when its payload file does not exist yet.
#[derive(Debug, Clone)]
pub struct MissingFileFilter {
    store: GameStore,
}

impl GameFilter for MissingFileFilter {
    // Filters are synchronous; a single metadata lookup is cheap enough to
    // run on the runtime thread.
    fn should_attempt(&self, game_id: GameId) -> bool {
        let path = self.store.path_for(game_id);
        match path.try_exists() {
            Ok(exists) => !exists,
            Err(err) => {
                warn!(
                    %game_id,
                    path = %path.display(),
                    error = %err,
                    "Cannot check for existing payload, downloading"
                );
                true
            }
        }
    }
}
