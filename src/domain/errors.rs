//! Domain errors for the patch downloader.

use std::path::PathBuf;
use thiserror::Error;

use super::models::GameId;

/// The API key could not be obtained.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Failed to read API key from {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable {0} holding the API key is not set")]
    MissingEnv(String),

    #[error("API key is empty")]
    Empty,
}

/// Errors a transport can return for a single fetch.
///
/// Anything that is not fatal is treated by the evaluator as an
/// unsuccessful attempt and retried per the schedule.
#[derive(Error, Debug)]
pub enum TransportError {
    /// No credential available; nothing was sent
    #[error("Credential unavailable: {0}")]
    Credential(#[from] CredentialError),

    /// Network or connection error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request timeout
    #[error("Request timeout")]
    Timeout,
}

impl TransportError {
    /// Returns true if no amount of retrying can help.
    pub const fn is_fatal(&self) -> bool {
        matches!(self, Self::Credential(_))
    }

    /// Returns true if this error is transient and should be retried
    pub const fn is_transient(&self) -> bool {
        !self.is_fatal()
    }
}

/// Run-level failures of a patch download.
///
/// Everything that goes wrong with an individual candidate is reported as an
/// [`Outcome`](super::models::Outcome) instead.
#[derive(Error, Debug)]
pub enum DownloadError {
    #[error(
        "Seed game {game_id} could not be downloaded after {attempts_made} attempt(s){}",
        status.map(|s| format!(" (last HTTP status {s})")).unwrap_or_default()
    )]
    SeedUnavailable {
        game_id: GameId,
        attempts_made: usize,
        status: Option<u16>,
    },

    #[error("Patch version of seed game {game_id} could not be determined")]
    SeedPatchUnknown { game_id: GameId },

    #[error("Credential unavailable: {0}")]
    Credential(#[from] CredentialError),
}

pub type DownloadResult<T> = Result<T, DownloadError>;
