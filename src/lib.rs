//! Requester - patch-bounded match downloader
//!
//! Given one match id, downloads every match played on the same game patch
//! by walking ids downwards and then upwards until each direction crosses
//! into another patch. Requests share one rate limit and are retried on a
//! fixed delay schedule.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, errors and the transport/filter ports
//! - **Service Layer** (`services`): retry loop, patch extraction and the scan
//! - **Infrastructure Layer** (`infrastructure`): HTTP client, config, logging, storage
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use futures::StreamExt;
//! use requester::{GameApiClient, GameApiClientConfig, GameId, PatchDownloader, RetryProfile};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Arc::new(GameApiClient::new(GameApiClientConfig::default())?);
//!     let downloader = PatchDownloader::new(client, RetryProfile::Standard.schedule());
//!
//!     let mut games = downloader.download_patch(GameId::new(13_594_270)).await?;
//!     while let Some(outcome) = games.next().await {
//!         println!("{:?}", outcome?.kind());
//!     }
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Config, FailurePolicy, GameId, GameResponse, Outcome, OutcomeKind, PatchVersion,
    RetryProfile, RetrySchedule, ScanLimits, VersionPart,
};
pub use domain::ports::{GameFilter, GameTransport};
pub use domain::{CredentialError, DownloadError, DownloadResult, TransportError};
pub use infrastructure::client::{GameApiClient, GameApiClientConfig};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use infrastructure::storage::GameStore;
pub use services::{PatchDownloader, PatchScanner};
