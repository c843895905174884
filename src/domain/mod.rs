//! Domain layer for the patch downloader
//!
//! Game identifiers, patch versions, outcomes, configuration models and the
//! ports the core talks to.

pub mod errors;
pub mod models;
pub mod ports;

// Re-export error types for convenient access
pub use errors::{CredentialError, DownloadError, DownloadResult, TransportError};
