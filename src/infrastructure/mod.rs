//! Infrastructure layer module
//!
//! Adapters and external integrations:
//! - HTTP client for the games endpoint
//! - Rolling-window call budget
//! - API key resolution
//! - Configuration management
//! - Logging infrastructure
//! - Payload storage on disk
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod client;
pub mod config;
pub mod credentials;
pub mod logging;
pub mod rate_limiter;
pub mod storage;
