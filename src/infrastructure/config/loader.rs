use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

use crate::domain::models::config::Config;
use crate::domain::models::{RetryProfile, RetrySchedule, ScanLimits, ScheduleError};
use crate::services::scanner::ScanOptions;

/// Project config file picked up from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "requester.yaml";

/// Bare environment variables honoured for compatibility with older
/// deployments. They sit below the `REQUESTER_*` variables.
pub const LEGACY_ENV_VARS: [&str; 4] = [
    "starting_game_id",
    "overwrite_old_data",
    "target_directory",
    "retry_profile",
];

/// Configuration error types
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("No starting game id configured. Set STARTING_GAME_ID or pass --start")]
    MissingStartingGameId,

    #[error("Invalid calls_per_window: {0}. Must be at least 1")]
    InvalidCallsPerWindow(u32),

    #[error("Invalid window_ms: {0}. Must be positive")]
    InvalidWindow(u64),

    #[error("Invalid timeout_secs: {0}. Must be positive")]
    InvalidTimeout(u64),

    #[error("API base_url cannot be empty")]
    EmptyBaseUrl,

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid retry schedule: {0}")]
    InvalidSchedule(#[from] ScheduleError),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. requester.yaml in the working directory (optional)
    /// 3. Legacy bare variables (STARTING_GAME_ID, OVERWRITE_OLD_DATA, ...)
    /// 4. Environment variables (REQUESTER_* prefix, `__` for nesting)
    pub fn load() -> Result<Config> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Same as [`load`](Self::load) with a specific file in place of
    /// `requester.yaml`. A missing file is not an error.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Self::figment(path.as_ref())
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment(path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::raw().only(&LEGACY_ENV_VARS))
            .merge(Env::prefixed("REQUESTER_").split("__"))
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.api.calls_per_window == 0 {
            return Err(ConfigError::InvalidCallsPerWindow(config.api.calls_per_window));
        }

        if config.api.window_ms == 0 {
            return Err(ConfigError::InvalidWindow(config.api.window_ms));
        }

        if config.api.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.api.timeout_secs));
        }

        if config.api.base_url.trim().is_empty() {
            return Err(ConfigError::EmptyBaseUrl);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        if let Some(secs) = &config.retry_schedule_secs {
            RetrySchedule::from_secs(secs)?;
        }

        Ok(())
    }

    /// Retry schedule for this config: the explicit list when given, the
    /// named profile otherwise. Unknown profile names fall back to
    /// `standard`.
    pub fn retry_schedule(config: &Config) -> Result<RetrySchedule, ConfigError> {
        if let Some(secs) = &config.retry_schedule_secs {
            return Ok(RetrySchedule::from_secs(secs)?);
        }

        let profile = RetryProfile::from_name(&config.retry_profile).unwrap_or_else(|| {
            warn!(
                profile = %config.retry_profile,
                "Unknown retry profile, using standard"
            );
            RetryProfile::Standard
        });
        Ok(profile.schedule())
    }

    pub fn scan_options(config: &Config) -> ScanOptions {
        ScanOptions {
            on_failure: config.scan.on_failure,
            limits: ScanLimits {
                max_candidates_per_direction: config.scan.max_candidates_per_direction,
            },
        }
    }
}
