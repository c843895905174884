use serde::{Deserialize, Deserializer, Serialize};
use std::path::PathBuf;

use super::retry::FailurePolicy;

/// Main configuration structure for the requester
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Game the scan starts from
    #[serde(default)]
    pub starting_game_id: Option<i64>,

    /// Re-download games whose file already exists
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub overwrite_old_data: bool,

    /// Directory the raw game payloads are written to
    #[serde(default = "default_target_directory")]
    pub target_directory: PathBuf,

    /// Named retry profile (standard, aggressive)
    #[serde(default = "default_retry_profile")]
    pub retry_profile: String,

    /// Explicit retry delays in seconds, overrides `retry_profile`
    #[serde(default)]
    pub retry_schedule_secs: Option<Vec<f64>>,

    /// Remote API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Scan behaviour
    #[serde(default)]
    pub scan: ScanConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_target_directory() -> PathBuf {
    PathBuf::from("data").join("games").join("raw")
}

fn default_retry_profile() -> String {
    "standard".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            starting_game_id: None,
            overwrite_old_data: false,
            target_directory: default_target_directory(),
            retry_profile: default_retry_profile(),
            retry_schedule_secs: None,
            api: ApiConfig::default(),
            scan: ScanConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Strings that turn a flag off; anything else turns it on.
const FALSY_VALUES: [&str; 4] = ["", "false", "no", "0"];

/// Interpret a loosely typed flag (`"no"`, `"0"`, `true`, ...) as a bool.
pub fn parse_flag(value: &str) -> bool {
    !FALSY_VALUES.contains(&value.trim().to_ascii_lowercase().as_str())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LooseFlag {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match LooseFlag::deserialize(deserializer)? {
        LooseFlag::Bool(b) => b,
        LooseFlag::Int(n) => n != 0,
        LooseFlag::Text(s) => parse_flag(&s),
    })
}

/// Remote API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ApiConfig {
    /// Games endpoint; the game id is appended as the last path segment
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// File holding the API key, read when no key is given directly
    #[serde(default = "default_key_file")]
    pub key_file: PathBuf,

    /// API key given directly
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable to read the API key from instead of `key_file`
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Calls allowed per window
    #[serde(default = "default_calls_per_window")]
    pub calls_per_window: u32,

    /// Window length in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

fn default_base_url() -> String {
    "https://open-api.bser.io/v1/games".to_string()
}

fn default_key_file() -> PathBuf {
    PathBuf::from("key.secret")
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_calls_per_window() -> u32 {
    1
}

const fn default_window_ms() -> u64 {
    1000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            key_file: default_key_file(),
            api_key: None,
            api_key_env: None,
            timeout_secs: default_timeout_secs(),
            calls_per_window: default_calls_per_window(),
            window_ms: default_window_ms(),
        }
    }
}

/// Scan behaviour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ScanConfig {
    /// What to do after a candidate exhausts its retries
    #[serde(default)]
    pub on_failure: FailurePolicy,

    /// Cap on candidates evaluated per direction
    #[serde(default)]
    pub max_candidates_per_direction: Option<u64>,

    /// How far around the starting id to look for a usable seed (0 = off)
    #[serde(default)]
    pub seed_search_radius: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for daily-rotated JSON log files
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
        }
    }
}
