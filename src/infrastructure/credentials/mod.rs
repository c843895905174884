//! Credentials management infrastructure
//!
//! API key retrieval for the games endpoint:
//! - Explicitly supplied key
//! - Local secret file (`key.secret` by default)
//! - Environment variable

use std::path::PathBuf;
use tracing::debug;

use crate::domain::errors::CredentialError;
use crate::domain::models::ApiConfig;

/// Where the API key comes from.
#[derive(Clone, PartialEq, Eq)]
pub enum ApiKeySource {
    Explicit(String),
    File(PathBuf),
    Env(String),
}

impl ApiKeySource {
    /// Pick the source described by the API config: a direct key wins, then
    /// an environment variable, then the key file.
    pub fn from_config(config: &ApiConfig) -> Self {
        if let Some(key) = &config.api_key {
            Self::Explicit(key.clone())
        } else if let Some(var) = &config.api_key_env {
            Self::Env(var.clone())
        } else {
            Self::File(config.key_file.clone())
        }
    }

    /// Obtain the key. Surrounding whitespace is trimmed; an empty key is
    /// an error.
    pub async fn resolve(&self) -> Result<String, CredentialError> {
        let key = match self {
            Self::Explicit(key) => key.clone(),
            Self::File(path) => {
                debug!(path = %path.display(), "Reading API key file");
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| CredentialError::Read {
                        path: path.clone(),
                        source,
                    })?
            }
            Self::Env(var) => {
                std::env::var(var).map_err(|_| CredentialError::MissingEnv(var.clone()))?
            }
        };

        let key = key.trim();
        if key.is_empty() {
            return Err(CredentialError::Empty);
        }
        Ok(key.to_string())
    }
}

impl std::fmt::Debug for ApiKeySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Explicit(key) => f.debug_tuple("Explicit").field(&redact_key(key)).finish(),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Env(var) => f.debug_tuple("Env").field(var).finish(),
        }
    }
}

/// Scrub an API key for logging, keeping a short prefix for recognition.
pub fn redact_key(key: &str) -> String {
    match key.get(..4) {
        Some(prefix) if key.len() > 8 => format!("{prefix}...[REDACTED]"),
        _ => "[REDACTED]".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_explicit_key() {
        let source = ApiKeySource::Explicit("  abc123  ".to_string());
        assert_eq!(source.resolve().await.unwrap(), "abc123");
    }

    #[tokio::test]
    async fn test_file_key_trims_newline() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "secret-from-file").unwrap();
        file.flush().unwrap();

        let source = ApiKeySource::File(file.path().to_path_buf());
        assert_eq!(source.resolve().await.unwrap(), "secret-from-file");
    }

    #[tokio::test]
    async fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = ApiKeySource::File(dir.path().join("key.secret"));
        let err = source.resolve().await.unwrap_err();
        assert!(matches!(err, CredentialError::Read { .. }));
    }

    #[tokio::test]
    async fn test_empty_key_is_error() {
        let source = ApiKeySource::Explicit("   ".to_string());
        assert!(matches!(source.resolve().await, Err(CredentialError::Empty)));
    }

    #[tokio::test]
    async fn test_env_key() {
        let source = ApiKeySource::Env("REQUESTER_TEST_API_KEY_SET".to_string());
        let key = temp_env::async_with_vars(
            [("REQUESTER_TEST_API_KEY_SET", Some("from-env"))],
            source.resolve(),
        )
        .await;
        assert_eq!(key.unwrap(), "from-env");

        let missing = ApiKeySource::Env("REQUESTER_TEST_API_KEY_UNSET".to_string());
        assert!(matches!(
            missing.resolve().await,
            Err(CredentialError::MissingEnv(_))
        ));
    }

    #[test]
    fn test_from_config_precedence() {
        let mut config = ApiConfig::default();
        assert_eq!(
            ApiKeySource::from_config(&config),
            ApiKeySource::File(PathBuf::from("key.secret"))
        );

        config.api_key_env = Some("BSER_KEY".to_string());
        assert_eq!(
            ApiKeySource::from_config(&config),
            ApiKeySource::Env("BSER_KEY".to_string())
        );

        config.api_key = Some("direct".to_string());
        assert_eq!(
            ApiKeySource::from_config(&config),
            ApiKeySource::Explicit("direct".to_string())
        );
    }

    #[test]
    fn test_redact_key() {
        assert_eq!(redact_key("abcdefghijkl"), "abcd...[REDACTED]");
        assert_eq!(redact_key("short"), "[REDACTED]");
        assert!(!format!("{:?}", ApiKeySource::Explicit("abcdefghijkl".into())).contains("ijkl"));
    }
}
