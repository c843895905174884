use async_trait::async_trait;
use reqwest::{header, Client as ReqwestClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info, instrument};

use super::credentials::{redact_key, ApiKeySource};
use super::rate_limiter::CallBudget;
use crate::domain::errors::TransportError;
use crate::domain::models::{ApiConfig, GameId, GameResponse};
use crate::domain::ports::GameTransport;

/// Configuration for the games API client
#[derive(Debug, Clone)]
pub struct GameApiClientConfig {
    /// Where the API key comes from
    pub api_key: ApiKeySource,

    /// Games endpoint; the id is appended as the last path segment
    pub base_url: String,

    /// Calls allowed per window
    pub calls_per_window: usize,

    /// Rate limit window
    pub window: Duration,

    /// Request timeout
    pub timeout: Duration,
}

impl Default for GameApiClientConfig {
    fn default() -> Self {
        Self::from_api_config(&ApiConfig::default())
    }
}

impl GameApiClientConfig {
    pub fn from_api_config(config: &ApiConfig) -> Self {
        Self {
            api_key: ApiKeySource::from_config(config),
            base_url: config.base_url.clone(),
            calls_per_window: usize::try_from(config.calls_per_window).unwrap_or(usize::MAX),
            window: Duration::from_millis(config.window_ms),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }
}

/// HTTP client for the games endpoint
///
/// Provides:
/// - Connection pooling and reuse
/// - A rolling-window call budget shared by every request
/// - Lazy, cached API key resolution
///
/// Retrying is not done here; one `fetch` is one request.
pub struct GameApiClient {
    http_client: ReqwestClient,
    base_url: String,
    key_source: ApiKeySource,
    api_key: OnceCell<String>,
    budget: Arc<CallBudget>,
}

impl GameApiClient {
    /// Create a client with its own call budget
    ///
    /// # Example
    /// ```no_run
    /// use requester::infrastructure::client::{GameApiClient, GameApiClientConfig};
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = GameApiClient::new(GameApiClientConfig::default())?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(config: GameApiClientConfig) -> Result<Self, TransportError> {
        let budget = Arc::new(CallBudget::new(config.calls_per_window, config.window));
        Self::with_budget(config, budget)
    }

    /// Create a client drawing from an existing call budget, so several
    /// clients stay within one limit.
    pub fn with_budget(
        config: GameApiClientConfig,
        budget: Arc<CallBudget>,
    ) -> Result<Self, TransportError> {
        info!(
            base_url = %config.base_url,
            calls = budget.max_calls(),
            window = ?budget.window(),
            timeout = ?config.timeout,
            key_source = ?config.api_key,
            "Initializing games API client"
        );

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let http_client = ReqwestClient::builder()
            .pool_max_idle_per_host(2)
            .timeout(config.timeout)
            .tcp_nodelay(true)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key_source: config.api_key,
            api_key: OnceCell::new(),
            budget,
        })
    }

    pub fn budget(&self) -> Arc<CallBudget> {
        Arc::clone(&self.budget)
    }

    pub fn url_for(&self, game_id: GameId) -> String {
        format!("{}/{}", self.base_url, game_id)
    }

    async fn api_key(&self) -> Result<&str, TransportError> {
        let key = self
            .api_key
            .get_or_try_init(|| async {
                let key = self.key_source.resolve().await?;
                debug!(api_key = %redact_key(&key), "Resolved API key");
                Ok::<_, TransportError>(key)
            })
            .await?;
        Ok(key.as_str())
    }
}

#[async_trait]
impl GameTransport for GameApiClient {
    #[instrument(skip(self), fields(game_id = %game_id))]
    async fn fetch(&self, game_id: GameId) -> Result<GameResponse, TransportError> {
        // Credential first: a missing key must not cost a call
        let api_key = self.api_key().await?;

        self.budget.acquire().await;

        let url = self.url_for(game_id);
        debug!("Requesting {}", url);

        let response = self
            .http_client
            .get(&url)
            .header("x-api-key", api_key)
            .send()
            .await
            .map_err(classify_reqwest_error)?;

        let status = response.status().as_u16();
        let raw = response.bytes().await.map_err(classify_reqwest_error)?;

        debug!(status, bytes = raw.len(), "Response received");
        Ok(GameResponse::from_bytes(status, raw.to_vec()))
    }
}

fn classify_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Network(err)
    }
}
