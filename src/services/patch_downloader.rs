//! Patch downloader: resolves the seed's patch and runs the scan around it.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::domain::errors::{DownloadError, DownloadResult};
use crate::domain::models::{FailurePolicy, GameId, Outcome, RetrySchedule, ScanLimits};
use crate::domain::ports::{GameFilter, GameTransport};
use crate::services::attempt_evaluator::AttemptEvaluator;
use crate::services::patch_extractor::extract_patch;
use crate::services::scanner::{PatchScanner, ScanOptions};

/// Downloads every game of the patch a starting game belongs to.
///
/// # Example
///
/// ```no_run
/// # use std::sync::Arc;
/// # use futures::StreamExt;
/// # use requester::domain::models::{GameId, RetryProfile};
/// # use requester::infrastructure::client::{GameApiClient, GameApiClientConfig};
/// # use requester::services::PatchDownloader;
/// # async fn example() -> anyhow::Result<()> {
/// let client = Arc::new(GameApiClient::new(GameApiClientConfig::default())?);
/// let downloader = PatchDownloader::new(client, RetryProfile::Standard.schedule());
///
/// let mut games = downloader.download_patch(GameId::new(13_594_270)).await?;
/// while let Some(outcome) = games.next().await {
///     println!("{:?}", outcome?.kind());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct PatchDownloader {
    evaluator: AttemptEvaluator,
    options: ScanOptions,
}

impl PatchDownloader {
    pub fn new(transport: Arc<dyn GameTransport>, schedule: RetrySchedule) -> Self {
        Self {
            evaluator: AttemptEvaluator::new(transport, schedule),
            options: ScanOptions::default(),
        }
    }

    /// Only attempt candidates the filter accepts. The seed is always fetched.
    pub fn with_filter(mut self, filter: Arc<dyn GameFilter>) -> Self {
        self.evaluator = self.evaluator.with_filter(filter);
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.options.on_failure = policy;
        self
    }

    pub fn with_limits(mut self, limits: ScanLimits) -> Self {
        self.options.limits = limits;
        self
    }

    pub const fn evaluator(&self) -> &AttemptEvaluator {
        &self.evaluator
    }

    /// Fetch the seed and return the outcome stream around it.
    ///
    /// Fails before yielding anything when the seed cannot be downloaded or
    /// its patch cannot be read: without a known patch there is nothing to
    /// bound the scan with. The stream's first item is the seed's
    /// `Downloaded` outcome.
    #[instrument(skip(self))]
    pub async fn download_patch(&self, start: GameId) -> DownloadResult<PatchScanner> {
        let seed = self.evaluator.evaluate(start, None, true).await?;
        self.download_patch_from(seed)
    }

    /// Scan around a seed that has already been evaluated, without fetching
    /// it again. Same preconditions as [`Self::download_patch`].
    pub fn download_patch_from(&self, seed: Outcome) -> DownloadResult<PatchScanner> {
        let start = seed.game_id();
        let expected = match &seed {
            Outcome::Downloaded { body, .. } => {
                extract_patch(body).ok_or(DownloadError::SeedPatchUnknown { game_id: start })?
            }
            Outcome::Failed {
                attempts_made,
                last_response,
                ..
            } => {
                return Err(DownloadError::SeedUnavailable {
                    game_id: start,
                    attempts_made: *attempts_made,
                    status: last_response.as_ref().map(|r| r.status),
                });
            }
            Outcome::Skipped { .. } | Outcome::PatchMismatch { .. } => {
                return Err(DownloadError::SeedUnavailable {
                    game_id: start,
                    attempts_made: 0,
                    status: None,
                });
            }
        };

        info!(%start, patch = %expected, "Resolved target patch");
        Ok(PatchScanner::with_leading(
            self.evaluator.clone(),
            start,
            expected,
            self.options,
            seed,
        ))
    }
}
