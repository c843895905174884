//! Retry loop and outcome classification for a single candidate.

use std::sync::Arc;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

use crate::domain::errors::{DownloadError, TransportError};
use crate::domain::models::{GameId, GameResponse, Outcome, PatchVersion, RetrySchedule};
use crate::domain::ports::{AcceptAll, GameFilter, GameTransport};
use crate::services::patch_extractor::extract_patch;

/// Runs the bounded retry loop for one candidate and classifies the result.
///
/// Cheap to clone: the transport and filter are shared.
#[derive(Clone)]
pub struct AttemptEvaluator {
    transport: Arc<dyn GameTransport>,
    filter: Arc<dyn GameFilter>,
    schedule: RetrySchedule,
}

impl AttemptEvaluator {
    /// Create an evaluator that attempts every candidate.
    pub fn new(transport: Arc<dyn GameTransport>, schedule: RetrySchedule) -> Self {
        Self {
            transport,
            filter: Arc::new(AcceptAll),
            schedule,
        }
    }

    /// Replace the filter consulted before each non-seed candidate.
    pub fn with_filter(mut self, filter: Arc<dyn GameFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub const fn schedule(&self) -> &RetrySchedule {
        &self.schedule
    }

    /// Evaluate one candidate.
    ///
    /// Returns `Err` only for failures that make the whole run pointless
    /// (no credential). Everything else becomes an [`Outcome`].
    ///
    /// Timing: attempt `k` is preceded by `schedule[k]`. Nothing is slept
    /// after the final attempt.
    #[instrument(skip(self, expected), fields(game_id = %game_id))]
    pub async fn evaluate(
        &self,
        game_id: GameId,
        expected: Option<&PatchVersion>,
        bypass_filter: bool,
    ) -> Result<Outcome, DownloadError> {
        if !bypass_filter && !self.filter.should_attempt(game_id) {
            info!(%game_id, reason = "Predicate filtered", "Skipping download");
            return Ok(Outcome::Skipped { game_id });
        }

        let max_attempts = self.schedule.max_attempts();
        let mut attempt = 0;
        let mut last_response = None;

        loop {
            let delay = self.schedule.delay_before(attempt);
            if !delay.is_zero() {
                debug!(%game_id, attempt = attempt + 1, ?delay, "Waiting before attempt");
                sleep(delay).await;
            }

            match self.transport.fetch(game_id).await {
                Ok(response) if response.is_success() => {
                    if attempt > 0 {
                        debug!(%game_id, retries = attempt, "Download succeeded after retries");
                    }
                    return Ok(Self::classify(game_id, response, expected));
                }
                Ok(response) => {
                    debug!(
                        %game_id,
                        attempt = attempt + 1,
                        status = response.status,
                        envelope_code = ?response.envelope_code(),
                        "Unsuccessful response"
                    );
                    last_response = Some(response);
                }
                Err(TransportError::Credential(err)) => return Err(err.into()),
                Err(err) => {
                    warn!(%game_id, attempt = attempt + 1, error = %err, "Request failed");
                }
            }

            attempt += 1;
            if attempt >= max_attempts {
                info!(%game_id, attempts = attempt, "Reached maximum attempts for download");
                return Ok(Outcome::Failed {
                    game_id,
                    attempts_made: attempt,
                    last_response,
                });
            }
        }
    }

    fn classify(game_id: GameId, response: GameResponse, expected: Option<&PatchVersion>) -> Outcome {
        let body = response.body.clone().unwrap_or_default();
        let observed = extract_patch(&body);

        match expected {
            Some(expected) if observed.as_ref() != Some(expected) => {
                match &observed {
                    Some(patch) => {
                        info!(%game_id, observed = %patch, %expected, "Reached patch boundary");
                    }
                    None => warn!(%game_id, "Unable to retrieve patch"),
                }
                Outcome::PatchMismatch {
                    game_id,
                    observed,
                    expected: expected.clone(),
                    response,
                }
            }
            _ => Outcome::Downloaded {
                game_id,
                body,
                response,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    use crate::domain::errors::CredentialError;

    /// Hands out queued results in order, repeating the last one forever.
    struct Queued {
        results: Mutex<VecDeque<Result<GameResponse, TransportError>>>,
        last: GameResponse,
        calls: Mutex<usize>,
    }

    impl Queued {
        fn new(results: Vec<Result<GameResponse, TransportError>>, last: GameResponse) -> Arc<Self> {
            Arc::new(Self {
                results: Mutex::new(results.into()),
                last,
                calls: Mutex::new(0),
            })
        }

        fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    #[async_trait]
    impl GameTransport for Queued {
        async fn fetch(&self, _game_id: GameId) -> Result<GameResponse, TransportError> {
            *self.calls.lock().unwrap() += 1;
            let next = self.results.lock().unwrap().pop_front();
            next.unwrap_or_else(|| Ok(self.last.clone()))
        }
    }

    fn game(major: i64, hotfix: i64) -> GameResponse {
        let body = json!({"code": 200, "userGames": [{"versionMajor": major, "versionMinor": hotfix}]});
        GameResponse::from_bytes(200, serde_json::to_vec(&body).unwrap())
    }

    fn envelope(code: i64) -> GameResponse {
        GameResponse::from_bytes(200, serde_json::to_vec(&json!({"code": code})).unwrap())
    }

    /// Let spawned tasks run until they park on a timer.
    async fn settle() {
        for _ in 0..5 {
            tokio::task::yield_now().await;
        }
    }

    fn schedule(secs: &[u64]) -> RetrySchedule {
        RetrySchedule::new(secs.iter().map(|&s| Duration::from_secs(s)).collect()).unwrap()
    }

    #[tokio::test]
    async fn test_downloaded_without_expectation() {
        let transport = Queued::new(vec![], game(45, 0));
        let evaluator = AttemptEvaluator::new(transport.clone(), RetrySchedule::once());

        let outcome = evaluator.evaluate(GameId(11), None, true).await.unwrap();
        assert!(matches!(outcome, Outcome::Downloaded { game_id: GameId(11), .. }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn test_matching_patch_is_downloaded() {
        let transport = Queued::new(vec![], game(45, 0));
        let evaluator = AttemptEvaluator::new(transport, RetrySchedule::once());
        let expected = PatchVersion::new(45, 0);

        let outcome = evaluator.evaluate(GameId(12), Some(&expected), false).await.unwrap();
        match outcome {
            Outcome::Downloaded { body, .. } => {
                assert_eq!(body["userGames"][0]["versionMajor"], 45);
            }
            other => panic!("expected Downloaded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_different_patch_is_mismatch() {
        let transport = Queued::new(vec![], game(44, 0));
        let evaluator = AttemptEvaluator::new(transport, RetrySchedule::once());
        let expected = PatchVersion::new(45, 0);

        let outcome = evaluator.evaluate(GameId(9), Some(&expected), false).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::PatchMismatch {
                game_id: GameId(9),
                observed: Some(PatchVersion::new(44, 0)),
                expected,
                response: game(44, 0),
            }
        );
    }

    #[tokio::test]
    async fn test_indeterminate_patch_is_mismatch_when_expected() {
        let transport = Queued::new(vec![], envelope(200));
        let evaluator = AttemptEvaluator::new(transport, RetrySchedule::once());
        let expected = PatchVersion::new(45, 0);

        let outcome = evaluator.evaluate(GameId(9), Some(&expected), false).await.unwrap();
        assert!(matches!(outcome, Outcome::PatchMismatch { observed: None, .. }));
    }

    #[tokio::test]
    async fn test_indeterminate_patch_is_downloaded_without_expectation() {
        let transport = Queued::new(vec![], envelope(200));
        let evaluator = AttemptEvaluator::new(transport, RetrySchedule::once());

        let outcome = evaluator.evaluate(GameId(9), None, true).await.unwrap();
        assert!(matches!(outcome, Outcome::Downloaded { .. }));
    }

    #[tokio::test]
    async fn test_filtered_candidate_makes_no_call() {
        let transport = Queued::new(vec![], game(44, 0));
        let evaluator = AttemptEvaluator::new(transport.clone(), RetrySchedule::once())
            .with_filter(Arc::new(|id: GameId| id != GameId(11)));
        let expected = PatchVersion::new(45, 0);

        let outcome = evaluator.evaluate(GameId(11), Some(&expected), false).await.unwrap();
        assert_eq!(outcome, Outcome::Skipped { game_id: GameId(11) });
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_bypass_ignores_filter() {
        let transport = Queued::new(vec![], game(45, 0));
        let evaluator = AttemptEvaluator::new(transport.clone(), RetrySchedule::once())
            .with_filter(Arc::new(|_: GameId| false));

        let outcome = evaluator.evaluate(GameId(11), None, true).await.unwrap();
        assert!(matches!(outcome, Outcome::Downloaded { .. }));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_schedule_fails_after_all_attempts() {
        let transport = Queued::new(vec![], envelope(404));
        let evaluator = AttemptEvaluator::new(transport.clone(), schedule(&[1, 2, 5]));

        let start = Instant::now();
        let outcome = evaluator.evaluate(GameId(13), None, false).await.unwrap();
        let elapsed = start.elapsed();

        assert_eq!(
            outcome,
            Outcome::Failed {
                game_id: GameId(13),
                attempts_made: 3,
                last_response: Some(envelope(404)),
            }
        );
        assert_eq!(transport.calls(), 3);
        // Every entry elapses, including the one before the final attempt.
        assert!(elapsed >= Duration::from_secs(8), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(9), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_each_attempt_waits_for_its_own_delay() {
        let transport = Queued::new(vec![], envelope(404));
        let evaluator = AttemptEvaluator::new(transport.clone(), schedule(&[0, 1, 30]));

        let handle = tokio::spawn({
            let evaluator = evaluator.clone();
            async move { evaluator.evaluate(GameId(13), None, false).await }
        });

        settle().await;
        assert_eq!(transport.calls(), 1, "leading zero delay fires at once");

        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
        assert_eq!(transport.calls(), 2);

        tokio::time::advance(Duration::from_secs(29)).await;
        settle().await;
        assert_eq!(transport.calls(), 2, "last delay has not elapsed yet");

        tokio::time::advance(Duration::from_secs(1)).await;
        let outcome = handle.await.unwrap().unwrap();
        assert_eq!(transport.calls(), 3);
        assert!(matches!(outcome, Outcome::Failed { attempts_made: 3, .. }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_leading_zero_makes_first_attempt_immediate() {
        let transport = Queued::new(vec![], game(45, 0));
        let evaluator = AttemptEvaluator::new(transport, schedule(&[0, 30]));

        let start = Instant::now();
        evaluator.evaluate(GameId(1), None, false).await.unwrap();
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_leading_delay_precedes_first_attempt() {
        let transport = Queued::new(vec![], game(45, 0));
        let evaluator = AttemptEvaluator::new(transport.clone(), schedule(&[1, 2, 5]));

        let start = Instant::now();
        evaluator.evaluate(GameId(1), None, false).await.unwrap();
        assert_eq!(transport.calls(), 1);
        assert!(start.elapsed() >= Duration::from_secs(1));
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_on_later_attempt() {
        let transport = Queued::new(
            vec![
                Ok(GameResponse::from_bytes(503, b"busy".to_vec())),
                Err(TransportError::Timeout),
            ],
            game(45, 0),
        );
        let evaluator = AttemptEvaluator::new(transport.clone(), schedule(&[0, 1, 2, 5]));

        let outcome = evaluator.evaluate(GameId(5), None, false).await.unwrap();
        assert!(matches!(outcome, Outcome::Downloaded { .. }));
        assert_eq!(transport.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_without_any_response() {
        let transport = Queued::new(
            vec![Err(TransportError::Timeout), Err(TransportError::Timeout)],
            game(45, 0),
        );
        let evaluator = AttemptEvaluator::new(transport, schedule(&[0, 0]));

        let outcome = evaluator.evaluate(GameId(5), None, false).await.unwrap();
        assert_eq!(
            outcome,
            Outcome::Failed {
                game_id: GameId(5),
                attempts_made: 2,
                last_response: None,
            }
        );
    }

    #[tokio::test]
    async fn test_credential_error_is_fatal() {
        let transport = Queued::new(
            vec![Err(TransportError::Credential(CredentialError::Empty))],
            game(45, 0),
        );
        let evaluator = AttemptEvaluator::new(transport.clone(), schedule(&[0, 0, 0]));

        let result = evaluator.evaluate(GameId(5), None, false).await;
        assert!(matches!(result, Err(DownloadError::Credential(CredentialError::Empty))));
        assert_eq!(transport.calls(), 1);
    }
}
