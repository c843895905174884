//! Bidirectional, patch-bounded scan around a starting game.
//!
//! The scan walks downwards from `start - 1` until that direction ends, then
//! upwards from `start + 1`. A direction ends at its first
//! [`Outcome::PatchMismatch`] (which is still yielded), when its candidate
//! cap is reached, or as dictated by the [`FailurePolicy`]. Candidates are
//! evaluated one at a time, only when the consumer polls for the next item;
//! dropping the stream stops the scan.

use futures::stream::{self, Stream};
use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::{debug, info};

use crate::domain::errors::DownloadError;
use crate::domain::models::{FailurePolicy, GameId, Outcome, PatchVersion, ScanLimits};
use crate::services::attempt_evaluator::AttemptEvaluator;

/// Order in which candidates around the start are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Descending,
    Ascending,
}

impl Direction {
    /// Candidate after `id` in this direction, `None` on overflow.
    pub fn step(self, id: GameId) -> Option<GameId> {
        match self {
            Self::Descending => id.predecessor(),
            Self::Ascending => id.successor(),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Descending => "descending",
            Self::Ascending => "ascending",
        }
    }
}

/// Knobs controlling when a direction ends besides a patch boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOptions {
    pub on_failure: FailurePolicy,
    pub limits: ScanLimits,
}

/// Lazily evaluated stream of outcomes around a starting game.
///
/// Yields `Err` only for run-level failures, after which it ends.
pub struct PatchScanner {
    seed: GameId,
    target: PatchVersion,
    inner: Pin<Box<dyn Stream<Item = Result<Outcome, DownloadError>> + Send>>,
}

impl PatchScanner {
    /// Scan both directions around `start`, expecting every record to be on
    /// `expected`.
    pub fn new(
        evaluator: AttemptEvaluator,
        start: GameId,
        expected: PatchVersion,
        options: ScanOptions,
    ) -> Self {
        Self::from_state(ScanState::new(evaluator, start, expected, options, None))
    }

    /// Same as [`PatchScanner::new`], but `leading` is yielded before any
    /// candidate is evaluated.
    pub(crate) fn with_leading(
        evaluator: AttemptEvaluator,
        start: GameId,
        expected: PatchVersion,
        options: ScanOptions,
        leading: Outcome,
    ) -> Self {
        Self::from_state(ScanState::new(evaluator, start, expected, options, Some(leading)))
    }

    fn from_state(state: ScanState) -> Self {
        Self {
            seed: state.start,
            target: state.expected.clone(),
            inner: Box::pin(stream::unfold(state, ScanState::advance)),
        }
    }

    pub const fn seed(&self) -> GameId {
        self.seed
    }

    /// Patch every downloaded record belongs to.
    pub const fn target_patch(&self) -> &PatchVersion {
        &self.target
    }
}

impl Stream for PatchScanner {
    type Item = Result<Outcome, DownloadError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.inner.as_mut().poll_next(cx)
    }
}

impl fmt::Debug for PatchScanner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchScanner")
            .field("seed", &self.seed)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

struct ScanState {
    evaluator: AttemptEvaluator,
    start: GameId,
    expected: PatchVersion,
    options: ScanOptions,
    leading: Option<Outcome>,
    /// `None` once the scan is over
    direction: Option<Direction>,
    next_candidate: Option<GameId>,
    evaluated_in_direction: u64,
}

impl ScanState {
    fn new(
        evaluator: AttemptEvaluator,
        start: GameId,
        expected: PatchVersion,
        options: ScanOptions,
        leading: Option<Outcome>,
    ) -> Self {
        Self {
            evaluator,
            start,
            expected,
            options,
            leading,
            direction: Some(Direction::Descending),
            next_candidate: Direction::Descending.step(start),
            evaluated_in_direction: 0,
        }
    }

    fn cap_reached(&self) -> bool {
        self.options
            .limits
            .max_candidates_per_direction
            .is_some_and(|cap| self.evaluated_in_direction >= cap)
    }

    fn finish_direction(&mut self, reason: &'static str) {
        let Some(direction) = self.direction else {
            return;
        };
        info!(
            direction = direction.as_str(),
            evaluated = self.evaluated_in_direction,
            reason,
            "Finished scan direction"
        );
        self.evaluated_in_direction = 0;
        match direction {
            Direction::Descending => {
                self.direction = Some(Direction::Ascending);
                self.next_candidate = Direction::Ascending.step(self.start);
            }
            Direction::Ascending => {
                self.direction = None;
                self.next_candidate = None;
            }
        }
    }

    fn stop(&mut self) {
        self.direction = None;
        self.next_candidate = None;
    }

    async fn advance(mut self) -> Option<(Result<Outcome, DownloadError>, Self)> {
        if let Some(leading) = self.leading.take() {
            return Some((Ok(leading), self));
        }

        loop {
            let direction = self.direction?;
            let candidate = match self.next_candidate {
                None => {
                    self.finish_direction("identifier range exhausted");
                    continue;
                }
                Some(_) if self.cap_reached() => {
                    self.finish_direction("candidate cap reached");
                    continue;
                }
                Some(candidate) => candidate,
            };

            debug!(direction = direction.as_str(), %candidate, "Evaluating candidate");
            let outcome = match self
                .evaluator
                .evaluate(candidate, Some(&self.expected), false)
                .await
            {
                Ok(outcome) => outcome,
                Err(err) => {
                    self.stop();
                    return Some((Err(err), self));
                }
            };

            self.evaluated_in_direction += 1;
            self.next_candidate = direction.step(candidate);

            match &outcome {
                Outcome::PatchMismatch { .. } => self.finish_direction("patch boundary"),
                Outcome::Failed { .. } => match self.options.on_failure {
                    FailurePolicy::Continue => {}
                    FailurePolicy::StopDirection => self.finish_direction("download failure"),
                    FailurePolicy::StopScan => {
                        info!(%candidate, "Stopping scan after download failure");
                        self.stop();
                    }
                },
                Outcome::Downloaded { .. } | Outcome::Skipped { .. } => {}
            }

            return Some((Ok(outcome), self));
        }
    }
}
