use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors building a [`RetrySchedule`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    #[error("Retry schedule must contain at least one entry")]
    Empty,

    #[error("Invalid retry delay at index {index}: {seconds}. Must be a finite, non-negative number of seconds")]
    InvalidDelay { index: usize, seconds: f64 },
}

/// Delays between attempts for one candidate.
///
/// The length is the attempt budget. Attempt `k` is preceded by
/// `delay_before(k)`, so the last entry elapses before the final attempt.
/// A leading zero makes the first attempt immediate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySchedule {
    delays: Vec<Duration>,
}

impl RetrySchedule {
    pub fn new(delays: Vec<Duration>) -> Result<Self, ScheduleError> {
        if delays.is_empty() {
            return Err(ScheduleError::Empty);
        }
        Ok(Self { delays })
    }

    /// Build a schedule from delays expressed in (fractional) seconds.
    pub fn from_secs(seconds: &[f64]) -> Result<Self, ScheduleError> {
        let delays = seconds
            .iter()
            .enumerate()
            .map(|(index, &secs)| {
                Duration::try_from_secs_f64(secs)
                    .map_err(|_| ScheduleError::InvalidDelay { index, seconds: secs })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(delays)
    }

    /// Single immediate attempt, no retries.
    pub fn once() -> Self {
        Self {
            delays: vec![Duration::ZERO],
        }
    }

    /// Maximum number of attempts per candidate.
    pub fn max_attempts(&self) -> usize {
        self.delays.len()
    }

    /// Delay to wait before attempt `attempt` (0-based).
    pub fn delay_before(&self, attempt: usize) -> Duration {
        self.delays.get(attempt).copied().unwrap_or_default()
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }
}

/// Named retry schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryProfile {
    #[default]
    Standard,
    Aggressive,
}

impl RetryProfile {
    /// Parse a profile name, case-insensitively. Unknown names yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "standard" => Some(Self::Standard),
            "aggressive" => Some(Self::Aggressive),
            _ => None,
        }
    }

    /// Delays in seconds for this profile.
    pub const fn delays_secs(self) -> &'static [u64] {
        match self {
            Self::Standard => &[0, 1, 2, 5, 10, 30],
            Self::Aggressive => &[1, 2, 5],
        }
    }

    pub fn schedule(self) -> RetrySchedule {
        RetrySchedule {
            delays: self
                .delays_secs()
                .iter()
                .map(|&secs| Duration::from_secs(secs))
                .collect(),
        }
    }
}

/// What a scan direction does after a candidate ends up `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Keep scanning past the failure.
    #[default]
    Continue,
    /// End the current direction after yielding the failure.
    StopDirection,
    /// End the whole scan after yielding the failure.
    StopScan,
}

/// Optional caps on how far a scan may travel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanLimits {
    /// Maximum candidates evaluated per direction, `None` for unbounded.
    pub max_candidates_per_direction: Option<u64>,
}
