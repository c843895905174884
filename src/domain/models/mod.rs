pub mod config;
pub mod game;
pub mod outcome;
pub mod retry;

pub use config::{ApiConfig, Config, LoggingConfig, ScanConfig};
pub use game::{GameId, GameResponse, PatchVersion, VersionPart, ENVELOPE_OK};
pub use outcome::{Outcome, OutcomeKind};
pub use retry::{FailurePolicy, RetryProfile, RetrySchedule, ScanLimits, ScheduleError};
