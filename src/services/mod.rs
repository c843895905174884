//! Service layer: the patch-bounded download core
//!
//! - `patch_extractor`: reads the patch version of a record
//! - `attempt_evaluator`: retry loop and outcome classification per candidate
//! - `scanner`: descending-then-ascending scan as a lazy stream
//! - `patch_downloader`: seed resolution and scan orchestration
//! - `alternator` / `seed_locator`: finding a usable seed near a requested id

pub mod alternator;
pub mod attempt_evaluator;
pub mod patch_downloader;
pub mod patch_extractor;
pub mod scanner;
pub mod seed_locator;

pub use alternator::IncDecIds;
pub use attempt_evaluator::AttemptEvaluator;
pub use patch_downloader::PatchDownloader;
pub use patch_extractor::extract_patch;
pub use scanner::{Direction, PatchScanner, ScanOptions};
pub use seed_locator::{locate_seed, LocatedSeed};
