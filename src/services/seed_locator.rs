//! Finding a usable seed near a requested starting game.

use tracing::{debug, info};

use crate::domain::errors::DownloadError;
use crate::domain::models::{GameId, Outcome, PatchVersion};
use crate::services::alternator::IncDecIds;
use crate::services::attempt_evaluator::AttemptEvaluator;
use crate::services::patch_extractor::extract_patch;

/// A starting game whose record downloads and carries a readable patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSeed {
    pub game_id: GameId,
    pub patch: PatchVersion,
    /// The `Downloaded` outcome the seed was confirmed with.
    pub outcome: Outcome,
}

/// Probe `start, start+1, start-1, ...` up to `radius` away for a seed.
///
/// Each probe bypasses the filter and uses the evaluator's full retry
/// schedule. Returns `Ok(None)` when no candidate within the radius works.
pub async fn locate_seed(
    evaluator: &AttemptEvaluator,
    start: GameId,
    radius: u64,
) -> Result<Option<LocatedSeed>, DownloadError> {
    let probes = radius.saturating_mul(2).saturating_add(1);
    let candidates = IncDecIds::new(start).take(usize::try_from(probes).unwrap_or(usize::MAX));

    for candidate in candidates {
        let outcome = evaluator.evaluate(candidate, None, true).await?;
        let patch = match &outcome {
            Outcome::Downloaded { body, .. } => extract_patch(body),
            _ => None,
        };
        if let Some(patch) = patch {
            info!(requested = %start, seed = %candidate, %patch, "Located seed");
            return Ok(Some(LocatedSeed {
                game_id: candidate,
                patch,
                outcome,
            }));
        }
        debug!(%candidate, kind = outcome.kind().as_str(), "Candidate is not a usable seed");
    }

    Ok(None)
}
