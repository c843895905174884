use serde::Serialize;

use super::game::{GameId, GameResponse, PatchVersion};

/// What happened to one candidate identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Fetched, and its patch matched the run's expected patch
    /// (or no expectation applied, as for the seed).
    Downloaded {
        game_id: GameId,
        body: serde_json::Value,
        response: GameResponse,
    },

    /// Every scheduled attempt came back unsuccessful.
    Failed {
        game_id: GameId,
        attempts_made: usize,
        /// Last HTTP response seen; `None` if no attempt got one at all.
        last_response: Option<GameResponse>,
    },

    /// Excluded by the filter; the transport was never called.
    Skipped { game_id: GameId },

    /// Fetched, but the record belongs to another patch or its patch
    /// could not be read. Marks the boundary of a scan direction.
    PatchMismatch {
        game_id: GameId,
        observed: Option<PatchVersion>,
        expected: PatchVersion,
        response: GameResponse,
    },
}

impl Outcome {
    pub const fn game_id(&self) -> GameId {
        match self {
            Self::Downloaded { game_id, .. }
            | Self::Failed { game_id, .. }
            | Self::Skipped { game_id }
            | Self::PatchMismatch { game_id, .. } => *game_id,
        }
    }

    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Self::Downloaded { .. } => OutcomeKind::Downloaded,
            Self::Failed { .. } => OutcomeKind::Failed,
            Self::Skipped { .. } => OutcomeKind::Skipped,
            Self::PatchMismatch { .. } => OutcomeKind::PatchMismatch,
        }
    }

    /// Bytes worth persisting for this outcome.
    ///
    /// `Skipped` never has any, and a `Failed` only has them when at least
    /// one attempt produced an HTTP response.
    pub fn raw_bytes(&self) -> Option<&[u8]> {
        match self {
            Self::Downloaded { response, .. } | Self::PatchMismatch { response, .. } => {
                Some(&response.raw)
            }
            Self::Failed { last_response, .. } => last_response.as_ref().map(|r| r.raw.as_slice()),
            Self::Skipped { .. } => None,
        }
    }

    pub const fn is_boundary(&self) -> bool {
        matches!(self, Self::PatchMismatch { .. })
    }
}

/// Payload-free discriminant of [`Outcome`], used for summaries and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Downloaded,
    Failed,
    Skipped,
    PatchMismatch,
}

impl OutcomeKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Downloaded => "downloaded",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
            Self::PatchMismatch => "patch_mismatch",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(raw: &[u8]) -> GameResponse {
        GameResponse::from_bytes(200, raw.to_vec())
    }

    #[test]
    fn test_raw_bytes_per_variant() {
        let downloaded = Outcome::Downloaded {
            game_id: GameId(1),
            body: serde_json::json!({}),
            response: response(b"{}"),
        };
        assert_eq!(downloaded.raw_bytes(), Some(&b"{}"[..]));

        let skipped = Outcome::Skipped { game_id: GameId(2) };
        assert_eq!(skipped.raw_bytes(), None);

        let failed_silent = Outcome::Failed {
            game_id: GameId(3),
            attempts_made: 2,
            last_response: None,
        };
        assert_eq!(failed_silent.raw_bytes(), None);

        let failed = Outcome::Failed {
            game_id: GameId(4),
            attempts_made: 1,
            last_response: Some(response(br#"{"code":404}"#)),
        };
        assert_eq!(failed.raw_bytes(), Some(&br#"{"code":404}"#[..]));
    }

    #[test]
    fn test_game_id_and_kind() {
        let mismatch = Outcome::PatchMismatch {
            game_id: GameId(9),
            observed: None,
            expected: PatchVersion::new(45, 0),
            response: response(b"{}"),
        };
        assert_eq!(mismatch.game_id(), GameId(9));
        assert_eq!(mismatch.kind(), OutcomeKind::PatchMismatch);
        assert!(mismatch.is_boundary());
        assert_eq!(mismatch.kind().as_str(), "patch_mismatch");
    }
}
