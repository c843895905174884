//! Identifiers fanning out from a centre: `c, c+1, c-1, c+2, c-2, ...`

use crate::domain::models::GameId;

/// Iterator alternating above and below a starting identifier.
///
/// Yields the start first, then `start + k` followed by `start - k` for
/// `k = 1, 2, ...`. Either side simply stops contributing once it would
/// overflow; the sequence reaches negative identifiers freely.
#[derive(Debug, Clone)]
pub struct IncDecIds {
    start: GameId,
    distance: i64,
    below_pending: bool,
    started: bool,
    exhausted: bool,
}

impl IncDecIds {
    pub const fn new(start: GameId) -> Self {
        Self {
            start,
            distance: 0,
            below_pending: false,
            started: false,
            exhausted: false,
        }
    }
}

impl Iterator for IncDecIds {
    type Item = GameId;

    fn next(&mut self) -> Option<GameId> {
        if !self.started {
            self.started = true;
            return Some(self.start);
        }

        while !self.exhausted {
            if self.below_pending {
                self.below_pending = false;
                if let Some(id) = self.start.get().checked_sub(self.distance) {
                    return Some(GameId(id));
                }
                continue;
            }

            let Some(distance) = self.distance.checked_add(1) else {
                self.exhausted = true;
                break;
            };
            self.distance = distance;
            self.below_pending = true;

            let above = self.start.get().checked_add(distance);
            let below = self.start.get().checked_sub(distance);
            if above.is_none() && below.is_none() {
                self.exhausted = true;
                break;
            }
            if let Some(id) = above {
                return Some(GameId(id));
            }
        }
        None
    }
}
