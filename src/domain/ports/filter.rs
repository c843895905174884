use crate::domain::models::GameId;

/// Decides whether a candidate is worth a network call at all.
///
/// Consulted once per candidate before any request is made. Closures of
/// type `Fn(GameId) -> bool` implement it directly.
pub trait GameFilter: Send + Sync {
    fn should_attempt(&self, game_id: GameId) -> bool;
}

/// Filter that lets every candidate through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAll;

impl GameFilter for AcceptAll {
    fn should_attempt(&self, _game_id: GameId) -> bool {
        true
    }
}

impl<F> GameFilter for F
where
    F: Fn(GameId) -> bool + Send + Sync,
{
    fn should_attempt(&self, game_id: GameId) -> bool {
        self(game_id)
    }
}
