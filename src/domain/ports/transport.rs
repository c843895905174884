use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::errors::TransportError;
use crate::domain::models::{GameId, GameResponse};

/// Port trait for fetching one game record.
///
/// Implementations perform exactly one outbound request per call and are
/// expected to honour a shared call budget, so every call counts against
/// that budget whatever its result.
///
/// A returned `Ok` carries whatever the server said, including HTTP errors
/// and bodies with a non-200 envelope code; deciding whether that counts as
/// success is the caller's job. `Err` is reserved for requests that produced
/// no response at all, or could not be sent.
///
/// # Example Implementation
///
/// ```ignore
/// struct Canned(GameResponse);
///
/// #[async_trait]
/// impl GameTransport for Canned {
///     async fn fetch(&self, _id: GameId) -> Result<GameResponse, TransportError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait GameTransport: Send + Sync {
    /// Fetch the record for `game_id`.
    async fn fetch(&self, game_id: GameId) -> Result<GameResponse, TransportError>;
}

#[async_trait]
impl<T: GameTransport + ?Sized> GameTransport for Arc<T> {
    async fn fetch(&self, game_id: GameId) -> Result<GameResponse, TransportError> {
        (**self).fetch(game_id).await
    }
}
