//! Error types for the hub layer.

use sixstone_game::GameError;
use sixstone_protocol::GameId;

/// Errors that can occur during hub operations.
///
/// None of these are fatal to the coordinator. `GameNotFound` is also
/// surfaced to the requesting client as a push; everything else is
/// logged by the caller and discarded — cleanup and broadcast failures
/// must never propagate back into the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    /// The operation named a game id that doesn't exist (or was
    /// evicted). The requester has already been sent a
    /// `GameNotFound` push by the time this is returned.
    #[error("no game found for id {0}")]
    GameNotFound(GameId),

    /// A game-level rejection, e.g. out-of-range coordinates.
    #[error(transparent)]
    Game(#[from] GameError),

    /// The shutdown key didn't match (or no key is configured).
    #[error("admin key rejected")]
    Unauthorized,

    /// Reading or writing the persistence files failed.
    #[error("store I/O failed: {0}")]
    Store(#[source] std::io::Error),

    /// A persisted snapshot could not be (de)serialized.
    #[error("snapshot serialization failed: {0}")]
    Snapshot(#[from] serde_json::Error),
}
