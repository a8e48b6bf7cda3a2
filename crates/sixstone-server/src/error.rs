//! Unified error type for the server front end.

use sixstone_hub::HubError;
use sixstone_protocol::ProtocolError;

use crate::transport::TransportError;

/// Top-level error wrapping the layer-specific errors, so callers of
/// the server deal with one type and `?` converts automatically.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid message).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A hub-level error (unknown game, store I/O).
    #[error(transparent)]
    Hub(#[from] HubError),
}
