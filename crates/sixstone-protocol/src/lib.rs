//! Wire protocol for Sixstone.
//!
//! This crate defines the logical operations that travel between a game
//! client and the session hub:
//!
//! - **Types** ([`ClientRequest`], [`ServerPush`], [`GameId`], etc.) —
//!   the message structures and identity types.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! The protocol layer is transport-agnostic: it does not know about
//! sockets or connections, only about message shapes. The framing that
//! carries these messages is the transport's concern.

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ClientRequest, ConnectionId, GameId, PLACE_STONE_CUE, Point, ServerPush, Stone,
};
