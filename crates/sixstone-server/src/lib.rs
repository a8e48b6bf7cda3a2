//! WebSocket front end for the Sixstone game server.
//!
//! Ties the layers together: transport → protocol → hub. Each accepted
//! connection gets a handler task for inbound requests and a writer
//! task draining that connection's broadcast channel.

mod error;
mod handler;
mod server;
mod transport;

pub use error::ServerError;
pub use server::{SixstoneServer, SixstoneServerBuilder};
pub use transport::{TransportError, WsConnection, WsListener, WsReader, WsWriter};
