//! The session hub: registry and broadcast coordinator for Sixstone.
//!
//! This crate multiplexes many concurrent games, each with its own set
//! of connected clients, over one shared-state service:
//!
//! - [`SessionHub`] — the concurrency boundary. Every client operation
//!   runs as one serialized transaction against the registry.
//! - [`HubConfig`] — staleness TTL, admin log capacity, admin key.
//! - [`Store`] — persistence hooks for counters and game snapshots.
//!
//! # Concurrency model
//!
//! One `tokio::sync::Mutex` guards the entire registry (games, member
//! sets, reverse mapping, counters, admin log). Per-game locking would
//! be a valid optimization, but the cross-game structures would still
//! need global consistency, and a single lock is the simplest design
//! that has no lost updates or torn reads. Broadcasts leave the hub as
//! fire-and-forget sends on per-connection unbounded channels — the
//! coordinator never awaits delivery.

mod config;
mod error;
mod hub;
mod store;

pub use config::HubConfig;
pub use error::HubError;
pub use hub::{ClientSender, Counters, SessionHub};
pub use store::Store;
