//! Game state for Sixstone: the board grid and the per-game session.
//!
//! This crate is the pure part of the system — no channels, no locks,
//! no I/O. The hub layer drives it and owns all concurrency.
//!
//! # Key types
//!
//! - [`Board`] — the fixed-size grid with its decorative template
//! - [`GameSession`] — one game: a board, a move stack, and an
//!   activity timestamp for staleness
//! - [`turn_color`] / [`remaining_in_turn`] — the turn rules, derived
//!   purely from how many moves have been played
//! - [`SessionSnapshot`] — the serializable form used for persistence

mod board;
mod error;
mod session;

pub use board::{Board, DEFAULT_BOARD_SIZE, MIN_BOARD_SIZE};
pub use error::GameError;
pub use session::{GameSession, SessionSnapshot, remaining_in_turn, turn_color};
