//! One game session: a board, its move history, and a staleness clock.
//!
//! Turn state is never stored — it is re-derived from the history
//! length on every query. That keeps undo trivially consistent: popping
//! a move *is* handing the turn back, with nothing to unwind.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use sixstone_protocol::{Point, Stone};

use crate::{Board, DEFAULT_BOARD_SIZE, GameError};

/// Whose turn the next placement belongs to, given that `moves_played`
/// stones are already on the board.
///
/// Move 0 is black's single opening stone; after that, turns alternate
/// every two placements (white 2, black 2, white 2, ...).
pub fn turn_color(moves_played: usize) -> Stone {
    if moves_played == 0 {
        Stone::Black
    } else if ((moves_played - 1) / 2) % 2 == 0 {
        Stone::White
    } else {
        Stone::Black
    }
}

/// How many stones the current color still places this turn (1 or 2),
/// given that `moves_played` stones are already on the board.
pub fn remaining_in_turn(moves_played: usize) -> u32 {
    if (moves_played + 1) % 2 == 0 { 2 } else { 1 }
}

/// The serializable form of a session, used for persistence across
/// server restarts. Membership is not part of the snapshot — restored
/// games come back with empty groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Board edge length.
    pub size: usize,
    /// Current grid, one string per row.
    pub rows: Vec<String>,
    /// Move history in play order.
    pub moves: Vec<Point>,
}

/// One game: an owned board plus the ordered move stack.
#[derive(Debug)]
pub struct GameSession {
    board: Board,
    moves: Vec<Point>,
    last_activity: Instant,
}

impl GameSession {
    /// Creates a fresh session with the default 19x19 board.
    pub fn new() -> Self {
        // DEFAULT_BOARD_SIZE is odd and >= 11, so this cannot fail.
        Self::with_size(DEFAULT_BOARD_SIZE).expect("default size is valid")
    }

    /// Creates a fresh session with a custom board size.
    ///
    /// # Errors
    /// Returns [`GameError::InvalidSize`] for even sizes or sizes
    /// below the minimum.
    pub fn with_size(size: usize) -> Result<Self, GameError> {
        Ok(Self {
            board: Board::new(size)?,
            moves: Vec::new(),
            last_activity: Instant::now(),
        })
    }

    /// The owned board, read-only.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Number of stones placed so far.
    pub fn moves_played(&self) -> usize {
        self.moves.len()
    }

    /// Whose turn the next placement belongs to.
    pub fn current_turn(&self) -> Stone {
        turn_color(self.moves.len())
    }

    /// How many stones that color still places this turn.
    pub fn current_turn_remaining(&self) -> u32 {
        remaining_in_turn(self.moves.len())
    }

    /// Places a stone for whoever's turn it is.
    ///
    /// Returns `Ok(true)` when the stone was placed, `Ok(false)` when
    /// the cell already holds a stone (a silent no-op — nothing
    /// mutates, callers re-broadcast state without a cue).
    ///
    /// # Errors
    /// Returns [`GameError::OutOfRange`] for coordinates outside the
    /// board, before any mutation. Clients send raw integers; this is
    /// the bounds check.
    pub fn place(&mut self, x: i32, y: i32) -> Result<bool, GameError> {
        self.touch();
        let size = self.board.size();
        if x < 0 || y < 0 || x >= size as i32 || y >= size as i32 {
            return Err(GameError::OutOfRange { x, y, size });
        }
        let (ux, uy) = (x as usize, y as usize);
        if self.board.is_occupied(ux, uy) {
            return Ok(false);
        }
        let color = turn_color(self.moves.len());
        self.board.set_stone(ux, uy, color);
        self.moves.push(Point::new(x, y));
        Ok(true)
    }

    /// Reverses the most recent placement, whoever made it.
    ///
    /// No-op on an empty history. Unconditional otherwise: the cell is
    /// restored to its template decoration and the move popped — turn
    /// state follows automatically because it is derived from length.
    pub fn undo(&mut self) {
        self.touch();
        if let Some(p) = self.moves.pop() {
            // Moves are validated on entry, so the cast is in range.
            self.board.clear(p.x as usize, p.y as usize);
        }
    }

    /// Replaces the board and history with a fresh state of the same
    /// size.
    pub fn reset(&mut self) -> Result<(), GameError> {
        self.board = Board::new(self.board.size())?;
        self.moves.clear();
        self.touch();
        Ok(())
    }

    /// Renders the board and refreshes the activity clock.
    ///
    /// Rendering is invoked for every client-visible state push, so any
    /// activity toward any member keeps the session alive.
    pub fn render(&mut self) -> String {
        self.touch();
        self.board.render()
    }

    /// The most recent move, or [`Point::NONE`] on an empty board.
    pub fn last_play(&self) -> Point {
        self.moves.last().copied().unwrap_or(Point::NONE)
    }

    /// The second-most-recent move, but only when it belongs to the
    /// same turn as the most recent one (both stones of the current
    /// player's turn-pair); [`Point::NONE`] otherwise, so clients don't
    /// highlight a carry-over stone across a turn boundary.
    pub fn last_last_play(&self) -> Point {
        let n = self.moves.len();
        if n >= 2 && turn_color(n - 1) == turn_color(n - 2) {
            self.moves[n - 2]
        } else {
            Point::NONE
        }
    }

    /// Time since the session was last read or written.
    pub fn idle_time(&self) -> Duration {
        self.last_activity.elapsed()
    }

    /// Returns `true` iff the session has been idle longer than `ttl`.
    pub fn is_stale(&self, ttl: Duration) -> bool {
        self.idle_time() > ttl
    }

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    /// Captures the session for persistence.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            size: self.board.size(),
            rows: self.board.rows(),
            moves: self.moves.clone(),
        }
    }

    /// Restores a session from a persisted snapshot, with a fresh
    /// activity clock.
    ///
    /// # Errors
    /// Returns [`GameError::InvalidSize`] or
    /// [`GameError::InvalidSnapshot`] when the snapshot doesn't
    /// describe a valid board.
    pub fn from_snapshot(snap: &SessionSnapshot) -> Result<Self, GameError> {
        let mut board = Board::new(snap.size)?;
        if snap.rows.len() != snap.size {
            return Err(GameError::InvalidSnapshot(format!(
                "expected {} rows, found {}",
                snap.size,
                snap.rows.len()
            )));
        }
        for (y, row) in snap.rows.iter().enumerate() {
            if row.chars().count() != snap.size {
                return Err(GameError::InvalidSnapshot(format!(
                    "row {y} has the wrong length"
                )));
            }
            for (x, c) in row.chars().enumerate() {
                if let Some(stone) = Stone::from_char(c) {
                    board.set_stone(x, y, stone);
                }
            }
        }
        let limit = snap.size as i32;
        for p in &snap.moves {
            if p.x < 0 || p.y < 0 || p.x >= limit || p.y >= limit {
                return Err(GameError::InvalidSnapshot(format!(
                    "move ({}, {}) outside the board",
                    p.x, p.y
                )));
            }
        }
        Ok(Self {
            board,
            moves: snap.moves.clone(),
            last_activity: Instant::now(),
        })
    }
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================
