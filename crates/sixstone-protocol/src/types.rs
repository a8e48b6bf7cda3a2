//! Core protocol types for the Sixstone wire format.
//!
//! Everything here is serialized with serde and sent as internally
//! tagged JSON (`{ "type": "...", ... }`), which keeps the messages
//! easy to produce and inspect from a browser client.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for one game session.
///
/// Game ids are short random strings (8 lowercase hex characters) so
/// players can share them verbally or in a URL. Uniqueness is enforced
/// by the hub at generation time, not by this type.
///
/// `#[serde(transparent)]` serializes a `GameId` as a plain JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Wraps an existing identifier string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A unique identifier for a connected client.
///
/// Assigned by the transport when a connection is accepted. A connection
/// id is meaningful only within one server process; it is never reused
/// while the process lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Stone
// ---------------------------------------------------------------------------

/// A stone color. Serializes as the single-character strings `"b"` and
/// `"w"`, matching the characters stamped into the board grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stone {
    #[serde(rename = "b")]
    Black,
    #[serde(rename = "w")]
    White,
}

impl Stone {
    /// The character used for this color in the board grid.
    pub fn as_char(self) -> char {
        match self {
            Self::Black => 'b',
            Self::White => 'w',
        }
    }

    /// Parses a grid character back into a color. Returns `None` for
    /// anything that is not a stone (borders, dots, empty crossings).
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'b' => Some(Self::Black),
            'w' => Some(Self::White),
            _ => None,
        }
    }
}

impl fmt::Display for Stone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ---------------------------------------------------------------------------
// Point
// ---------------------------------------------------------------------------

/// A board coordinate. `(x, y)` is `(column, row)` from the top-left.
///
/// The sentinel [`Point::NONE`] (`(-1, -1)`) means "no such move" — it
/// is what clients receive for `last_play` on an empty board, and for
/// `last_last_play` at a turn boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// The "no move" sentinel.
    pub const NONE: Point = Point { x: -1, y: -1 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// ClientRequest — inbound operations
// ---------------------------------------------------------------------------

/// An operation a client asks the hub to perform.
///
/// `#[serde(tag = "type")]` produces internally tagged JSON, e.g.
/// `{ "type": "PlaceStone", "game_id": "a1b2c3d4", "x": 9, "y": 9 }`.
///
/// Coordinates are signed on the wire: the hub validates them against
/// the board size and rejects anything out of range before touching
/// the game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientRequest {
    /// Create a fresh game and receive its id.
    CreateGame,

    /// Join an existing game's broadcast group.
    JoinGame { game_id: GameId },

    /// Place a stone at `(x, y)` for whoever's turn it is.
    PlaceStone { game_id: GameId, x: i32, y: i32 },

    /// Reverse the most recent placement, whoever made it.
    UndoStone { game_id: GameId },

    /// Replace the game with a fresh board of the same size.
    ResetGame { game_id: GameId },

    /// Join the admin observer group and receive the current log.
    RegisterAdmin,

    /// Persist all state and terminate the server. Requires the
    /// configured admin key.
    Shutdown { admin_key: String },
}

// ---------------------------------------------------------------------------
// ServerPush — outbound messages
// ---------------------------------------------------------------------------

/// A message pushed from the hub to one or more clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerPush {
    /// Sent to the requester only after `CreateGame`.
    GameCreated { game_id: GameId },

    /// The full display state of a game, broadcast to its whole group
    /// after every state-changing operation (and after joins).
    BoardState {
        /// Whose turn the next placement belongs to.
        current_turn: Stone,
        /// How many stones that color still places this turn (1 or 2).
        current_turn_remaining: u32,
        /// Canonical board render: newline-joined rows, no trailing
        /// newline, no carriage returns.
        board: String,
        /// Set only when a placement actually mutated the board, so
        /// clients don't play a sound for rejected moves.
        sound_cue: Option<String>,
        /// Most recent move, or `(-1, -1)` if the board is empty.
        last_play: Point,
        /// Second-most-recent move, but only when it belongs to the
        /// same turn as `last_play`; `(-1, -1)` otherwise.
        last_last_play: Point,
    },

    /// Current member count of a game's group, broadcast after joins
    /// and disconnects.
    ConnectionCount { count: usize },

    /// Sent to the requester only when an operation names an unknown
    /// game id. Never broadcast.
    GameNotFound,

    /// The bounded admin log, most recent last. Broadcast to the admin
    /// group after every logged event.
    ServerLog { lines: Vec<String> },
}

/// The sound cue attached to a successful placement broadcast.
pub const PLACE_STONE_CUE: &str = "place_stone";

// =========================================================================
// Tests
// =========================================================================
