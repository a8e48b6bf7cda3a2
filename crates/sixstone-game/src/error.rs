//! Error types for the game layer.

/// Errors that can occur in board and session operations.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The requested board size is even or too small. The template
    /// layout (center point, star points) only works for odd sizes of
    /// at least 11.
    #[error("board size {0} must be an odd number of at least 11")]
    InvalidSize(usize),

    /// Coordinates fall outside the board. Rejected before any
    /// mutation — clients send raw integers and the session is the
    /// bounds check.
    #[error("coordinates ({x}, {y}) outside the {size}x{size} board")]
    OutOfRange { x: i32, y: i32, size: usize },

    /// A persisted snapshot doesn't describe a valid board.
    #[error("corrupt session snapshot: {0}")]
    InvalidSnapshot(String),
}
