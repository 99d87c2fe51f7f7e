//! Error types for the game engines

use thiserror::Error;

/// Errors raised by board construction and session play.
///
/// Draws, full boards and moves that change nothing are ordinary outcomes,
/// not errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid board: {0}")]
    InvalidBoard(String),

    #[error("Position ({row}, {col}) is off the board")]
    InvalidPosition { row: usize, col: usize },

    #[error("Cell ({row}, {col}) is already occupied")]
    CellOccupied { row: usize, col: usize },

    #[error("Game is already over")]
    GameOver,
}

/// Convenience Result type for engine operations
pub type Result<T> = std::result::Result<T, GameError>;
