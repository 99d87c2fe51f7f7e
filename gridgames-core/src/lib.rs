//! GRIDGAMES Core - Game engines and AI
//!
//! This crate provides the core logic for two grid games:
//! - Square grid geometry (positions, transpose, row reversal)
//! - Tic-Tac-Toe board, winning lines and terminal detection
//! - Exhaustive minimax AI for Tic-Tac-Toe
//! - 2048 slide/merge transitions and game-over detection
//! - Sessions that carry a board from start to restart

pub mod board;
pub mod error;
pub mod config;
pub mod tictactoe;
pub mod ai;
pub mod slide;
pub mod session;

// Re-exports for convenient access
pub use board::Position;
pub use error::{GameError, Result};
pub use config::{SearchConfig, SlideConfig};
pub use tictactoe::{GameResult, Line, Mark, LINES};
pub use ai::{choose_ai_move, minimax, MinimaxAI, MinimaxOpponent, Opponent, RandomOpponent};
pub use slide::{apply_move, is_game_over, Direction, MoveOutcome};
pub use session::{SlideSession, SlideStatus, TicTacToeSession};
