//! Game sessions: one board plus the bookkeeping around it
//!
//! A session owns its board exclusively. Front ends feed it moves and read
//! back snapshots; they never mutate the board directly.

use crate::ai::MinimaxAI;
use crate::board::Position;
use crate::config::{SearchConfig, SlideConfig};
use crate::error::{GameError, Result};
use crate::slide::{self, Direction, MoveOutcome};
use crate::tictactoe::{self, GameResult, Line, Mark};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

// ============================================================================
// TIC-TAC-TOE
// ============================================================================

/// Human (X) against the minimax AI (O); the human moves first
#[derive(Clone, Debug, Default)]
pub struct TicTacToeSession {
    board: tictactoe::Board,
    ai: MinimaxAI,
}

impl TicTacToeSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SearchConfig) -> Self {
        Self {
            board: tictactoe::Board::new(),
            ai: MinimaxAI::new(config),
        }
    }

    pub fn board(&self) -> &tictactoe::Board {
        &self.board
    }

    pub fn result(&self) -> GameResult {
        self.board.result()
    }

    /// Line to highlight once someone has won
    pub fn winning_line(&self) -> Option<Line> {
        self.board
            .winning_line(Mark::Ai)
            .or_else(|| self.board.winning_line(Mark::Player))
    }

    /// Place the human's mark, then let the AI reply unless the game ended.
    ///
    /// Returns the AI's reply (if any) and the resulting game state.
    pub fn play(&mut self, pos: Position) -> Result<(Option<Position>, GameResult)> {
        if self.result().is_over() {
            return Err(GameError::GameOver);
        }

        self.board = self.board.place(pos, Mark::Player)?;
        if self.result().is_over() {
            tracing::debug!("Game over after player move {}: {:?}", pos, self.result());
            return Ok((None, self.result()));
        }

        let reply = self.ai.best_move(&self.board);
        if let Some(ai_pos) = reply {
            self.board = self.board.place(ai_pos, Mark::Ai)?;
        }
        if self.result().is_over() {
            tracing::debug!("Game over after AI move: {:?}", self.result());
        }
        Ok((reply, self.result()))
    }

    /// Clear the board for a new game
    pub fn restart(&mut self) {
        tracing::debug!("Tic-Tac-Toe session restarted");
        self.board = tictactoe::Board::new();
    }
}

// ============================================================================
// 2048
// ============================================================================

/// 2048 session state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlideStatus {
    Playing,
    /// Win tile reached; play may continue
    Won,
    Over,
}

/// One 2048 game with score, best score and seeded tile spawns
#[derive(Clone, Debug)]
pub struct SlideSession {
    board: slide::Board,
    score: u64,
    best_score: u64,
    moves: u32,
    won: bool,
    over: bool,
    config: SlideConfig,
    rng: ChaCha8Rng,
}

impl SlideSession {
    pub fn new(config: SlideConfig) -> Self {
        let mut session = Self::from_board(slide::Board::new(), 0, config);
        session.setup();
        session
    }

    /// Resume from an existing board (tiles are not spawned)
    pub fn from_board(board: slide::Board, score: u64, config: SlideConfig) -> Self {
        let rng = match config.seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        let mut session = Self {
            board,
            score,
            best_score: score,
            moves: 0,
            won: false,
            over: false,
            config,
            rng,
        };
        session.refresh_flags();
        session
    }

    fn setup(&mut self) {
        self.board = slide::Board::new();
        self.score = 0;
        self.moves = 0;
        self.won = false;
        for _ in 0..self.config.start_tiles {
            self.spawn();
        }
        self.refresh_flags();
    }

    fn spawn(&mut self) {
        self.board =
            slide::add_random_tile_with(&self.board, &mut self.rng, self.config.four_probability);
    }

    fn refresh_flags(&mut self) {
        if !self.won && self.board.max_tile() >= self.config.win_tile {
            tracing::debug!("Reached {} with score {}", self.config.win_tile, self.score);
            self.won = true;
        }
        self.over = slide::is_game_over(&self.board);
    }

    pub fn board(&self) -> &slide::Board {
        &self.board
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Highest score seen by this session (kept across restarts, not persisted)
    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    /// Accepted moves since the last restart
    pub fn moves(&self) -> u32 {
        self.moves
    }

    pub fn won(&self) -> bool {
        self.won
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    pub fn status(&self) -> SlideStatus {
        if self.over {
            SlideStatus::Over
        } else if self.won {
            SlideStatus::Won
        } else {
            SlideStatus::Playing
        }
    }

    /// Directions that would change the current board
    pub fn legal_directions(&self) -> Vec<Direction> {
        slide::legal_directions(&self.board)
    }

    /// Slide in `direction`. A move that changes the board spawns one tile;
    /// a no-op leaves the session untouched.
    pub fn step(&mut self, direction: Direction) -> Result<MoveOutcome> {
        if self.over {
            return Err(GameError::GameOver);
        }

        let outcome = slide::apply_move(&self.board, direction, self.score);
        if !outcome.changed {
            return Ok(outcome);
        }

        self.board = outcome.board;
        self.score = outcome.score;
        self.best_score = self.best_score.max(self.score);
        self.moves += 1;
        self.spawn();
        self.refresh_flags();

        if self.over {
            tracing::debug!(
                "2048 game over: score {}, max tile {}, {} moves",
                self.score,
                self.board.max_tile(),
                self.moves
            );
        }

        Ok(MoveOutcome {
            board: self.board,
            game_over: self.over,
            ..outcome
        })
    }

    /// New board and score; best score and RNG stream carry over
    pub fn restart(&mut self) {
        tracing::debug!("2048 session restarted (best {})", self.best_score);
        self.setup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tictactoe_session_ai_replies() {
        let mut session = TicTacToeSession::new();
        let (reply, result) = session.play(Position::new(0, 0)).unwrap();
        assert_eq!(result, GameResult::Ongoing);
        let reply = reply.unwrap();
        assert_eq!(session.board().get(reply), Some(Mark::Ai));
        assert_eq!(session.board().count(Mark::Player), 1);
        assert_eq!(session.board().count(Mark::Ai), 1);
    }

    #[test]
    fn test_tictactoe_session_rejects_occupied() {
        let mut session = TicTacToeSession::new();
        let (reply, _) = session.play(Position::new(1, 1)).unwrap();
        let reply = reply.unwrap();
        assert_eq!(
            session.play(reply),
            Err(GameError::CellOccupied {
                row: reply.row,
                col: reply.col
            })
        );
    }

    #[test]
    fn test_tictactoe_session_game_over_and_restart() {
        let mut session = TicTacToeSession::new();
        // Play X greedily into the first empty cell until the game ends
        loop {
            let pos = session.board().empty_cells().next().unwrap();
            let (_, result) = session.play(pos).unwrap();
            if result.is_over() {
                break;
            }
        }
        assert_ne!(session.result(), GameResult::PlayerWins);
        assert_eq!(session.play(Position::new(0, 0)), Err(GameError::GameOver));
        if session.result() == GameResult::AiWins {
            assert!(session.winning_line().is_some());
        }

        session.restart();
        assert_eq!(session.result(), GameResult::Ongoing);
        assert_eq!(session.board().empty_cells().count(), 9);
    }

    #[test]
    fn test_slide_session_start() {
        let session = SlideSession::new(SlideConfig::default().with_seed(1));
        assert_eq!(session.board().empty_cells().len(), 14);
        assert_eq!(session.score(), 0);
        assert_eq!(session.status(), SlideStatus::Playing);
    }

    #[test]
    fn test_slide_session_is_reproducible() {
        let run = || {
            let mut s = SlideSession::new(SlideConfig::default().with_seed(9));
            for d in Direction::ALL.iter().cycle().take(40) {
                if s.is_over() {
                    break;
                }
                s.step(*d).unwrap();
            }
            (*s.board(), s.score())
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_slide_session_noop_spawns_nothing() {
        let board = slide::Board::from_cells([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        let mut session = SlideSession::from_board(board, 0, SlideConfig::default().with_seed(3));
        let outcome = session.step(Direction::Left).unwrap();
        assert!(!outcome.changed);
        assert_eq!(*session.board(), board);
        assert_eq!(session.moves(), 0);

        let outcome = session.step(Direction::Right).unwrap();
        assert!(outcome.changed);
        assert_eq!(session.board().empty_cells().len(), 14);
        assert_eq!(session.moves(), 1);
    }

    #[test]
    fn test_slide_session_from_board_keeps_rng_fresh() {
        let board = slide::Board::from_cells([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        let config = SlideConfig::default().with_seed(3);
        let mut session = SlideSession::from_board(board, 40, config.clone());
        assert_eq!(*session.board(), board);
        assert_eq!(session.score(), 40);
        assert_eq!(session.best_score(), 40);

        // First spawn comes from the start of the seeded stream
        session.step(Direction::Right).unwrap();
        let (moved, _) = slide::move_right(&board);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let expected = slide::add_random_tile_with(&moved, &mut rng, config.four_probability);
        assert_eq!(*session.board(), expected);
    }

    #[test]
    fn test_slide_session_win_flag() {
        let board = slide::Board::from_cells([[8, 8, 0, 0], [0; 4], [0; 4], [0; 4]]).unwrap();
        let config = SlideConfig::default().with_seed(5).with_win_tile(16);
        let mut session = SlideSession::from_board(board, 0, config);
        assert!(!session.won());
        let outcome = session.step(Direction::Left).unwrap();
        assert_eq!(outcome.gained, 16);
        assert!(session.won());
        assert_eq!(session.status(), SlideStatus::Won);
        // Still playable after winning
        assert!(session.step(Direction::Right).is_ok());
    }

    #[test]
    fn test_slide_session_game_over_and_restart() {
        let stuck = slide::Board::from_cells([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ])
        .unwrap();
        let mut session = SlideSession::from_board(stuck, 120, SlideConfig::default().with_seed(2));
        assert!(session.is_over());
        assert_eq!(session.status(), SlideStatus::Over);
        assert_eq!(session.step(Direction::Up), Err(GameError::GameOver));

        session.restart();
        assert_eq!(session.score(), 0);
        assert_eq!(session.best_score(), 120);
        assert!(!session.is_over());
    }
}
