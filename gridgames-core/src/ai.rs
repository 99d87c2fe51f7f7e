//! Exhaustive minimax AI for Tic-Tac-Toe
//!
//! The game tree has at most 9! leaves, so the search runs to the end of the
//! game with no depth limit and no pruning. Every speculative move is made on
//! a copy of the board; the caller's board is never touched.

use crate::board::Position;
use crate::config::SearchConfig;
use crate::tictactoe::{Board, GameResult, Mark};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Terminal score when the AI has a line
pub const AI_WIN: i8 = 1;

/// Terminal score when the player has a line
pub const PLAYER_WIN: i8 = -1;

/// Terminal score for a full board with no line
pub const DRAW: i8 = 0;

// ============================================================================
// MINIMAX
// ============================================================================

/// Game-theoretic value of `board` from the AI's point of view.
///
/// `maximizing` is true when the AI is to move. The result is always one of
/// [`AI_WIN`], [`DRAW`] or [`PLAYER_WIN`].
pub fn minimax(board: &Board, maximizing: bool) -> i8 {
    if board.has_won(Mark::Ai) {
        return AI_WIN;
    }
    if board.has_won(Mark::Player) {
        return PLAYER_WIN;
    }
    if board.is_full() {
        return DRAW;
    }

    let mark = if maximizing { Mark::Ai } else { Mark::Player };
    let scores = board
        .empty_cells()
        .map(|pos| minimax(&board.with(pos, mark), !maximizing));

    let best = if maximizing { scores.max() } else { scores.min() };
    // Non-full board always has at least one child
    best.unwrap_or(DRAW)
}

/// Optimal cell for the AI (O), or `None` when the game is already decided
/// (a completed line or a full board).
///
/// Ties go to the first cell in row-major order.
pub fn choose_ai_move(board: &Board) -> Option<Position> {
    search(board, Mark::Ai, false).map(|(pos, _)| pos)
}

/// Optimal cell for the player (X), scored with the same minimax values.
///
/// Used for AI-vs-AI self-play. Ties go to the first cell in row-major order.
pub fn choose_player_move(board: &Board) -> Option<Position> {
    search(board, Mark::Player, false).map(|(pos, _)| pos)
}

/// Score every empty cell for `side` and reduce to the first best one.
///
/// The returned score is from the AI's point of view.
fn search(board: &Board, side: Mark, parallel: bool) -> Option<(Position, i8)> {
    if board.result().is_over() {
        return None;
    }
    let scored = score_children(board, side, parallel);

    // Reducer works on "higher is better for side"
    let oriented = scored.iter().map(|&(pos, score)| match side {
        Mark::Player => (pos, -score),
        _ => (pos, score),
    });
    let (pos, oriented_score) = first_max(oriented)?;
    let score = if side == Mark::Player {
        -oriented_score
    } else {
        oriented_score
    };

    tracing::debug!("{:?} best move {} (score {})", side, pos, score);
    Some((pos, score))
}

/// Minimax value of placing `side` on each empty cell, in row-major order
fn score_children(board: &Board, side: Mark, parallel: bool) -> Vec<(Position, i8)> {
    if parallel {
        score_children_parallel(board, side)
    } else {
        score_children_sequential(board, side)
    }
}

fn score_children_sequential(board: &Board, side: Mark) -> Vec<(Position, i8)> {
    // After `side` moves, the AI maximizes iff the player just moved
    let next_maximizing = side == Mark::Player;
    board
        .empty_cells()
        .map(|pos| (pos, minimax(&board.with(pos, side), next_maximizing)))
        .collect()
}

/// Top-level branches on the rayon pool, each with its own board copy
#[cfg(feature = "parallel")]
fn score_children_parallel(board: &Board, side: Mark) -> Vec<(Position, i8)> {
    use rayon::prelude::*;

    let next_maximizing = side == Mark::Player;
    let cells: Vec<Position> = board.empty_cells().collect();
    // Indexed collect keeps scan order regardless of thread count
    cells
        .par_iter()
        .map(|&pos| {
            let child = board.with(pos, side);
            (pos, minimax(&child, next_maximizing))
        })
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn score_children_parallel(board: &Board, side: Mark) -> Vec<(Position, i8)> {
    score_children_sequential(board, side)
}

/// First entry holding the maximal score
fn first_max(scored: impl IntoIterator<Item = (Position, i8)>) -> Option<(Position, i8)> {
    let mut best: Option<(Position, i8)> = None;
    for (pos, score) in scored {
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((pos, score)),
        }
    }
    best
}

// ============================================================================
// PLAYERS
// ============================================================================

/// Something that picks X's moves against the AI
pub trait Opponent {
    fn choose(&mut self, board: &Board) -> Option<Position>;

    fn name(&self) -> &'static str;
}

/// Perfect X player
#[derive(Clone, Copy, Debug, Default)]
pub struct MinimaxOpponent;

impl Opponent for MinimaxOpponent {
    fn choose(&mut self, board: &Board) -> Option<Position> {
        choose_player_move(board)
    }

    fn name(&self) -> &'static str {
        "minimax"
    }
}

/// X player that picks a uniformly random empty cell
pub struct RandomOpponent {
    rng: ChaCha8Rng,
}

impl RandomOpponent {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    pub fn from_rng(rng: ChaCha8Rng) -> Self {
        Self { rng }
    }
}

impl Opponent for RandomOpponent {
    fn choose(&mut self, board: &Board) -> Option<Position> {
        let cells: Vec<Position> = board.empty_cells().collect();
        cells.choose(&mut self.rng).copied()
    }

    fn name(&self) -> &'static str {
        "random"
    }
}

/// Minimax AI player (plays O)
#[derive(Clone, Debug, Default)]
pub struct MinimaxAI {
    pub config: SearchConfig,
}

impl MinimaxAI {
    pub fn new(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Get best move for the AI on `board`
    pub fn best_move(&self, board: &Board) -> Option<Position> {
        search(board, Mark::Ai, self.config.parallel).map(|(pos, _)| pos)
    }

    /// Minimax value of `board` with the side to move taken from the mark counts
    pub fn evaluate(&self, board: &Board) -> i8 {
        minimax(board, board.side_to_move() == Mark::Ai)
    }

    /// Play out a game from `initial` against `opponent`.
    ///
    /// Returns the final board and the moves made, in order.
    pub fn play_game(
        &self,
        initial: Board,
        opponent: &mut dyn Opponent,
    ) -> (Board, Vec<Position>) {
        let mut board = initial;
        let mut history = Vec::new();

        while board.result() == GameResult::Ongoing {
            let side = board.side_to_move();
            let choice = match side {
                Mark::Ai => self.best_move(&board),
                _ => opponent.choose(&board),
            };
            let Some(pos) = choice else { break };

            match board.place(pos, side) {
                Ok(next) => board = next,
                Err(e) => {
                    tracing::warn!("{} opponent made an illegal move: {}", opponent.name(), e);
                    break;
                }
            }
            history.push(pos);
        }

        (board, history)
    }
}

// ============================================================================
// TESTS
// ============================================================================
