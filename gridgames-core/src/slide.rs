//! 2048 board transitions
//!
//! Every direction reduces to one primitive, sliding a row left:
//! - Right: reverse rows, slide left, reverse back
//! - Up: transpose, slide left, transpose back
//! - Down: transpose, slide right, transpose back
//!
//! All functions take a board by reference and return a new one.

use crate::board::{positions, reverse_rows, transpose, Position};
use crate::config::DEFAULT_FOUR_PROBABILITY;
use crate::error::{GameError, Result};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Board width and height
pub const SIZE: usize = 4;

/// One row of tiles, left to right
pub type Row = [u32; SIZE];

/// Largest tile a cell can hold; two of them never merge
pub const MAX_TILE: u32 = 1 << 31;

// ============================================================================
// CORE TYPES
// ============================================================================

/// Slide direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];
}

/// 4×4 tile grid; 0 is an empty cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<u32>>", into = "Vec<Vec<u32>>")]
pub struct Board {
    cells: [[u32; SIZE]; SIZE],
}

/// Result of sliding a board in one direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Board after the slide (no tile spawned yet)
    pub board: Board,
    /// Running score including this move's merges
    pub score: u64,
    /// Points earned by this move's merges
    pub gained: u64,
    /// Whether any cell differs from the input board
    pub changed: bool,
    /// No direction can change `board`
    pub game_over: bool,
}

fn is_valid_tile(value: u32) -> bool {
    value == 0 || (value >= 2 && value.is_power_of_two())
}

impl Board {
    /// Empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a fixed grid, rejecting tiles that are not powers of two
    pub fn from_cells(cells: [[u32; SIZE]; SIZE]) -> Result<Self> {
        let board = Self { cells };
        board.validate()?;
        Ok(board)
    }

    /// Build from nested rows, rejecting wrong dimensions and bad tiles
    pub fn from_rows(rows: Vec<Vec<u32>>) -> Result<Self> {
        if rows.len() != SIZE {
            return Err(GameError::InvalidBoard(format!(
                "expected {} rows, found {}",
                SIZE,
                rows.len()
            )));
        }

        let mut cells = [[0u32; SIZE]; SIZE];
        for (r, row) in rows.iter().enumerate() {
            if row.len() != SIZE {
                return Err(GameError::InvalidBoard(format!(
                    "row {} has {} cells, expected {}",
                    r,
                    row.len(),
                    SIZE
                )));
            }
            cells[r].copy_from_slice(row);
        }
        Self::from_cells(cells)
    }

    /// Check every tile is empty or a power of two between 2 and [`MAX_TILE`]
    pub fn validate(&self) -> Result<()> {
        for pos in positions::<SIZE>() {
            let value = self.cells[pos.row][pos.col];
            if !is_valid_tile(value) {
                return Err(GameError::InvalidBoard(format!(
                    "tile {} at {} is not a power of two",
                    value, pos
                )));
            }
        }
        Ok(())
    }

    pub fn cells(&self) -> &[[u32; SIZE]; SIZE] {
        &self.cells
    }

    pub fn rows(&self) -> Vec<Vec<u32>> {
        self.cells.iter().map(|row| row.to_vec()).collect()
    }

    /// Tile at a position (`None` when off the board)
    pub fn get(&self, pos: Position) -> Option<u32> {
        pos.is_within(SIZE).then(|| self.cells[pos.row][pos.col])
    }

    /// Empty cells in row-major order
    pub fn empty_cells(&self) -> Vec<Position> {
        positions::<SIZE>()
            .filter(|p| self.cells[p.row][p.col] == 0)
            .collect()
    }

    /// Largest tile on the board (0 when empty)
    pub fn max_tile(&self) -> u32 {
        self.cells.iter().flatten().copied().max().unwrap_or(0)
    }

    fn map_rows(&self, f: impl Fn(Row) -> (Row, u64)) -> (Self, u64) {
        let mut cells = self.cells;
        let mut gained = 0;
        for row in cells.iter_mut() {
            let (next, points) = f(*row);
            *row = next;
            gained += points;
        }
        (Self { cells }, gained)
    }

    fn transposed(&self) -> Self {
        Self {
            cells: transpose(&self.cells),
        }
    }

    fn reversed(&self) -> Self {
        Self {
            cells: reverse_rows(&self.cells),
        }
    }
}

impl TryFrom<Vec<Vec<u32>>> for Board {
    type Error = GameError;

    fn try_from(rows: Vec<Vec<u32>>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl From<Board> for Vec<Vec<u32>> {
    fn from(board: Board) -> Self {
        board.rows()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            let cells: Vec<String> = row
                .iter()
                .map(|&v| if v == 0 { format!("{:>5}", ".") } else { format!("{:>5}", v) })
                .collect();
            write!(f, "{}", cells.join(""))?;
        }
        Ok(())
    }
}

// ============================================================================
// ROW PRIMITIVES
// ============================================================================

/// Left-justify non-zero tiles, keeping their order, and pad with zeros
pub fn compress(row: Row) -> Row {
    let mut out = [0; SIZE];
    for (slot, value) in out.iter_mut().zip(row.into_iter().filter(|&v| v != 0)) {
        *slot = value;
    }
    out
}

/// One left-to-right sweep combining equal neighbours, then compress.
///
/// A freshly doubled tile is not compared again in the same sweep, so
/// `[2, 2, 2, 2]` becomes `[4, 4, 0, 0]`. Returns the row and the points
/// earned (sum of the doubled values). A pair of [`MAX_TILE`]s stays put.
pub fn merge(row: Row) -> (Row, u64) {
    let mut row = row;
    let mut gained = 0u64;
    for i in 0..SIZE - 1 {
        if row[i] == 0 || row[i] != row[i + 1] {
            continue;
        }
        let Some(doubled) = row[i].checked_mul(2) else {
            continue;
        };
        row[i] = doubled;
        gained += u64::from(doubled);
        row[i + 1] = 0;
    }
    (compress(row), gained)
}

/// Slide one row left: compress, then merge
pub fn slide_row(row: Row) -> (Row, u64) {
    merge(compress(row))
}

// ============================================================================
// BOARD MOVES
// ============================================================================

pub fn move_left(board: &Board) -> (Board, u64) {
    board.map_rows(slide_row)
}

pub fn move_right(board: &Board) -> (Board, u64) {
    let (moved, gained) = move_left(&board.reversed());
    (moved.reversed(), gained)
}

pub fn move_up(board: &Board) -> (Board, u64) {
    let (moved, gained) = move_left(&board.transposed());
    (moved.transposed(), gained)
}

pub fn move_down(board: &Board) -> (Board, u64) {
    let (moved, gained) = move_right(&board.transposed());
    (moved.transposed(), gained)
}

/// Slide in `direction`, returning the new board and merge points
pub fn shift(board: &Board, direction: Direction) -> (Board, u64) {
    match direction {
        Direction::Left => move_left(board),
        Direction::Right => move_right(board),
        Direction::Up => move_up(board),
        Direction::Down => move_down(board),
    }
}

/// Slide in `direction` and fold the merge points into `score`.
///
/// `game_over` describes the slid board before any tile is spawned.
pub fn apply_move(board: &Board, direction: Direction, score: u64) -> MoveOutcome {
    let (next, gained) = shift(board, direction);
    MoveOutcome {
        board: next,
        score: score + gained,
        gained,
        changed: next != *board,
        game_over: is_game_over(&next),
    }
}

/// Directions that would change the board
pub fn legal_directions(board: &Board) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|&d| shift(board, d).0 != *board)
        .collect()
}

/// True iff no direction changes the board. Never modifies `board`.
pub fn is_game_over(board: &Board) -> bool {
    Direction::ALL
        .into_iter()
        .all(|d| shift(board, d).0 == *board)
}

// ============================================================================
// TILE SPAWNING
// ============================================================================

/// Place a 2 (90%) or 4 (10%) on a uniformly chosen empty cell.
///
/// Returns the board unchanged when it is full.
pub fn add_random_tile<R: Rng + ?Sized>(board: &Board, rng: &mut R) -> Board {
    add_random_tile_with(board, rng, DEFAULT_FOUR_PROBABILITY)
}

/// Like [`add_random_tile`] with an explicit chance of spawning a 4
pub fn add_random_tile_with<R: Rng + ?Sized>(
    board: &Board,
    rng: &mut R,
    four_probability: f64,
) -> Board {
    let empty = board.empty_cells();
    let Some(&pos) = empty.choose(rng) else {
        return *board;
    };
    let value = if rng.gen::<f64>() < four_probability { 4 } else { 2 };

    let mut cells = board.cells;
    cells[pos.row][pos.col] = value;
    Board { cells }
}

// ============================================================================
// TESTS
// ============================================================================
