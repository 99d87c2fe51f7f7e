//! Tic-Tac-Toe board, lines and terminal detection

use crate::board::{positions, Position};
use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Board width and height
pub const SIZE: usize = 3;

/// A winning triple of coordinates
pub type Line = [Position; 3];

const fn pos(row: usize, col: usize) -> Position {
    Position::new(row, col)
}

/// The 8 winning lines: rows, then columns, then diagonals
pub const LINES: [Line; 8] = [
    [pos(0, 0), pos(0, 1), pos(0, 2)],
    [pos(1, 0), pos(1, 1), pos(1, 2)],
    [pos(2, 0), pos(2, 1), pos(2, 2)],
    [pos(0, 0), pos(1, 0), pos(2, 0)],
    [pos(0, 1), pos(1, 1), pos(2, 1)],
    [pos(0, 2), pos(1, 2), pos(2, 2)],
    [pos(0, 0), pos(1, 1), pos(2, 2)],
    [pos(0, 2), pos(1, 1), pos(2, 0)],
];

// ============================================================================
// CORE TYPES
// ============================================================================

/// Cell contents
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    #[default]
    Empty,
    /// Human side, plays X and moves first
    Player,
    /// Computer side, plays O
    Ai,
}

impl Mark {
    fn symbol(self) -> char {
        match self {
            Mark::Empty => '.',
            Mark::Player => 'X',
            Mark::Ai => 'O',
        }
    }

    fn from_symbol(c: char) -> Option<Self> {
        match c {
            '.' | '_' | '-' => Some(Mark::Empty),
            'X' | 'x' => Some(Mark::Player),
            'O' | 'o' => Some(Mark::Ai),
            _ => None,
        }
    }
}

/// Game result
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    PlayerWins,
    AiWins,
    Draw,
}

impl GameResult {
    pub fn is_over(self) -> bool {
        self != GameResult::Ongoing
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// 3×3 board (copy to mutate)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [[Mark; SIZE]; SIZE],
}

impl Board {
    /// Empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from raw cells, checking that the sides alternated with X first
    pub fn from_cells(cells: [[Mark; SIZE]; SIZE]) -> Result<Self> {
        let board = Self { cells };
        board.validate()?;
        Ok(board)
    }

    pub fn cells(&self) -> &[[Mark; SIZE]; SIZE] {
        &self.cells
    }

    /// Get the mark at a position (`None` when off the board)
    pub fn get(&self, pos: Position) -> Option<Mark> {
        pos.is_within(SIZE).then(|| self.cells[pos.row][pos.col])
    }

    /// Return a copy with `mark` written at `pos`
    pub fn place(&self, pos: Position, mark: Mark) -> Result<Self> {
        match self.get(pos) {
            None => Err(GameError::InvalidPosition {
                row: pos.row,
                col: pos.col,
            }),
            Some(Mark::Empty) => Ok(self.with(pos, mark)),
            Some(_) => Err(GameError::CellOccupied {
                row: pos.row,
                col: pos.col,
            }),
        }
    }

    /// Unchecked write, for search over positions already known to be empty
    pub(crate) fn with(&self, pos: Position, mark: Mark) -> Self {
        let mut next = *self;
        next.cells[pos.row][pos.col] = mark;
        next
    }

    /// Empty cells in row-major order
    pub fn empty_cells(&self) -> impl Iterator<Item = Position> + '_ {
        positions::<SIZE>().filter(move |&p| self.cells[p.row][p.col] == Mark::Empty)
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.cells.iter().flatten().filter(|&&m| m == mark).count()
    }

    /// No empty cells remain
    pub fn is_full(&self) -> bool {
        self.count(Mark::Empty) == 0
    }

    /// First completed line belonging to `mark`
    pub fn winning_line(&self, mark: Mark) -> Option<Line> {
        if mark == Mark::Empty {
            return None;
        }
        LINES
            .iter()
            .find(|line| line.iter().all(|p| self.cells[p.row][p.col] == mark))
            .copied()
    }

    pub fn has_won(&self, mark: Mark) -> bool {
        self.winning_line(mark).is_some()
    }

    /// Terminal classification (AI line is checked first)
    pub fn result(&self) -> GameResult {
        if self.has_won(Mark::Ai) {
            GameResult::AiWins
        } else if self.has_won(Mark::Player) {
            GameResult::PlayerWins
        } else if self.is_full() {
            GameResult::Draw
        } else {
            GameResult::Ongoing
        }
    }

    /// Side whose turn it is, derived from the mark counts
    pub fn side_to_move(&self) -> Mark {
        if self.count(Mark::Player) > self.count(Mark::Ai) {
            Mark::Ai
        } else {
            Mark::Player
        }
    }

    /// Check the alternation invariant: X moves first, sides differ by at most one
    pub fn validate(&self) -> Result<()> {
        let x = self.count(Mark::Player);
        let o = self.count(Mark::Ai);
        if x < o || x - o > 1 {
            return Err(GameError::InvalidBoard(format!(
                "mark counts X={} O={} do not alternate from X",
                x, o
            )));
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = GameError;

    /// Parse 9 cell symbols (`X`, `O`, `.`); whitespace, `/` and `|` are ignored
    fn from_str(s: &str) -> Result<Self> {
        let symbols: Vec<char> = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '/' && *c != '|')
            .collect();
        if symbols.len() != SIZE * SIZE {
            return Err(GameError::InvalidBoard(format!(
                "expected {} cells, found {}",
                SIZE * SIZE,
                symbols.len()
            )));
        }

        let mut cells = [[Mark::Empty; SIZE]; SIZE];
        for (i, &c) in symbols.iter().enumerate() {
            let mark = Mark::from_symbol(c)
                .ok_or_else(|| GameError::InvalidBoard(format!("unknown cell symbol '{}'", c)))?;
            cells[i / SIZE][i % SIZE] = mark;
        }
        Self::from_cells(cells)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (r, row) in self.cells.iter().enumerate() {
            if r > 0 {
                writeln!(f)?;
            }
            let line: String = row.iter().map(|m| m.symbol()).collect();
            write!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_board() {
        let board = Board::new();
        assert_eq!(board.empty_cells().count(), 9);
        assert!(!board.is_full());
        assert_eq!(board.result(), GameResult::Ongoing);
        assert_eq!(board.side_to_move(), Mark::Player);
    }

    #[test]
    fn test_line_membership_counts() {
        // Centre sits on 4 lines, corners on 3, edges on 2
        let on_lines = |p: Position| LINES.iter().filter(|l| l.contains(&p)).count();
        assert_eq!(on_lines(Position::new(1, 1)), 4);
        assert_eq!(on_lines(Position::new(0, 0)), 3);
        assert_eq!(on_lines(Position::new(0, 1)), 2);
    }

    #[test]
    fn test_parse_and_display() {
        let board: Board = "XO./.X./..O".parse().unwrap();
        assert_eq!(board.get(Position::new(0, 0)), Some(Mark::Player));
        assert_eq!(board.get(Position::new(0, 1)), Some(Mark::Ai));
        assert_eq!(board.get(Position::new(2, 2)), Some(Mark::Ai));
        assert_eq!(board.to_string(), "XO.\n.X.\n..O");
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!("XO".parse::<Board>().is_err());
        assert!("XOZ......".parse::<Board>().is_err());
        // O cannot have moved first
        assert!("O........".parse::<Board>().is_err());
        // X cannot move twice in a row
        assert!("XX.......".parse::<Board>().is_err());
    }

    #[test]
    fn test_place() {
        let board = Board::new();
        let next = board.place(Position::new(1, 1), Mark::Player).unwrap();
        assert_eq!(next.get(Position::new(1, 1)), Some(Mark::Player));
        // Original untouched
        assert_eq!(board.get(Position::new(1, 1)), Some(Mark::Empty));

        assert_eq!(
            next.place(Position::new(1, 1), Mark::Ai),
            Err(GameError::CellOccupied { row: 1, col: 1 })
        );
        assert_eq!(
            next.place(Position::new(3, 0), Mark::Ai),
            Err(GameError::InvalidPosition { row: 3, col: 0 })
        );
    }

    #[test]
    fn test_winning_line() {
        let board: Board = "XXX/OO./...".parse().unwrap();
        assert_eq!(board.winning_line(Mark::Player), Some(LINES[0]));
        assert_eq!(board.winning_line(Mark::Ai), None);
        assert_eq!(board.result(), GameResult::PlayerWins);

        let diag: Board = "OXX/XO./..O".parse().unwrap();
        assert_eq!(diag.winning_line(Mark::Ai), Some(LINES[6]));
        assert_eq!(diag.result(), GameResult::AiWins);
    }

    #[test]
    fn test_draw() {
        let board: Board = "XOX/XOO/OXX".parse().unwrap();
        assert!(board.is_full());
        assert_eq!(board.result(), GameResult::Draw);
    }
}
