//! Square grid geometry shared by both games

use serde::{Deserialize, Serialize};
use std::fmt;

/// Row/column coordinate on a square grid
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Check if this position lies on a grid of the given size
    pub fn is_within(&self, size: usize) -> bool {
        self.row < size && self.col < size
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// All positions of an `N`×`N` grid in row-major order.
///
/// Search and tile placement both depend on this order being stable.
pub fn positions<const N: usize>() -> impl Iterator<Item = Position> {
    (0..N).flat_map(|row| (0..N).map(move |col| Position::new(row, col)))
}

/// Swap rows and columns
pub fn transpose<T: Copy, const N: usize>(grid: &[[T; N]; N]) -> [[T; N]; N] {
    let mut out = *grid;
    for (r, row) in grid.iter().enumerate() {
        for (c, &cell) in row.iter().enumerate() {
            out[c][r] = cell;
        }
    }
    out
}

/// Mirror every row left-to-right
pub fn reverse_rows<T: Copy, const N: usize>(grid: &[[T; N]; N]) -> [[T; N]; N] {
    let mut out = *grid;
    for row in out.iter_mut() {
        row.reverse();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_row_major() {
        let all: Vec<Position> = positions::<3>().collect();
        assert_eq!(all.len(), 9);
        assert_eq!(all[0], Position::new(0, 0));
        assert_eq!(all[1], Position::new(0, 1));
        assert_eq!(all[3], Position::new(1, 0));
        assert_eq!(all[8], Position::new(2, 2));
    }

    #[test]
    fn test_position_bounds() {
        assert!(Position::new(2, 2).is_within(3));
        assert!(!Position::new(3, 0).is_within(3));
        assert!(!Position::new(0, 4).is_within(4));
    }

    #[test]
    fn test_transpose() {
        let grid = [[1, 2, 3], [4, 5, 6], [7, 8, 9]];
        assert_eq!(transpose(&grid), [[1, 4, 7], [2, 5, 8], [3, 6, 9]]);
        assert_eq!(transpose(&transpose(&grid)), grid);
    }

    #[test]
    fn test_reverse_rows() {
        let grid = [[1, 2], [3, 4]];
        assert_eq!(reverse_rows(&grid), [[2, 1], [4, 3]]);
        assert_eq!(reverse_rows(&reverse_rows(&grid)), grid);
    }
}
