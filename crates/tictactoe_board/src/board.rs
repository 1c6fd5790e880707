//! The 3x3 grid.

use crate::{Cell, Mark, MoveError, Outcome, ParseBoardError, rules};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::instrument;

/// Side length of the grid.
pub const SIZE: usize = 3;

/// 3x3 board stored in row-major order (`idx = row * 3 + col`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    cells: [Cell; SIZE * SIZE],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the cell at a row-major index (0-8).
    pub fn get(&self, idx: usize) -> Option<Cell> {
        self.cells.get(idx).copied()
    }

    /// Gets the cell at a row and column.
    pub fn cell(&self, row: usize, col: usize) -> Option<Cell> {
        if row >= SIZE || col >= SIZE {
            return None;
        }
        self.get(row * SIZE + col)
    }

    /// Returns all cells.
    pub fn cells(&self) -> &[Cell; SIZE * SIZE] {
        &self.cells
    }

    /// Number of marks placed so far.
    pub fn filled(&self) -> usize {
        self.cells.iter().filter(|c| !c.is_empty()).count()
    }

    /// Places `mark` at (`row`, `col`).
    ///
    /// # Errors
    ///
    /// Returns [`MoveError::OutOfRange`] if either index is outside `0..=2`
    /// and [`MoveError::CellOccupied`] if the cell already holds a mark. The
    /// board is left untouched on error.
    #[instrument(skip(self), fields(board = %self))]
    pub fn apply_move(&mut self, row: usize, col: usize, mark: Mark) -> Result<(), MoveError> {
        if row >= SIZE || col >= SIZE {
            return Err(MoveError::OutOfRange { row, col });
        }

        let slot = &mut self.cells[row * SIZE + col];
        if !slot.is_empty() {
            return Err(MoveError::CellOccupied { row, col });
        }

        *slot = Cell::Occupied(mark);
        Ok(())
    }

    /// Classifies the position.
    pub fn evaluate(&self) -> Outcome {
        rules::evaluate(self)
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in &self.cells {
            write!(f, "{}", cell.symbol())?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = ParseBoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let count = s.chars().count();
        if count != SIZE * SIZE {
            return Err(ParseBoardError::WrongLength(count));
        }

        let mut board = Board::new();
        for (index, found) in s.chars().enumerate() {
            board.cells[index] =
                Cell::from_symbol(found).ok_or(ParseBoardError::InvalidCell { found, index })?;
        }
        Ok(board)
    }
}
