//! Board error types.

use derive_more::{Display, Error};

/// Error returned when a move cannot be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum MoveError {
    /// Row or column outside `0..=2`.
    #[display("Cell ({row}, {col}) is off the board")]
    OutOfRange {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },

    /// The target cell already holds a mark.
    #[display("Cell ({row}, {col}) is already occupied")]
    CellOccupied {
        /// Requested row.
        row: usize,
        /// Requested column.
        col: usize,
    },
}

/// Error returned when a serialized board cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum ParseBoardError {
    /// The string does not hold exactly nine characters.
    #[display("Board string must have 9 cells, got {_0}")]
    WrongLength(#[error(not(source))] usize),

    /// A character other than `X`, `O` or `-`.
    #[display("Invalid board character {found:?} at index {index}")]
    InvalidCell {
        /// Offending character.
        found: char,
        /// Position in the string.
        index: usize,
    },
}
