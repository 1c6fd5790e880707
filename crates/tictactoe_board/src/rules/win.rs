//! Win detection.

use crate::{Board, Cell, Mark};
use tracing::instrument;

/// The eight winning lines as row-major indices, in scan order: rows top to
/// bottom, columns left to right, main diagonal, anti-diagonal.
pub const LINES: [[usize; 3]; 8] = [
    // Rows
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    // Columns
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    // Diagonals
    [0, 4, 8],
    [2, 4, 6],
];

/// Returns the mark owning the first complete line in [`LINES`] order.
#[instrument]
pub fn check_winner(board: &Board) -> Option<Mark> {
    let cells = board.cells();
    LINES.iter().find_map(|&[a, b, c]| match cells[a] {
        Cell::Occupied(mark) if cells[b] == cells[a] && cells[c] == cells[a] => Some(mark),
        _ => None,
    })
}
