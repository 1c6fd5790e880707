//! Draw detection.

use crate::Board;
use tracing::instrument;

/// Checks if every cell holds a mark.
///
/// A full board with no winner is a draw.
#[instrument]
pub fn is_full(board: &Board) -> bool {
    board.cells().iter().all(|c| !c.is_empty())
}
