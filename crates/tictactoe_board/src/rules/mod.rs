//! Game rules for tic-tac-toe.
//!
//! Pure functions over a [`Board`](crate::Board). Rules are kept apart from
//! board storage so the session layer can evaluate a position without
//! knowing how cells are laid out.

pub mod draw;
pub mod win;

pub use draw::is_full;
pub use win::{LINES, check_winner};

use crate::{Board, Outcome};
use tracing::instrument;

/// Classifies a position.
///
/// A completed line wins even on a full board.
#[instrument]
pub fn evaluate(board: &Board) -> Outcome {
    if let Some(mark) = check_winner(board) {
        Outcome::Win(mark)
    } else if is_full(board) {
        Outcome::Draw
    } else {
        Outcome::Ongoing
    }
}
