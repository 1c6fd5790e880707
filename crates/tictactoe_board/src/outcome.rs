//! Position classification.

use crate::Mark;
use serde::{Deserialize, Serialize};

/// What a board position means for the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// No line completed and at least one empty cell.
    Ongoing,
    /// The mark completed a line.
    Win(Mark),
    /// Board full with no completed line.
    Draw,
}

impl Outcome {
    /// Returns true for `Win` and `Draw`.
    pub fn is_over(self) -> bool {
        !matches!(self, Outcome::Ongoing)
    }
}
