//! Core domain types for the board.

use serde::{Deserialize, Serialize};

/// A player's symbol on the board.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Mark {
    /// Moves first.
    X,
    /// Moves second.
    O,
}

impl Mark {
    /// Returns the other mark.
    pub fn opponent(self) -> Self {
        match self {
            Mark::X => Mark::O,
            Mark::O => Mark::X,
        }
    }

    /// Character used for this mark in the serialized board.
    pub fn symbol(self) -> char {
        match self {
            Mark::X => 'X',
            Mark::O => 'O',
        }
    }
}

/// A cell on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Nothing placed yet.
    #[default]
    Empty,
    /// Holds a mark. Never changes again.
    Occupied(Mark),
}

impl Cell {
    /// Character used for this cell in the serialized board.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '-',
            Cell::Occupied(mark) => mark.symbol(),
        }
    }

    /// Parses a serialized board character.
    pub fn from_symbol(c: char) -> Option<Self> {
        match c {
            '-' => Some(Cell::Empty),
            'X' => Some(Cell::Occupied(Mark::X)),
            'O' => Some(Cell::Occupied(Mark::O)),
            _ => None,
        }
    }

    /// Returns true if nothing has been placed here.
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}
