//! Pure tic-tac-toe board logic.
//!
//! This crate holds no I/O. It owns the 3x3 grid, checks move legality and
//! classifies positions as ongoing, won or drawn.
//!
//! # Example
//!
//! ```
//! use tictactoe_board::{Board, Mark, Outcome};
//!
//! let mut board = Board::new();
//! board.apply_move(1, 1, Mark::X).unwrap();
//! assert_eq!(board.evaluate(), Outcome::Ongoing);
//! assert_eq!(board.to_string(), "----X----");
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod error;
mod outcome;
pub mod rules;
mod types;

pub use board::Board;
pub use error::{MoveError, ParseBoardError};
pub use outcome::Outcome;
pub use types::{Cell, Mark};
