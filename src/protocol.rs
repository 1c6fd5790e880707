//! Line protocol grammar.
//!
//! Clients send commands (`USER`, `MOVE`, `CHAT`, `QUIT`); the server sends
//! tagged messages (`START`, `STATS`, `BOARD`, `TURN`, `INFO`, `MSG`,
//! `RESULT`). One command or message per line, no escaping.

use crate::stats::StatsRecord;
use derive_more::{Display, Error};
use std::fmt;
use tictactoe_board::{Board, Mark, MoveError};

/// Hint shown for a malformed `MOVE`.
pub const MOVE_USAGE: &str = "Usage: MOVE row col";
/// Hint shown for an empty `CHAT`.
pub const CHAT_USAGE: &str = "Usage: CHAT your message";
/// Hint shown during the handshake.
pub const USER_USAGE: &str = "Please use: USER your_name";

/// A parsed inbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `USER <name>`, name trimmed and possibly empty.
    User(String),
    /// `MOVE ...`, arguments not yet validated.
    Move(MoveRequest),
    /// `CHAT <text>`, text possibly empty.
    Chat(String),
    /// `QUIT`, trailing words ignored.
    Quit,
    /// Any other command word.
    Unknown(String),
}

impl Command {
    /// Parses a trimmed, non-empty line. The command word is
    /// case-insensitive; everything after the first space is the argument.
    pub fn parse(line: &str) -> Self {
        let (word, rest) = line.split_once(' ').unwrap_or((line, ""));
        match word.to_ascii_uppercase().as_str() {
            "USER" => Command::User(rest.trim().to_string()),
            "MOVE" => Command::Move(MoveRequest::new(rest)),
            "CHAT" => Command::Chat(rest.to_string()),
            "QUIT" => Command::Quit,
            _ => Command::Unknown(word.to_string()),
        }
    }
}

/// Raw arguments of a `MOVE` command.
///
/// Validation is deferred so a move from the wrong player is reported as a
/// turn violation before its arguments are looked at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    args: String,
}

impl MoveRequest {
    /// Wraps the text after `MOVE`.
    pub fn new(args: impl Into<String>) -> Self {
        Self { args: args.into() }
    }

    /// Validates the arguments as a row and column in `0..=2`.
    ///
    /// # Errors
    ///
    /// [`CommandError::MoveUsage`] unless there are exactly two words,
    /// [`CommandError::NotAnInteger`] if either fails to parse and
    /// [`CommandError::OutOfRange`] if either is outside the board.
    pub fn coordinates(&self) -> Result<(usize, usize), CommandError> {
        let words: Vec<&str> = self.args.split_whitespace().collect();
        let [row, col] = words.as_slice() else {
            return Err(CommandError::MoveUsage);
        };

        let row: i64 = row.parse().map_err(|_| CommandError::NotAnInteger)?;
        let col: i64 = col.parse().map_err(|_| CommandError::NotAnInteger)?;
        if !(0..=2).contains(&row) || !(0..=2).contains(&col) {
            return Err(CommandError::OutOfRange);
        }

        Ok((row as usize, col as usize))
    }
}

/// Category of a rejected command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum CommandErrorKind {
    /// Malformed or unknown command.
    Protocol,
    /// Move from the player not on turn.
    TurnViolation,
    /// Coordinates off the board or cell taken.
    IllegalMove,
}

/// A command rejected at the dispatch boundary.
///
/// The display text is the `INFO` line sent back to the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum CommandError {
    /// Unrecognized command word.
    #[display("Unknown command. Use MOVE or CHAT or QUIT.")]
    Unknown,
    /// `MOVE` without exactly two arguments.
    #[display("{}", MOVE_USAGE)]
    MoveUsage,
    /// `CHAT` with nothing to say.
    #[display("{}", CHAT_USAGE)]
    ChatUsage,
    /// Sender does not hold the turn.
    #[display("It's not your turn.")]
    NotYourTurn,
    /// Row or column not an integer.
    #[display("Row and col must be integers 0-2")]
    NotAnInteger,
    /// Row or column outside `0..=2`.
    #[display("Row and col must be between 0 and 2")]
    OutOfRange,
    /// Target cell already holds a mark.
    #[display("That cell is already taken.")]
    CellTaken,
}

impl CommandError {
    /// Classifies the error.
    pub fn kind(self) -> CommandErrorKind {
        match self {
            CommandError::Unknown | CommandError::MoveUsage | CommandError::ChatUsage => {
                CommandErrorKind::Protocol
            }
            CommandError::NotYourTurn => CommandErrorKind::TurnViolation,
            CommandError::NotAnInteger | CommandError::OutOfRange | CommandError::CellTaken => {
                CommandErrorKind::IllegalMove
            }
        }
    }
}

impl From<MoveError> for CommandError {
    fn from(err: MoveError) -> Self {
        match err {
            MoveError::OutOfRange { .. } => CommandError::OutOfRange,
            MoveError::CellOccupied { .. } => CommandError::CellTaken,
        }
    }
}

/// Per-player verdict in a `RESULT` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum GameResult {
    /// This player won.
    #[strum(serialize = "WIN")]
    Win,
    /// This player lost.
    #[strum(serialize = "LOSE")]
    Lose,
    /// Nobody won.
    #[strum(serialize = "DRAW")]
    Draw,
}

/// An outbound line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// `START <mark> <opponent>`
    Start {
        /// Mark assigned to the recipient.
        mark: Mark,
        /// Opponent's identity.
        opponent: String,
    },
    /// `STATS <wins> <losses> <draws>`
    Stats(StatsRecord),
    /// `BOARD <9 cells>`
    Board(Board),
    /// `TURN <mark>`
    Turn(Mark),
    /// `INFO <text>`
    Info(String),
    /// `MSG <sender>: <text>`
    Chat {
        /// Sender's identity.
        sender: String,
        /// Chat text as sent.
        text: String,
    },
    /// `RESULT <WIN|LOSE|DRAW>`
    Result(GameResult),
}

impl ServerMessage {
    /// Shorthand for an `INFO` line.
    pub fn info(text: impl Into<String>) -> Self {
        ServerMessage::Info(text.into())
    }
}

impl fmt::Display for ServerMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerMessage::Start { mark, opponent } => write!(f, "START {mark} {opponent}"),
            ServerMessage::Stats(record) => write!(f, "STATS {record}"),
            ServerMessage::Board(board) => write!(f, "BOARD {board}"),
            ServerMessage::Turn(mark) => write!(f, "TURN {mark}"),
            ServerMessage::Info(text) => write!(f, "INFO {text}"),
            ServerMessage::Chat { sender, text } => write!(f, "MSG {sender}: {text}"),
            ServerMessage::Result(result) => write!(f, "RESULT {result}"),
        }
    }
}
