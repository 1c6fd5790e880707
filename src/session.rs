//! Per-game state machine.
//!
//! A [`Session`] binds two identities to one board. It consumes inbound lines
//! attributed to a mark and produces the outbound lines for each peer, but
//! performs no I/O of its own; [`SessionRunner`](crate::SessionRunner) moves
//! the lines over the wire.
//!
//! ```text
//! AwaitingMove(X) ──move──▶ AwaitingMove(O) ──move──▶ ...
//!        │                         │
//!        └── win / draw / quit / disconnect ──▶ Terminal(outcome)
//! ```
//!
//! `Terminal` is absorbing. Entering it records the result in the
//! [`StatsStore`] exactly once.

use crate::protocol::{Command, CommandError, GameResult, MoveRequest, ServerMessage};
use crate::stats::StatsStore;
use derive_getters::Getters;
use derive_new::new;
use std::sync::Arc;
use tictactoe_board::{Board, Mark, Outcome};
use tracing::{debug, info, instrument, warn};

const YOUR_TURN: &str = "Your turn. Use: MOVE row col (0-2) or CHAT message";
const WAITING: &str = "Waiting for opponent...";

/// One outbound line addressed to one peer.
#[derive(Debug, Clone, PartialEq, Eq, Getters, new)]
pub struct Delivery {
    /// Recipient.
    to: Mark,
    /// Line to send.
    message: ServerMessage,
}

/// Why a session ended without a decided game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum AbandonReason {
    /// The player sent `QUIT`.
    Quit,
    /// The player's connection closed or failed.
    Disconnect,
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The mark completed a line.
    Win(Mark),
    /// Board filled with no line.
    Draw,
    /// The mark left; the opponent wins by default.
    Abandoned {
        /// Player who left.
        by: Mark,
        /// How they left.
        reason: AbandonReason,
    },
}

impl SessionOutcome {
    /// Mark credited with the win, if any.
    pub fn winner(self) -> Option<Mark> {
        match self {
            SessionOutcome::Win(mark) => Some(mark),
            SessionOutcome::Draw => None,
            SessionOutcome::Abandoned { by, .. } => Some(by.opponent()),
        }
    }
}

/// Where the state machine is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the given mark to move.
    AwaitingMove(Mark),
    /// Game over.
    Terminal(SessionOutcome),
}

/// State machine for one paired game.
#[derive(Debug)]
pub struct Session {
    player_x: String,
    player_o: String,
    board: Board,
    state: SessionState,
    stats: Arc<StatsStore>,
    outbox: Vec<Delivery>,
}

impl Session {
    /// Creates a session with an empty board and X to move.
    ///
    /// Nothing is sent until [`start`](Self::start) is called.
    pub fn new(player_x: impl Into<String>, player_o: impl Into<String>, stats: Arc<StatsStore>) -> Self {
        Self {
            player_x: player_x.into(),
            player_o: player_o.into(),
            board: Board::new(),
            state: SessionState::AwaitingMove(Mark::X),
            stats,
            outbox: Vec::new(),
        }
    }

    /// Identity bound to `mark`.
    pub fn identity(&self, mark: Mark) -> &str {
        match mark {
            Mark::X => &self.player_x,
            Mark::O => &self.player_o,
        }
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Current state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Mark on turn, or `None` once terminal.
    pub fn current_mark(&self) -> Option<Mark> {
        match self.state {
            SessionState::AwaitingMove(mark) => Some(mark),
            SessionState::Terminal(_) => None,
        }
    }

    /// Outcome, once terminal.
    pub fn outcome(&self) -> Option<SessionOutcome> {
        match self.state {
            SessionState::AwaitingMove(_) => None,
            SessionState::Terminal(outcome) => Some(outcome),
        }
    }

    /// Returns true once the game is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, SessionState::Terminal(_))
    }

    /// Opening lines: each peer gets its mark, opponent and counters, then
    /// the empty board, `TURN X` and the first turn prompts.
    #[instrument(skip(self), fields(player_x = %self.player_x, player_o = %self.player_o))]
    pub fn start(&mut self) -> Vec<Delivery> {
        info!(event = "session_start", "Starting game");

        for mark in [Mark::X, Mark::O] {
            let opponent = self.identity(mark.opponent()).to_string();
            self.send(mark, ServerMessage::Start { mark, opponent });
        }
        for mark in [Mark::X, Mark::O] {
            let record = self.stats.get(self.identity(mark));
            self.send(mark, ServerMessage::Stats(record));
        }

        self.broadcast_board(Mark::X);
        self.broadcast(ServerMessage::info("Game started! X goes first."));
        self.prompt_turn(Mark::X);
        self.take_outbox()
    }

    /// Handles one inbound line from the peer playing `from`.
    ///
    /// Blank lines and anything arriving after the game ended are ignored.
    /// A rejected command produces a single `INFO` to the sender and leaves
    /// the state untouched.
    #[instrument(skip(self), fields(identity = %self.identity(from)))]
    pub fn handle_line(&mut self, from: Mark, line: &str) -> Vec<Delivery> {
        let line = line.trim();
        if line.is_empty() || self.is_terminal() {
            return self.take_outbox();
        }

        if let Err(e) = self.dispatch(from, Command::parse(line)) {
            debug!(kind = %e.kind(), error = %e, "Command rejected");
            self.send(from, ServerMessage::info(e.to_string()));
        }
        self.take_outbox()
    }

    /// Handles the loss of `mark`'s connection: the opponent wins by default.
    #[instrument(skip(self), fields(identity = %self.identity(mark)))]
    pub fn peer_lost(&mut self, mark: Mark) -> Vec<Delivery> {
        if !self.is_terminal() {
            self.abandon(mark, AbandonReason::Disconnect);
        }
        self.take_outbox()
    }

    fn dispatch(&mut self, from: Mark, command: Command) -> Result<(), CommandError> {
        match command {
            Command::Move(request) => self.play(from, &request),
            Command::Chat(text) => self.chat(from, text),
            Command::Quit => {
                self.abandon(from, AbandonReason::Quit);
                Ok(())
            }
            Command::User(_) | Command::Unknown(_) => Err(CommandError::Unknown),
        }
    }

    fn play(&mut self, from: Mark, request: &MoveRequest) -> Result<(), CommandError> {
        if self.current_mark() != Some(from) {
            return Err(CommandError::NotYourTurn);
        }

        let (row, col) = request.coordinates()?;
        self.board.apply_move(row, col, from)?;
        debug!(mark = %from, row, col, board = %self.board, "Move accepted");

        match self.board.evaluate() {
            Outcome::Ongoing => {
                let next = from.opponent();
                self.broadcast_board(next);
                self.state = SessionState::AwaitingMove(next);
                self.prompt_turn(next);
            }
            Outcome::Win(winner) => {
                self.broadcast_board(winner);
                let announcement = format!("Player {} ({}) wins!", self.identity(winner), winner);
                self.broadcast(ServerMessage::info(announcement));
                self.send(winner, ServerMessage::Result(GameResult::Win));
                self.send(winner.opponent(), ServerMessage::Result(GameResult::Lose));
                self.finish(SessionOutcome::Win(winner));
            }
            Outcome::Draw => {
                self.broadcast_board(from.opponent());
                self.broadcast(ServerMessage::info("Game is a draw."));
                self.broadcast(ServerMessage::Result(GameResult::Draw));
                self.finish(SessionOutcome::Draw);
            }
        }
        Ok(())
    }

    fn chat(&mut self, from: Mark, text: String) -> Result<(), CommandError> {
        if text.trim().is_empty() {
            return Err(CommandError::ChatUsage);
        }
        let sender = self.identity(from).to_string();
        self.broadcast(ServerMessage::Chat { sender, text });
        Ok(())
    }

    fn abandon(&mut self, by: Mark, reason: AbandonReason) {
        let winner = by.opponent();
        info!(
            event = %reason,
            identity = %self.identity(by),
            winner = %self.identity(winner),
            "Player left, opponent wins by default"
        );

        match reason {
            AbandonReason::Quit => {
                self.send(winner, ServerMessage::info("Opponent quit. You win by default."));
                self.send(by, ServerMessage::info("You quit. Opponent wins by default."));
                self.send(winner, ServerMessage::Result(GameResult::Win));
                self.send(by, ServerMessage::Result(GameResult::Lose));
            }
            AbandonReason::Disconnect => {
                self.send(winner, ServerMessage::info("Opponent disconnected. You win by default."));
                self.send(winner, ServerMessage::Result(GameResult::Win));
            }
        }
        self.finish(SessionOutcome::Abandoned { by, reason });
    }

    /// Enters `Terminal` and records the result. Only reachable from
    /// `AwaitingMove`, so the stats update happens once per session.
    fn finish(&mut self, outcome: SessionOutcome) {
        self.state = SessionState::Terminal(outcome);

        let recorded = match outcome.winner() {
            Some(winner) => {
                let (w, l) = (self.identity(winner), self.identity(winner.opponent()));
                info!(event = "result", winner = %w, loser = %l, outcome = ?outcome, "Game over");
                self.stats.record_result(w, l, false)
            }
            None => {
                info!(event = "result", player_x = %self.player_x, player_o = %self.player_o, "Game drawn");
                self.stats.record_result(&self.player_x, &self.player_o, true)
            }
        };

        if let Err(e) = recorded {
            warn!(error = %e, "Failed to persist stats, keeping in-memory counters");
        }
    }

    fn broadcast_board(&mut self, turn: Mark) {
        self.broadcast(ServerMessage::Board(self.board.clone()));
        self.broadcast(ServerMessage::Turn(turn));
    }

    fn prompt_turn(&mut self, mark: Mark) {
        self.send(mark, ServerMessage::info(YOUR_TURN));
        self.send(mark.opponent(), ServerMessage::info(WAITING));
    }

    fn broadcast(&mut self, message: ServerMessage) {
        self.send(Mark::X, message.clone());
        self.send(Mark::O, message);
    }

    fn send(&mut self, to: Mark, message: ServerMessage) {
        self.outbox.push(Delivery::new(to, message));
    }

    fn take_outbox(&mut self) -> Vec<Delivery> {
        std::mem::take(&mut self.outbox)
    }
}
