//! tictactoe_net library - two-player tic-tac-toe over TCP
//!
//! Pairs two connections into a game, speaks a newline-delimited text
//! protocol with both, enforces turns and move legality, and keeps
//! per-player win/loss/draw counters on disk.
//!
//! # Architecture
//!
//! - **Channel**: newline-delimited text over a byte stream
//! - **Protocol**: inbound commands and outbound message lines
//! - **Session**: the per-game state machine (no I/O)
//! - **Runner**: multiplexes both peers and drives a session to its end
//! - **Stats**: shared counters with write-through persistence
//! - **Server**: accepts connections, reads names, pairs players
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use tictactoe_net::{GameServer, JsonFileBackend, ServerConfig, StatsStore};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ServerConfig::default();
//! let stats = Arc::new(StatsStore::open(JsonFileBackend::new(config.stats_path())));
//! let listener = GameServer::bind(&config).await?;
//! GameServer::new(stats).serve(listener).await;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod channel;
mod config;
mod handshake;
mod protocol;
mod runner;
mod server;
mod session;
mod stats;

// Crate-level exports - Transport
pub use channel::{ChannelError, LineChannel, LineReader, LineWriter, TcpChannel};

// Crate-level exports - Configuration
pub use config::{ConfigError, ServerConfig};

// Crate-level exports - Protocol
pub use handshake::read_identity;
pub use protocol::{
    CHAT_USAGE, Command, CommandError, CommandErrorKind, GameResult, MOVE_USAGE, MoveRequest,
    ServerMessage, USER_USAGE,
};

// Crate-level exports - Sessions
pub use runner::SessionRunner;
pub use server::{GameServer, ServerError};
pub use session::{AbandonReason, Delivery, Session, SessionOutcome, SessionState};

// Crate-level exports - Stats
pub use stats::{JsonFileBackend, MemoryBackend, StatsBackend, StatsError, StatsRecord, StatsSnapshot, StatsStore};

// Crate-level exports - Board types
pub use tictactoe_board::{Board, Cell, Mark, MoveError, Outcome};
