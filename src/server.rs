//! Connection acceptance and pairing.
//!
//! The acceptor runs one game at a time: it accepts a first player, waits
//! for their name, accepts a second player, then hands both connections to a
//! [`SessionRunner`] and waits for the game to finish before accepting again.
//! Connections arriving meanwhile wait in the listen backlog.

use crate::channel::{LineChannel, TcpChannel};
use crate::config::ServerConfig;
use crate::handshake::read_identity;
use crate::protocol::ServerMessage;
use crate::runner::SessionRunner;
use crate::session::{Session, SessionOutcome};
use crate::stats::StatsStore;
use derive_more::{Display, Error};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, instrument, warn};

/// Back-off after a failed accept so a persistent error does not spin.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// Server-level failure with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Server error: {} at {}:{}", message, file, line)]
pub struct ServerError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ServerError {
    /// Creates a new server error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

impl From<std::io::Error> for ServerError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

/// Pairs connections into games and records their results.
#[derive(Debug, Clone)]
pub struct GameServer {
    stats: Arc<StatsStore>,
}

impl GameServer {
    /// Creates a server that records results in `stats`.
    pub fn new(stats: Arc<StatsStore>) -> Self {
        Self { stats }
    }

    /// Shared stats store.
    pub fn stats(&self) -> &Arc<StatsStore> {
        &self.stats
    }

    /// Binds the listening socket described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if the address cannot be bound.
    #[instrument(skip(config), fields(address = %config.address()))]
    pub async fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
        let listener = TcpListener::bind(config.address())
            .await
            .map_err(|e| ServerError::new(format!("Failed to bind {}: {}", config.address(), e)))?;
        info!(event = "server_start", address = %listener.local_addr()?, "Server listening");
        Ok(listener)
    }

    /// Runs games back to back until the process exits.
    ///
    /// Failures are confined to the game they happen in.
    pub async fn serve(&self, listener: TcpListener) {
        loop {
            match self.play_one(&listener).await {
                Ok(Some(outcome)) => info!(?outcome, "Game finished, accepting next pair"),
                Ok(None) => info!("Pairing abandoned, accepting next pair"),
                Err(e) => {
                    error!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                }
            }
        }
    }

    /// Accepts and names two players, then plays one game between them.
    ///
    /// Returns `Ok(None)` if a player left before the game started. When the
    /// second player leaves, the first is told and released.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError`] if accepting a connection fails.
    #[instrument(skip_all)]
    pub async fn play_one(&self, listener: &TcpListener) -> Result<Option<SessionOutcome>, ServerError> {
        let mut first = accept(listener, 1).await?;
        let Some(name_x) = read_identity(&mut first).await else {
            first.close().await;
            return Ok(None);
        };
        first
            .send_lossy(&info_line(format!("Hi {name_x}, waiting for an opponent to join...")))
            .await;

        let mut second = accept(listener, 2).await?;
        let Some(name_o) = read_identity(&mut second).await else {
            warn!(identity = %name_x, "Second player left before the game started");
            first
                .send_lossy(&info_line("Opponent disconnected before game start."))
                .await;
            first.close().await;
            second.close().await;
            return Ok(None);
        };

        first
            .send_lossy(&info_line(format!("Opponent {name_o} joined. Starting game...")))
            .await;
        second
            .send_lossy(&info_line(format!("You are matched with {name_x}. Starting game...")))
            .await;

        let session = Session::new(name_x, name_o, Arc::clone(&self.stats));
        let outcome = SessionRunner::new(session, first, second).run().await;
        Ok(Some(outcome))
    }
}

async fn accept(listener: &TcpListener, seat: u8) -> Result<TcpChannel, ServerError> {
    let (stream, peer) = listener.accept().await?;
    info!(seat, %peer, "Player connected");
    Ok(LineChannel::from_tcp(stream))
}

fn info_line(text: impl Into<String>) -> String {
    ServerMessage::info(text).to_string()
}
