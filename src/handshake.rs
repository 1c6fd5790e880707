//! Pre-session identity capture.

use crate::channel::LineChannel;
use crate::protocol::{Command, ServerMessage, USER_USAGE};
use tokio::io::{AsyncRead, AsyncWrite};
use tracing::{debug, info, instrument};

/// Greets a new connection and waits for `USER <name>`.
///
/// Returns the trimmed name, or `None` if the peer left first. Blank lines
/// are skipped; other input gets a usage hint and another chance.
#[instrument(skip(channel))]
pub async fn read_identity<R, W>(channel: &mut LineChannel<R, W>) -> Option<String>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    channel
        .send_lossy(&ServerMessage::info("Welcome to Network Tic-Tac-Toe!").to_string())
        .await;
    channel
        .send_lossy(&ServerMessage::info("Please enter your username using: USER your_name").to_string())
        .await;

    loop {
        let line = match channel.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => {
                debug!("Peer left during handshake");
                return None;
            }
            Err(e) => {
                debug!(error = %e, "Handshake read failed");
                return None;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match Command::parse(line) {
            Command::User(name) if !name.is_empty() => {
                info!(event = "player_join", identity = %name, "Player identified");
                return Some(name);
            }
            _ => channel.send_lossy(&ServerMessage::info(USER_USAGE).to_string()).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

    #[tokio::test]
    async fn test_reads_identity_after_hints() {
        let (client, server) = tokio::io::duplex(1024);
        let (read, write) = tokio::io::split(server);
        let mut channel = LineChannel::new(read, write);

        let (client_read, mut client_write) = tokio::io::split(client);
        client_write
            .write_all(b"\nHELLO\nUSER   \nUSER alice\n")
            .await
            .unwrap();

        assert_eq!(read_identity(&mut channel).await.as_deref(), Some("alice"));

        drop(channel);
        let mut lines = BufReader::new(client_read).lines();
        let mut received = Vec::new();
        while let Some(line) = lines.next_line().await.unwrap() {
            received.push(line);
        }
        assert_eq!(
            received,
            vec![
                "INFO Welcome to Network Tic-Tac-Toe!",
                "INFO Please enter your username using: USER your_name",
                "INFO Please use: USER your_name",
                "INFO Please use: USER your_name",
            ]
        );
    }

    #[tokio::test]
    async fn test_none_when_peer_leaves() {
        let (client, server) = tokio::io::duplex(1024);
        let (read, write) = tokio::io::split(server);
        let mut channel = LineChannel::new(read, write);
        drop(client);
        assert_eq!(read_identity(&mut channel).await, None);
    }
}
