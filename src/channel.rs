//! Newline-delimited text over a byte stream.

use derive_more::{Display, Error};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tracing::{debug, instrument};

/// I/O failure on a line channel with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Channel error: {} at {}:{}", message, file, line)]
pub struct ChannelError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ChannelError {
    /// Creates a new channel error with caller location tracking.
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

impl From<std::io::Error> for ChannelError {
    #[track_caller]
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {}", err))
    }
}

/// Read side: yields one line at a time without its terminator.
#[derive(Debug)]
pub struct LineReader<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin> LineReader<R> {
    /// Wraps a byte stream.
    pub fn new(inner: R) -> Self {
        Self {
            lines: BufReader::new(inner).lines(),
        }
    }

    /// Waits for the next full line.
    ///
    /// Returns `Ok(None)` once the peer has closed the stream. A trailing
    /// `\r` is stripped. Bytes that are not UTF-8 surface as an error.
    pub async fn next_line(&mut self) -> Result<Option<String>, ChannelError> {
        Ok(self.lines.next_line().await?)
    }
}

/// Write side: sends one line per call, appending `\n`.
#[derive(Debug)]
pub struct LineWriter<W> {
    inner: W,
}

impl<W: AsyncWrite + Unpin> LineWriter<W> {
    /// Wraps a byte stream.
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Writes `text` followed by a newline and flushes.
    #[instrument(skip(self))]
    pub async fn send_line(&mut self, text: &str) -> Result<(), ChannelError> {
        let mut buf = Vec::with_capacity(text.len() + 1);
        buf.extend_from_slice(text.as_bytes());
        buf.push(b'\n');
        self.inner.write_all(&buf).await?;
        self.inner.flush().await?;
        Ok(())
    }

    /// Shuts the write side down. Errors are ignored; the peer may already
    /// be gone.
    pub async fn close(&mut self) {
        if let Err(e) = self.inner.shutdown().await {
            debug!(error = %e, "Shutdown on closed channel");
        }
    }
}

/// Both halves of one peer connection.
#[derive(Debug)]
pub struct LineChannel<R, W> {
    reader: LineReader<R>,
    writer: LineWriter<W>,
}

/// Channel over a TCP connection.
pub type TcpChannel = LineChannel<OwnedReadHalf, OwnedWriteHalf>;

impl TcpChannel {
    /// Splits a TCP stream into a line channel.
    pub fn from_tcp(stream: TcpStream) -> Self {
        let (read, write) = stream.into_split();
        Self::new(read, write)
    }
}

impl<R: AsyncRead + Unpin, W: AsyncWrite + Unpin> LineChannel<R, W> {
    /// Builds a channel from separate read and write halves.
    pub fn new(read: R, write: W) -> Self {
        Self {
            reader: LineReader::new(read),
            writer: LineWriter::new(write),
        }
    }

    /// See [`LineReader::next_line`].
    pub async fn next_line(&mut self) -> Result<Option<String>, ChannelError> {
        self.reader.next_line().await
    }

    /// See [`LineWriter::send_line`].
    pub async fn send_line(&mut self, text: &str) -> Result<(), ChannelError> {
        self.writer.send_line(text).await
    }

    /// Sends a line, logging instead of failing if the peer is gone.
    pub async fn send_lossy(&mut self, text: &str) {
        if let Err(e) = self.send_line(text).await {
            debug!(error = %e, "Dropped outbound line");
        }
    }

    /// Closes the write side and drops the read side.
    pub async fn close(mut self) {
        self.writer.close().await;
    }

    /// Separates the halves so they can be driven by different tasks.
    pub fn into_split(self) -> (LineReader<R>, LineWriter<W>) {
        (self.reader, self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_reads_lines_and_detects_close() {
        let (client, server) = tokio::io::duplex(256);
        let (read, write) = tokio::io::split(server);
        let mut channel = LineChannel::new(read, write);

        let (_, mut client_write) = tokio::io::split(client);
        client_write.write_all(b"MOVE 1 1\r\nCHAT hi\n").await.unwrap();
        drop(client_write);

        assert_eq!(channel.next_line().await.unwrap().as_deref(), Some("MOVE 1 1"));
        assert_eq!(channel.next_line().await.unwrap().as_deref(), Some("CHAT hi"));
    }

    #[tokio::test]
    async fn test_eof_is_none() {
        let (client, server) = tokio::io::duplex(64);
        let (read, write) = tokio::io::split(server);
        let mut channel = LineChannel::new(read, write);
        drop(client);
        assert_eq!(channel.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_send_line_appends_newline() {
        let (mut client, server) = tokio::io::duplex(64);
        let (read, write) = tokio::io::split(server);
        let mut channel = LineChannel::new(read, write);

        channel.send_line("TURN X").await.unwrap();
        channel.close().await;

        let mut received = String::new();
        client.read_to_string(&mut received).await.unwrap();
        assert_eq!(received, "TURN X\n");
    }
}
