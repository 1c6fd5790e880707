//! Drives one [`Session`] over two peer connections.
//!
//! Each peer gets a reader task that forwards complete lines into one shared
//! queue, tagged with the peer's mark. The session loop sleeps on that queue,
//! so it wakes for whichever peer speaks first and never waits on a silent
//! peer while the other one has something to say. Lines from one peer keep
//! their order. The queue is bounded, so a peer that floods the server stalls
//! its own reader task instead of growing memory.
//!
//! Session steps can end the game, which persists stats through blocking
//! file I/O. On a multi-threaded runtime those steps run under
//! [`block_in_place`](tokio::task::block_in_place).

use crate::channel::{LineChannel, LineReader, LineWriter};
use crate::session::{Delivery, Session, SessionOutcome};
use tictactoe_board::Mark;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::runtime::{Handle, RuntimeFlavor};
use tokio::sync::mpsc::{self, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Lines each reader may queue ahead of the session loop.
const PEER_QUEUE_DEPTH: usize = 64;

/// What a reader task reports.
#[derive(Debug)]
enum PeerEvent {
    Line(String),
    Closed,
}

/// Owns a session and both of its connections until the game ends.
#[derive(Debug)]
pub struct SessionRunner<R, W> {
    session: Session,
    player_x: LineChannel<R, W>,
    player_o: LineChannel<R, W>,
}

impl<R, W> SessionRunner<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send,
{
    /// Pairs a fresh session with the connections of its X and O players.
    pub fn new(session: Session, player_x: LineChannel<R, W>, player_o: LineChannel<R, W>) -> Self {
        Self {
            session,
            player_x,
            player_o,
        }
    }

    /// Plays the game to the end and closes both connections.
    ///
    /// There is no timeout: a session with two silent peers waits forever.
    #[instrument(skip(self), fields(player_x = %self.session.identity(Mark::X), player_o = %self.session.identity(Mark::O)))]
    pub async fn run(self) -> SessionOutcome {
        let Self {
            mut session,
            player_x,
            player_o,
        } = self;

        let (tx, mut rx) = mpsc::channel(PEER_QUEUE_DEPTH);
        let (x_reader, x_writer) = player_x.into_split();
        let (o_reader, o_writer) = player_o.into_split();
        let readers = [
            spawn_reader(Mark::X, x_reader, tx.clone()),
            spawn_reader(Mark::O, o_reader, tx),
        ];
        let mut writers = Writers::new(x_writer, o_writer);

        writers.deliver(session.start()).await;

        let outcome = loop {
            if let Some(outcome) = session.outcome() {
                break outcome;
            }

            let deliveries = match rx.recv().await {
                Some((mark, PeerEvent::Line(line))) => blocking_step(|| session.handle_line(mark, &line)),
                Some((mark, PeerEvent::Closed)) => {
                    info!(event = "disconnect", identity = %session.identity(mark), "Peer connection closed");
                    writers.mark_lost(mark);
                    blocking_step(|| session.peer_lost(mark))
                }
                None => {
                    // Readers always report closure before exiting.
                    warn!("Reader tasks ended without reporting closure");
                    let mark = session.current_mark().unwrap_or(Mark::X);
                    blocking_step(|| session.peer_lost(mark))
                }
            };
            writers.deliver(deliveries).await;
        };

        for reader in readers {
            reader.abort();
            let _ = reader.await;
        }
        writers.close().await;
        debug!(?outcome, "Session closed");
        outcome
    }
}

fn spawn_reader<R>(
    mark: Mark,
    mut reader: LineReader<R>,
    tx: Sender<(Mark, PeerEvent)>,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            match reader.next_line().await {
                Ok(Some(line)) => {
                    if tx.send((mark, PeerEvent::Line(line))).await.is_err() {
                        break;
                    }
                }
                Ok(None) => {
                    debug!(%mark, "Peer reached end of stream");
                    let _ = tx.send((mark, PeerEvent::Closed)).await;
                    break;
                }
                Err(e) => {
                    debug!(%mark, error = %e, "Peer read failed");
                    let _ = tx.send((mark, PeerEvent::Closed)).await;
                    break;
                }
            }
        }
    })
}

/// Runs a session step, handing the worker thread off first when the runtime
/// can spare it. A current-thread runtime has no other worker to hand off to.
fn blocking_step<T>(step: impl FnOnce() -> T) -> T {
    match Handle::current().runtime_flavor() {
        RuntimeFlavor::MultiThread => tokio::task::block_in_place(step),
        _ => step(),
    }
}

/// Write halves of both peers, skipping any peer known to be gone.
struct Writers<W> {
    x: LineWriter<W>,
    o: LineWriter<W>,
    lost: [bool; 2],
}

impl<W: AsyncWrite + Unpin> Writers<W> {
    fn new(x: LineWriter<W>, o: LineWriter<W>) -> Self {
        Self {
            x,
            o,
            lost: [false; 2],
        }
    }

    fn mark_lost(&mut self, mark: Mark) {
        self.lost[slot(mark)] = true;
    }

    async fn deliver(&mut self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            let to = *delivery.to();
            if self.lost[slot(to)] {
                continue;
            }
            let writer = match to {
                Mark::X => &mut self.x,
                Mark::O => &mut self.o,
            };
            if let Err(e) = writer.send_line(&delivery.message().to_string()).await {
                debug!(mark = %to, error = %e, "Dropped outbound line");
            }
        }
    }

    async fn close(&mut self) {
        self.x.close().await;
        self.o.close().await;
    }
}

fn slot(mark: Mark) -> usize {
    match mark {
        Mark::X => 0,
        Mark::O => 1,
    }
}
