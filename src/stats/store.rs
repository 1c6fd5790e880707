//! Shared stats store.

use super::{StatsBackend, StatsError, StatsRecord, StatsSnapshot};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

/// Process-wide identity → counters mapping.
///
/// One lock covers the whole read-modify-persist sequence of
/// [`record_result`](Self::record_result), so results finishing in parallel
/// sessions never interleave. Share it between sessions behind an `Arc`.
#[derive(Debug)]
pub struct StatsStore {
    records: Mutex<StatsSnapshot>,
    backend: Box<dyn StatsBackend>,
}

impl StatsStore {
    /// Opens the store, loading whatever the backend holds.
    ///
    /// A backend that fails to load yields an empty store; the next save
    /// overwrites the unreadable data.
    #[instrument(skip(backend))]
    pub fn open(backend: impl StatsBackend + 'static) -> Self {
        let records = backend.load().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load stats, starting empty");
            StatsSnapshot::new()
        });
        info!(players = records.len(), "Stats store opened");
        Self {
            records: Mutex::new(records),
            backend: Box::new(backend),
        }
    }

    /// Returns the counters for `identity`, creating a zeroed record first
    /// if none exists. The created record is not persisted until the next
    /// mutation.
    #[instrument(skip(self))]
    pub fn get(&self, identity: &str) -> StatsRecord {
        *self.lock().entry(identity.to_string()).or_default()
    }

    /// Records one finished game.
    ///
    /// With `is_draw` both players get a draw, otherwise `winner` gets a win
    /// and `loser` a loss. The complete mapping is persisted before the lock
    /// is released. Persisting blocks the calling thread on backend I/O.
    ///
    /// # Errors
    ///
    /// Returns [`StatsError`] if persisting fails. The in-memory counters are
    /// already updated in that case and stay authoritative.
    #[instrument(skip(self))]
    pub fn record_result(&self, winner: &str, loser: &str, is_draw: bool) -> Result<(), StatsError> {
        let mut records = self.lock();

        if is_draw {
            records.entry(winner.to_string()).or_default().add_draw();
            records.entry(loser.to_string()).or_default().add_draw();
        } else {
            records.entry(winner.to_string()).or_default().add_win();
            records.entry(loser.to_string()).or_default().add_loss();
        }
        debug!(
            winner_record = %records[winner],
            loser_record = %records[loser],
            "Counters updated"
        );

        self.backend.save(&records)
    }

    /// Copy of the whole mapping.
    pub fn snapshot(&self) -> StatsSnapshot {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, StatsSnapshot> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
