//! Durable storage for the stats mapping.

use super::{StatsError, StatsRecord};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info, instrument};

/// Whole mapping from identity to counters, as persisted.
pub type StatsSnapshot = BTreeMap<String, StatsRecord>;

/// Storage collaborator for [`StatsStore`](super::StatsStore).
///
/// `save` always receives the complete mapping and overwrites whatever was
/// stored before.
pub trait StatsBackend: Send + Sync + std::fmt::Debug {
    /// Reads the stored mapping.
    fn load(&self) -> Result<StatsSnapshot, StatsError>;

    /// Replaces the stored mapping.
    fn save(&self, snapshot: &StatsSnapshot) -> Result<(), StatsError>;
}

/// Pretty-printed JSON object at a fixed path, shared with the dashboard.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    /// Creates a backend for the given file. The file need not exist yet.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the stats file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StatsBackend for JsonFileBackend {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    fn load(&self) -> Result<StatsSnapshot, StatsError> {
        if !self.path.exists() {
            info!("No stats file yet, starting empty");
            return Ok(StatsSnapshot::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        let snapshot: StatsSnapshot = serde_json::from_str(&content)?;
        info!(players = snapshot.len(), "Stats loaded");
        Ok(snapshot)
    }

    #[instrument(skip(self, snapshot), fields(path = %self.path.display(), players = snapshot.len()))]
    fn save(&self, snapshot: &StatsSnapshot) -> Result<(), StatsError> {
        let json = serde_json::to_string_pretty(snapshot)?;

        // Readers never observe a half-written file.
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        std::fs::write(&tmp, json)?;
        std::fs::rename(&tmp, &self.path)?;

        debug!("Stats saved");
        Ok(())
    }
}

/// Keeps saved snapshots in memory. Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    saved: Arc<Mutex<Vec<StatsSnapshot>>>,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of times `save` was called.
    pub fn save_count(&self) -> usize {
        self.saved.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Most recently saved snapshot.
    pub fn last_saved(&self) -> Option<StatsSnapshot> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl StatsBackend for MemoryBackend {
    fn load(&self) -> Result<StatsSnapshot, StatsError> {
        Ok(self.last_saved().unwrap_or_default())
    }

    fn save(&self, snapshot: &StatsSnapshot) -> Result<(), StatsError> {
        self.saved
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(snapshot.clone());
        Ok(())
    }
}
