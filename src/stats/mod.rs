//! Per-player win/loss/draw counters with write-through persistence.

mod backend;
mod error;
mod record;
mod store;

pub use backend::{JsonFileBackend, MemoryBackend, StatsBackend, StatsSnapshot};
pub use error::StatsError;
pub use record::StatsRecord;
pub use store::StatsStore;
