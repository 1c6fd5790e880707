//! Counters for one player.

use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Cumulative results for one identity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct StatsRecord {
    #[serde(default)]
    wins: u64,
    #[serde(default)]
    losses: u64,
    #[serde(default)]
    draws: u64,
}

impl StatsRecord {
    /// Creates a record with the given counters.
    pub fn new(wins: u64, losses: u64, draws: u64) -> Self {
        Self {
            wins,
            losses,
            draws,
        }
    }

    /// Total games recorded.
    pub fn total(&self) -> u64 {
        self.wins + self.losses + self.draws
    }

    pub(super) fn add_win(&mut self) {
        self.wins += 1;
    }

    pub(super) fn add_loss(&mut self) {
        self.losses += 1;
    }

    pub(super) fn add_draw(&mut self) {
        self.draws += 1;
    }
}

/// Formats as the `STATS` payload: `<wins> <losses> <draws>`.
impl fmt::Display for StatsRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.wins, self.losses, self.draws)
    }
}
