//! Polling loop configuration

use crate::transform::DEFAULT_TOP_N;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How often and how much to fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between refreshes (after the immediate first fetch)
    pub interval_seconds: u64,
    /// Features shown on the drift chart
    pub top_n: usize,
    /// Re-sort feeds client-side instead of trusting the service ordering
    pub defensive_sort: bool,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 15,
            top_n: DEFAULT_TOP_N,
            defensive_sort: false,
        }
    }
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }
}
