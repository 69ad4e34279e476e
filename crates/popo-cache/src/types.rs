//! Cache configuration, statistics and snapshots.

use chrono::{DateTime, Utc};
use popo_core::{DataRecord, DateKey};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of dates retained.
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    /// Default deadline for a lookup, including any acquisition it waits on.
    /// `None` waits indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_capacity() -> usize {
    7
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            request_timeout_secs: None,
        }
    }
}

impl CacheConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Lookups that joined an acquisition already in flight.
    pub coalesced: u64,
    pub evictions: u64,
    /// Acquisitions that could not start; nothing was cached.
    pub failed: u64,
    /// Acquisitions abandoned by every waiter before completing.
    pub canceled: u64,
}

/// Point-in-time view of one cached date.
#[derive(Debug, Clone, Serialize)]
pub struct CacheEntrySnapshot {
    pub date: DateKey,
    pub usage_count: u64,
    pub inserted_at: DateTime<Utc>,
    pub last_hit_at: Option<DateTime<Utc>>,
    pub record: DataRecord,
}
