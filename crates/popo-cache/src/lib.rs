//! Bounded per-date cache of bulletin records.
//!
//! A [`DateCache`] answers lookups by calendar date, acquiring missing
//! records through a [`BulletinSource`](popo_core::ports::BulletinSource)
//! and retaining at most `capacity` of them, evicting the least used.

pub mod date_cache;
pub mod types;

pub use date_cache::DateCache;
pub use types::{CacheConfig, CacheEntrySnapshot, CacheStats};
