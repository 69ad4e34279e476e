//! The per-date bulletin cache.

use crate::types::{CacheConfig, CacheEntrySnapshot, CacheStats};
use chrono::{DateTime, NaiveDate, Utc};
use futures::future::{BoxFuture, FutureExt, Shared};
use popo_core::ports::{BulletinSource, Clock};
use popo_core::{DataRecord, DateKey, Error, FieldName, FieldValue, Result};
use popo_trace::cache_span;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{Instrument, debug, info, warn};

/// An acquisition shared by every lookup waiting on the same date.
/// Resolves to `None` when the source could not produce a record.
type Acquisition = Shared<BoxFuture<'static, Option<Arc<DataRecord>>>>;

struct Entry {
    record: Arc<DataRecord>,
    usage_count: u64,
    inserted_at: DateTime<Utc>,
    last_hit_at: Option<DateTime<Utc>>,
    seq: u64,
}

struct InFlight {
    id: u64,
    acquisition: Acquisition,
    waiters: usize,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<DateKey, Entry>,
    in_flight: HashMap<DateKey, InFlight>,
    next_seq: u64,
    next_flight: u64,
    stats: CacheStats,
}

impl CacheState {
    fn insert(&mut self, key: DateKey, record: Arc<DataRecord>, now: DateTime<Utc>, capacity: usize) {
        if !self.entries.contains_key(&key) && self.entries.len() >= capacity {
            self.evict_one();
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            key,
            Entry {
                record,
                usage_count: 0,
                inserted_at: now,
                last_hit_at: None,
                seq,
            },
        );
    }

    /// Remove the least used entry, oldest first among equals.
    fn evict_one(&mut self) {
        let victim = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| (entry.usage_count, entry.seq))
            .map(|(key, _)| *key);

        if let Some(key) = victim {
            if let Some(entry) = self.entries.remove(&key) {
                debug!(date = %key, usage_count = entry.usage_count, "Evicted cache entry");
            }
            self.stats.evictions += 1;
        }
    }
}

struct Inner {
    source: Arc<dyn BulletinSource>,
    clock: Arc<dyn Clock>,
    capacity: usize,
    request_timeout: Option<Duration>,
    state: Mutex<CacheState>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Bounded cache from calendar date to bulletin record.
///
/// Cloning is cheap; clones share the same entries.
#[derive(Clone)]
pub struct DateCache {
    inner: Arc<Inner>,
}

impl DateCache {
    pub fn new(source: Arc<dyn BulletinSource>, clock: Arc<dyn Clock>, config: CacheConfig) -> Self {
        if config.capacity == 0 {
            warn!("Cache capacity of 0 requested, using 1");
        }
        Self {
            inner: Arc::new(Inner {
                source,
                clock,
                capacity: config.capacity.max(1),
                request_timeout: config.request_timeout(),
                state: Mutex::new(CacheState::default()),
            }),
        }
    }

    /// Look up the record for `date`, acquiring it on a miss.
    ///
    /// `Ok(None)` means no record could be acquired. Bounded by the configured
    /// request timeout, if any.
    pub async fn get(&self, date: impl Into<DateKey>) -> Result<Option<Arc<DataRecord>>> {
        let deadline = self.inner.request_timeout.map(|timeout| Instant::now() + timeout);
        self.lookup(date.into(), deadline).await
    }

    /// Like [`get`](Self::get) with an explicit deadline.
    pub async fn get_with_deadline(
        &self,
        date: impl Into<DateKey>,
        deadline: Instant,
    ) -> Result<Option<Arc<DataRecord>>> {
        self.lookup(date.into(), Some(deadline)).await
    }

    /// Look up a single field of the record for `date`.
    pub async fn get_field(
        &self,
        date: impl Into<DateKey>,
        field: FieldName,
    ) -> Result<Option<FieldValue>> {
        Ok(self
            .get(date)
            .await?
            .map(|record| record.field(field).clone()))
    }

    async fn lookup(&self, key: DateKey, deadline: Option<Instant>) -> Result<Option<Arc<DataRecord>>> {
        let span = cache_span("get", &key.to_string());
        let (id, acquisition) = {
            let _enter = span.enter();
            let now = self.inner.clock.now();
            let mut guard = self.inner.lock();
            let state = &mut *guard;

            if let Some(entry) = state.entries.get_mut(&key) {
                entry.usage_count += 1;
                entry.last_hit_at = Some(now);
                state.stats.hits += 1;
                debug!(usage_count = entry.usage_count, "Cache hit");
                return Ok(Some(entry.record.clone()));
            }

            match state.in_flight.get_mut(&key) {
                Some(flight) => {
                    flight.waiters += 1;
                    state.stats.coalesced += 1;
                    debug!(waiters = flight.waiters, "Joined acquisition in flight");
                    (flight.id, flight.acquisition.clone())
                }
                None => {
                    let id = state.next_flight;
                    state.next_flight += 1;
                    state.stats.misses += 1;
                    let acquisition = acquire(self.inner.clone(), key, id);
                    state.in_flight.insert(
                        key,
                        InFlight {
                            id,
                            acquisition: acquisition.clone(),
                            waiters: 1,
                        },
                    );
                    debug!("Cache miss, acquiring");
                    (id, acquisition)
                }
            }
        };

        let _waiter = Waiter {
            inner: self.inner.clone(),
            key,
            id,
        };

        match deadline {
            None => Ok(acquisition.await),
            Some(deadline) => match tokio::time::timeout_at(deadline, acquisition).await {
                Ok(record) => Ok(record),
                Err(_) => {
                    warn!(date = %key, "Deadline exceeded waiting for bulletin");
                    Err(Error::DeadlineExceeded { date: key.date() })
                }
            },
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    pub fn contains(&self, date: impl Into<DateKey>) -> bool {
        self.inner.lock().entries.contains_key(&date.into())
    }

    /// Hits recorded against `date` since it was inserted.
    pub fn usage_count(&self, date: impl Into<DateKey>) -> Option<u64> {
        self.inner
            .lock()
            .entries
            .get(&date.into())
            .map(|entry| entry.usage_count)
    }

    /// Snapshot of every cached date, in date order.
    pub fn entries(&self) -> Vec<CacheEntrySnapshot> {
        let state = self.inner.lock();
        let mut snapshots: Vec<_> = state
            .entries
            .iter()
            .map(|(key, entry)| CacheEntrySnapshot {
                date: *key,
                usage_count: entry.usage_count,
                inserted_at: entry.inserted_at,
                last_hit_at: entry.last_hit_at,
                record: DataRecord::clone(&entry.record),
            })
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.date);
        snapshots
    }

    pub fn stats(&self) -> CacheStats {
        self.inner.lock().stats.clone()
    }

    /// Number of acquisitions currently running.
    pub fn in_flight(&self) -> usize {
        self.inner.lock().in_flight.len()
    }
}

/// Build the shared acquisition for `key`. It publishes its own result so
/// that the record lands in the cache exactly once, whichever waiter polls it
/// to completion.
fn acquire(inner: Arc<Inner>, key: DateKey, id: u64) -> Acquisition {
    let date: NaiveDate = key.date();
    async move {
        let outcome = inner.source.fetch(date).await;
        let now = inner.clock.now();

        let mut guard = inner.lock();
        let state = &mut *guard;
        match state.in_flight.get(&key) {
            Some(flight) if flight.id == id => {
                state.in_flight.remove(&key);
            }
            _ => return None,
        }

        match outcome {
            Ok(record) => {
                let record = Arc::new(record);
                state.insert(key, record.clone(), now, inner.capacity);
                info!(
                    resolved = record.resolved_count(),
                    cached = state.entries.len(),
                    "Cached bulletin"
                );
                Some(record)
            }
            Err(e) => {
                state.stats.failed += 1;
                warn!(error = %e, "Bulletin acquisition failed");
                None
            }
        }
    }
    .instrument(cache_span("acquire", &key.to_string()))
    .boxed()
    .shared()
}

/// Registration of one lookup waiting on an acquisition. When the last
/// waiter leaves before completion the acquisition is dropped, which
/// releases whatever it holds and publishes nothing.
struct Waiter {
    inner: Arc<Inner>,
    key: DateKey,
    id: u64,
}

impl Drop for Waiter {
    fn drop(&mut self) {
        let abandoned = {
            let mut guard = self.inner.lock();
            let state = &mut *guard;
            let last = match state.in_flight.get_mut(&self.key) {
                Some(flight) if flight.id == self.id => {
                    flight.waiters = flight.waiters.saturating_sub(1);
                    flight.waiters == 0
                }
                _ => false,
            };
            if last {
                state.stats.canceled += 1;
                state.in_flight.remove(&self.key)
            } else {
                None
            }
        };

        if abandoned.is_some() {
            debug!(date = %self.key, "Acquisition abandoned by all waiters");
        }
        // Dropped here, outside the lock.
        drop(abandoned);
    }
}
