//! Cache inspection handler.

use axum::{Json, extract::State};
use chrono::{DateTime, Utc};
use popo_cache::{CacheEntrySnapshot, CacheStats};
use popo_core::{DataRecord, DateKey};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Serialize)]
pub struct CacheResponse {
    pub capacity: usize,
    pub len: usize,
    pub in_flight: usize,
    pub stats: CacheStats,
    pub entries: Vec<CachedDate>,
}

/// One cached date as shown to callers. Usage counts stay internal.
#[derive(Serialize)]
pub struct CachedDate {
    pub date: DateKey,
    pub inserted_at: DateTime<Utc>,
    pub last_hit_at: Option<DateTime<Utc>>,
    pub record: DataRecord,
}

impl From<CacheEntrySnapshot> for CachedDate {
    fn from(snapshot: CacheEntrySnapshot) -> Self {
        Self {
            date: snapshot.date,
            inserted_at: snapshot.inserted_at,
            last_hit_at: snapshot.last_hit_at,
            record: snapshot.record,
        }
    }
}

pub async fn get_cache(State(state): State<Arc<AppState>>) -> Json<CacheResponse> {
    let cache = &state.cache;
    let entries: Vec<CachedDate> = cache.entries().into_iter().map(CachedDate::from).collect();
    Json(CacheResponse {
        capacity: cache.capacity(),
        len: entries.len(),
        in_flight: cache.in_flight(),
        stats: cache.stats(),
        entries,
    })
}
