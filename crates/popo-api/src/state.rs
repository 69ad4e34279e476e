//! Application state shared across handlers.

use popo_cache::DateCache;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: DateCache,
}

impl AppState {
    pub fn new(cache: DateCache) -> Self {
        Self { cache }
    }
}
