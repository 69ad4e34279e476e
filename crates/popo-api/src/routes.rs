//! API route definitions.

use axum::{Router, routing::get};
use std::sync::Arc;

use crate::handlers::{cache, daily, health};
use crate::state::AppState;

/// Create the main API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/daily", get(daily::missing_date))
        .route("/daily/", get(daily::missing_date))
        .route("/daily/{*path}", get(daily::get_daily))
        .route("/cache", get(cache::get_cache))
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .with_state(state)
}
