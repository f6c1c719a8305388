//! API Handlers
//!
//! Handlers for the demo server: a counting upstream that the cache sits in
//! front of, and an uncached statistics endpoint.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{extract::State, Json};

use crate::middleware::{ResponseCache, StatsSnapshot};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Caching middleware state
    pub cache: ResponseCache,
    /// Number of times the upstream handler actually ran
    pub upstream_calls: Arc<AtomicU64>,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: ResponseCache) -> Self {
        Self {
            cache,
            upstream_calls: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Upstream handler for every cached route.
///
/// Returns how many times it has run, so a repeated value means the response
/// came from the cache.
pub async fn counter_handler(State(state): State<AppState>) -> String {
    let calls = state.upstream_calls.fetch_add(1, Ordering::SeqCst) + 1;
    calls.to_string()
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsSnapshot> {
    Json(state.cache.stats().snapshot())
}
