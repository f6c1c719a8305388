//! API Routes
//!
//! Configures the demo Axum router.

use axum::{
    middleware,
    routing::{any, get},
    Router,
};
use tower_http::trace::TraceLayer;

use super::handlers::{counter_handler, stats_handler, AppState};
use crate::middleware::cache_response;

/// Creates the demo router.
///
/// # Endpoints
/// - `ANY /` and `ANY /counter/*path` - Counting upstream behind the cache
/// - `GET /stats` - Cache statistics, never cached
///
/// # Middleware
/// - Response cache on the counting routes only
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", any(counter_handler))
        .route("/counter/*path", any(counter_handler))
        .route_layer(middleware::from_fn_with_state(
            state.cache.clone(),
            cache_response,
        ))
        .route("/stats", get(stats_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
