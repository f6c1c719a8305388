//! Middleware Module
//!
//! The caching middleware and the pieces it is built from.

mod cache;
mod recorder;
mod stats;

// Re-export public types
pub use cache::{cache_response, ResponseCache, X_CACHE};
pub use recorder::ResponseRecorder;
pub use stats::{CacheStats, StatsSnapshot};
