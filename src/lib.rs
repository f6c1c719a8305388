//! Response Cache - HTTP response caching middleware for axum
//!
//! Fingerprints requests from configurable rules and serves stored response
//! bodies from an expiring store (in-memory, filesystem or Redis).

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod policy;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{CacheError, Result};
pub use middleware::{cache_response, ResponseCache};
pub use policy::{BypassRule, CacheKey, CachePolicy, KeyRule, Rule};
pub use store::{ExpiringStore, FilesystemStore, MemoryStore, RedisStore};
