//! Store Module
//!
//! Expiring key/value stores behind a single Get/Set contract.
//!
//! # Variants
//! - [`MemoryStore`]: in-process map
//! - [`FilesystemStore`]: one payload file per key plus an in-memory index
//! - [`RedisStore`]: pass-through to a remote key/value service

mod entry;
mod filesystem;
mod index;
mod memory;
mod remote;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::Result;

// Re-export public types
pub use entry::CacheEntry;
pub use filesystem::FilesystemStore;
pub use memory::MemoryStore;
pub use remote::{RedisConfig, RedisStore};

// == Public Constants ==
/// Lower bound on the sweep interval so a zero TTL cannot spin the sweeper
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(10);

// == Expiring Store ==
/// A key/value store whose entries stop being readable once their TTL elapses.
#[async_trait]
pub trait ExpiringStore: Send + Sync {
    /// Returns the payload for `key` if a live entry exists.
    ///
    /// Fails with [`CacheError::NotFound`](crate::error::CacheError::NotFound)
    /// when the key is absent or expired, even if not yet reclaimed.
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// Stores `value` under `key`, replacing any prior entry.
    async fn set(&self, key: &str, value: Bytes) -> Result<()>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

/// Sweep cadence for a store with the given TTL.
pub(crate) fn sweep_interval(ttl: Duration) -> Duration {
    ttl.max(MIN_SWEEP_INTERVAL)
}
