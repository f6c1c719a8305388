//! Memory Store Module
//!
//! Volatile in-process store: payloads live in the index itself.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;

use crate::error::{CacheError, Result};
use crate::store::index::ExpiringIndex;
use crate::store::{sweep_interval, ExpiringStore};
use crate::tasks::{spawn_sweep_task, Sweep};

// == Memory Store ==
/// In-process expiring store.
///
/// Starts its sweep task on construction, so it must be created inside a
/// Tokio runtime. The task stops when the store is dropped or shut down.
#[derive(Debug)]
pub struct MemoryStore {
    index: Arc<ExpiringIndex<Bytes>>,
    shutdown: CancellationToken,
}

impl MemoryStore {
    // == Constructor ==
    /// Creates a store whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        let index = Arc::new(ExpiringIndex::new(ttl));
        let shutdown = CancellationToken::new();
        spawn_sweep_task(index.clone(), sweep_interval(ttl), shutdown.clone());

        Self { index, shutdown }
    }

    /// Entry time-to-live.
    pub fn ttl(&self) -> Duration {
        self.index.ttl()
    }

    /// Number of entries held, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.index.len().await
    }

    /// Returns true if the store holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Stops the background sweep. Reads and writes keep working.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}

impl Drop for MemoryStore {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[async_trait]
impl ExpiringStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Bytes> {
        self.index
            .lookup(key)
            .await
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<()> {
        self.index.insert(key.to_string(), value).await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl Sweep for ExpiringIndex<Bytes> {
    async fn sweep(&self) -> usize {
        self.reclaim_expired().await.len()
    }
}
