//! Filesystem Store Module
//!
//! Writes each payload to `base_path/key` and tracks liveness in an
//! in-memory index. The index is the source of truth; files are inert.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::{CacheError, Result};
use crate::store::index::ExpiringIndex;
use crate::store::{sweep_interval, CacheEntry, ExpiringStore};
use crate::tasks::{spawn_sweep_task, Sweep};

// == Filesystem Store ==
/// Filesystem-backed expiring store.
///
/// The base directory must exist and must not be shared with another store.
/// Files orphaned by a crash between index removal and file deletion are
/// never reconciled.
#[derive(Debug)]
pub struct FilesystemStore {
    base_path: PathBuf,
    index: Arc<ExpiringIndex<PathBuf>>,
    shutdown: CancellationToken,
}

impl FilesystemStore {
    // == Constructor ==
    /// Creates a store rooted at `base_path` whose entries live for `ttl`.
    ///
    /// Must be called inside a Tokio runtime; the sweep task starts here.
    pub fn new(base_path: impl AsRef<Path>, ttl: Duration) -> Self {
        let index = Arc::new(ExpiringIndex::new(ttl));
        let shutdown = CancellationToken::new();
        spawn_sweep_task(index.clone(), sweep_interval(ttl), shutdown.clone());

        Self {
            base_path: base_path.as_ref().to_path_buf(),
            index,
            shutdown,
        }
    }

    /// Directory holding the payload files.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Entry time-to-live.
    pub fn ttl(&self) -> Duration {
        self.index.ttl()
    }

    /// Number of indexed entries, including expired ones not yet swept.
    pub async fn len(&self) -> usize {
        self.index.len().await
    }

    /// Returns true if the index holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Stops the background sweep. Reads and writes keep working.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    // == Path For Key ==
    /// Resolves the payload path, rejecting keys that would escape the base
    /// directory or name it.
    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let unsafe_key = key.is_empty()
            || key == "."
            || key == ".."
            || key.contains(['/', '\\', '\0']);
        if unsafe_key {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        Ok(self.base_path.join(key))
    }
}

impl Drop for FilesystemStore {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[async_trait]
impl ExpiringStore for FilesystemStore {
    async fn get(&self, key: &str) -> Result<Bytes> {
        // Held across the read so an overwrite in `set` cannot interleave
        let entries = self.index.read().await;
        let path = entries
            .get(key)
            .filter(|entry| !entry.is_expired(self.ttl()))
            .map(|entry| &entry.value)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;

        // The index claims the entry is live, so a missing file is a fault
        let content = tokio::fs::read(path)
            .await
            .map_err(|err| CacheError::io(key, err))?;
        Ok(Bytes::from(content))
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<()> {
        let path = self.path_for(key)?;

        // Held across the write so the file and its index entry change together
        let mut entries = self.index.write().await;
        tokio::fs::write(&path, &value)
            .await
            .map_err(|err| CacheError::io(key, err))?;
        entries.insert(key.to_string(), CacheEntry::new(path));

        Ok(())
    }

    fn name(&self) -> &'static str {
        "filesystem"
    }
}

#[async_trait]
impl Sweep for ExpiringIndex<PathBuf> {
    async fn sweep(&self) -> usize {
        let removed = self.reclaim_expired().await;

        // Best effort, outside the lock. A key re-set since removal owns the
        // file again.
        for (key, path) in &removed {
            if self.contains(key).await {
                continue;
            }
            // Known window: a `set` landing between the check above and this
            // delete loses its file, and `get` reports an I/O fault. Accepted;
            // deletion must stay outside the lock.
            if let Err(err) = tokio::fs::remove_file(path).await {
                debug!("Failed to delete payload file for {}: {}", key, err);
            }
        }

        removed.len()
    }
}
