//! Expiring Index Module
//!
//! Key to entry map behind a reader/writer lock, shared by the local stores.
//! Liveness is decided here; the stores decide what the entry value means.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::store::CacheEntry;

pub(crate) type Entries<T> = HashMap<String, CacheEntry<T>>;

// == Expiring Index ==
#[derive(Debug)]
pub(crate) struct ExpiringIndex<T> {
    entries: RwLock<Entries<T>>,
    ttl: Duration,
}

impl<T: Clone> ExpiringIndex<T> {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub(crate) fn ttl(&self) -> Duration {
        self.ttl
    }

    // == Lookup ==
    /// Returns the value for `key` only while it is live.
    pub(crate) async fn lookup(&self, key: &str) -> Option<T> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| !entry.is_expired(self.ttl))
            .map(|entry| entry.value.clone())
    }

    // == Insert ==
    /// Replaces any prior entry for `key` with a fresh one.
    pub(crate) async fn insert(&self, key: String, value: T) {
        self.entries.write().await.insert(key, CacheEntry::new(value));
    }

    /// Shared access for callers that must do work while the entry is pinned.
    pub(crate) async fn read(&self) -> RwLockReadGuard<'_, Entries<T>> {
        self.entries.read().await
    }

    /// Exclusive access for callers that must do work before inserting.
    pub(crate) async fn write(&self) -> RwLockWriteGuard<'_, Entries<T>> {
        self.entries.write().await
    }

    // == Two-Phase Reclaim ==
    /// Collects expired keys under the read lock, then removes them under the
    /// write lock. Expiry is re-checked before removal so an entry overwritten
    /// between the two phases survives.
    ///
    /// Returns the removed entries' values.
    pub(crate) async fn reclaim_expired(&self) -> Vec<(String, T)> {
        let candidates: Vec<String> = {
            let entries = self.entries.read().await;
            entries
                .iter()
                .filter(|(_, entry)| entry.is_expired(self.ttl))
                .map(|(key, _)| key.clone())
                .collect()
        };

        if candidates.is_empty() {
            return Vec::new();
        }

        let mut entries = self.entries.write().await;
        candidates
            .into_iter()
            .filter_map(|key| {
                let expired = entries
                    .get(&key)
                    .map(|entry| entry.is_expired(self.ttl))
                    .unwrap_or(false);
                if expired {
                    entries.remove(&key).map(|entry| (key, entry.value))
                } else {
                    None
                }
            })
            .collect()
    }

    /// Number of physically present entries, expired or not.
    pub(crate) async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub(crate) async fn contains(&self, key: &str) -> bool {
        self.entries.read().await.contains_key(key)
    }
}
