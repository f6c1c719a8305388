//! Cache Entry Module
//!
//! Defines the structure for individual store entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A stored value plus its creation time. Never mutated after creation.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored value (payload bytes or the path of the payload file)
    pub value: T,
    /// Creation timestamp
    pub created_at: Instant,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry stamped with the current time.
    pub fn new(value: T) -> Self {
        Self {
            value,
            created_at: Instant::now(),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has outlived `ttl`.
    ///
    /// An entry aged exactly `ttl` is still live; it expires once its age
    /// strictly exceeds `ttl`.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.age() > ttl
    }

    /// Time elapsed since the entry was created.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("payload");

        assert_eq!(entry.value, "payload");
        assert!(!entry.is_expired(Duration::from_secs(60)));
    }

    #[test]
    fn test_entry_expiration() {
        let entry = CacheEntry::new(());

        assert!(!entry.is_expired(Duration::from_millis(100)));

        sleep(Duration::from_millis(150));

        assert!(entry.is_expired(Duration::from_millis(100)));
    }

    #[test]
    fn test_zero_ttl_expires_immediately() {
        let entry = CacheEntry::new(());
        sleep(Duration::from_millis(1));

        assert!(entry.is_expired(Duration::ZERO));
    }

    #[test]
    fn test_age_grows() {
        let entry = CacheEntry::new(());
        sleep(Duration::from_millis(20));

        assert!(entry.age() >= Duration::from_millis(20));
    }
}
