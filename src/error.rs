//! Error types for the response cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for stores and configuration.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key absent or expired. Drives the hit/miss branch, not exceptional.
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Key cannot be used as a storage name
    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    /// Filesystem read/write failure
    #[error("I/O failure for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    /// Remote key/value service failure
    #[error("Remote store error: {0}")]
    Remote(#[from] redis::RedisError),

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl CacheError {
    /// Wraps an I/O error with the key it occurred on.
    pub fn io(key: impl Into<String>, source: std::io::Error) -> Self {
        CacheError::Io {
            key: key.into(),
            source,
        }
    }

    /// Returns true for the expected "no valid entry" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }
}

// == Result Type Alias ==
/// Convenience Result type for the response cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_not_found() {
        assert!(CacheError::NotFound("abc".to_string()).is_not_found());
        assert!(!CacheError::Config("bad".to_string()).is_not_found());
    }

    #[test]
    fn test_io_error_message_names_key() {
        let err = CacheError::io(
            "deadbeef",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let message = err.to_string();
        assert!(message.contains("deadbeef"));
        assert!(message.contains("gone"));
        assert!(!err.is_not_found());
    }
}
