//! Redis Store Module
//!
//! Pass-through adapter to a remote Redis-compatible service. Expiry is
//! delegated to the service (`SET ... PX`), so there is no local sweep.

use std::future::Future;
use std::io;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::MultiplexedConnection;
use tokio::sync::OnceCell;

use crate::error::{CacheError, Result};
use crate::store::ExpiringStore;

// == Redis Config ==
/// Connection settings for [`RedisStore`].
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// `host:port` of the service
    pub endpoint: String,
    /// Empty for no ACL user
    pub username: String,
    /// Empty for no password
    pub password: String,
    /// Logical database index
    pub database: i64,
    /// Upper bound on connecting and on each command round trip
    pub timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            endpoint: "127.0.0.1:6379".to_string(),
            username: String::new(),
            password: String::new(),
            database: 0,
            timeout: Duration::from_secs(1),
        }
    }
}

impl RedisConfig {
    /// Renders the settings as a `redis://` connection URL.
    pub fn url(&self) -> String {
        let credentials = match (self.username.is_empty(), self.password.is_empty()) {
            (true, true) => String::new(),
            (false, true) => format!("{}@", self.username),
            (_, false) => format!("{}:{}@", self.username, self.password),
        };
        format!("redis://{}{}/{}", credentials, self.endpoint, self.database)
    }
}

// == Redis Store ==
/// Expiring store backed by a remote Redis service.
pub struct RedisStore {
    client: redis::Client,
    connection: OnceCell<MultiplexedConnection>,
    ttl: Duration,
    timeout: Duration,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("ttl", &self.ttl)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl RedisStore {
    // == Constructor ==
    /// Creates a store for the given service. No connection is made until the
    /// first operation.
    ///
    /// # Errors
    /// Fails if the settings do not form a valid connection URL.
    pub fn new(config: &RedisConfig, ttl: Duration) -> Result<Self> {
        let client = redis::Client::open(config.url())?;
        Ok(Self {
            client,
            connection: OnceCell::new(),
            ttl,
            timeout: config.timeout,
        })
    }

    /// Entry time-to-live, as passed to the service.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// TTL in milliseconds; the service rejects a zero expiry.
    fn ttl_millis(&self) -> u64 {
        (self.ttl.as_millis() as u64).max(1)
    }

    /// Runs `operation`, failing with a remote fault once the timeout passes.
    async fn bounded<T, F>(&self, operation: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.timeout, operation).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(CacheError::Remote(
                io::Error::new(io::ErrorKind::TimedOut, "redis operation timed out").into(),
            )),
        }
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        let connection = self
            .connection
            .get_or_try_init(|| self.bounded(self.client.get_multiplexed_async_connection()))
            .await?;
        Ok(connection.clone())
    }
}

#[async_trait]
impl ExpiringStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Bytes> {
        let mut connection = self.connection().await?;
        let value: Option<Vec<u8>> = self
            .bounded(redis::cmd("GET").arg(key).query_async(&mut connection))
            .await?;

        value
            .map(Bytes::from)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    async fn set(&self, key: &str, value: Bytes) -> Result<()> {
        let mut connection = self.connection().await?;
        let mut command = redis::cmd("SET");
        command
            .arg(key)
            .arg(value.as_ref())
            .arg("PX")
            .arg(self.ttl_millis());
        self.bounded(command.query_async::<_, ()>(&mut connection))
            .await
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
