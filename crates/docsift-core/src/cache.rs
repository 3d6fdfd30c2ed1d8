//! Token cache capability and its backends.
//!
//! The cache is the only component that enforces token expiry: an entry
//! that can still be read is treated as valid by its consumers, so a
//! backend must evict at exactly the TTL it was given.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::error::DocResult;

/// Key-value store with per-key expiry.
///
/// Absent and expired keys read as `Ok(None)`; `Err` is reserved for the
/// backend itself being unreachable.
#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Read a key.
    async fn get(&self, key: &str) -> DocResult<Option<String>>;

    /// Store a key for `ttl_secs` seconds.
    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> DocResult<()>;
}

/// In-process cache with `Instant` deadlines.
///
/// A TTL too large to represent as an `Instant` never expires.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, (String, Option<Instant>)>>,
}

fn is_live(deadline: &Option<Instant>, now: Instant) -> bool {
    deadline.map_or(true, |d| d > now)
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries that have not yet expired.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|(_, deadline)| is_live(deadline, now))
            .count()
    }

    /// Check if no live entries remain.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl TokenCache for MemoryCache {
    async fn get(&self, key: &str) -> DocResult<Option<String>> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, deadline)) if is_live(deadline, now) => {
                    return Ok(Some(value.clone()))
                }
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired: drop it so the map does not grow without bound.
        let mut entries = self.entries.write().await;
        if matches!(entries.get(key), Some((_, deadline)) if !is_live(deadline, now)) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> DocResult<()> {
        let deadline = Instant::now().checked_add(Duration::from_secs(ttl_secs));
        self.entries
            .write()
            .await
            .insert(key.to_string(), (value.to_string(), deadline));
        Ok(())
    }
}

#[cfg(feature = "redis")]
pub use self::redis_cache::RedisCache;

#[cfg(feature = "redis")]
mod redis_cache {
    use async_trait::async_trait;
    use redis::aio::MultiplexedConnection;
    use redis::Client;

    use super::TokenCache;
    use crate::error::{DocError, DocResult};

    /// Redis-backed cache using `SET key value EX ttl`.
    pub struct RedisCache {
        connection: MultiplexedConnection,
    }

    impl RedisCache {
        /// Connect to a Redis server, e.g. `redis://localhost:6379`.
        pub async fn connect(url: &str) -> DocResult<Self> {
            let client = Client::open(url).map_err(|e| DocError::Cache {
                message: format!("Failed to create Redis client: {}", e),
                code: crate::error::ErrorCode::CacheReadFailed,
                source: Some(Box::new(e)),
            })?;

            let connection = client
                .get_multiplexed_async_connection()
                .await
                .map_err(|e| DocError::cache_read(format!("Failed to connect to Redis: {}", e)))?;

            Ok(Self { connection })
        }
    }

    #[async_trait]
    impl TokenCache for RedisCache {
        async fn get(&self, key: &str) -> DocResult<Option<String>> {
            let mut conn = self.connection.clone();
            redis::cmd("GET")
                .arg(key)
                .query_async::<_, Option<String>>(&mut conn)
                .await
                .map_err(|e| DocError::cache_read(format!("GET {} failed: {}", key, e)))
        }

        async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> DocResult<()> {
            let mut conn = self.connection.clone();
            // Redis rejects EX 0; a zero TTL means the value is already stale.
            if ttl_secs == 0 {
                return redis::cmd("DEL")
                    .arg(key)
                    .query_async::<_, ()>(&mut conn)
                    .await
                    .map_err(|e| DocError::cache_write(format!("DEL {} failed: {}", key, e)));
            }
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("EX")
                .arg(ttl_secs)
                .query_async::<_, ()>(&mut conn)
                .await
                .map_err(|e| DocError::cache_write(format!("SET {} failed: {}", key, e)))
        }
    }
}
