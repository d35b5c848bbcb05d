use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use shortlinks_core::cache::{LinkCache, Result};
use shortlinks_core::{CacheError, ShortId};
use std::time::Duration;
use tracing::{debug, trace, warn};

const DEFAULT_KEY_PREFIX: &str = "sl:link:";

/// Redis [`LinkCache`].
///
/// Target URLs are stored as plain strings under `{prefix}{short_id}`. With
/// a TTL set, every write refreshes the key's expiry.
#[derive(Debug, Clone)]
pub struct RedisLinkCache {
    conn: MultiplexedConnection,
    key_prefix: String,
    ttl: Option<Duration>,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        CacheError::Timeout(message)
    } else if err.is_io_error() || err.is_connection_dropped() || err.is_connection_refusal() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

impl RedisLinkCache {
    /// Creates a Redis cache storing keys under `sl:link:`.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection, cloned per command
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self::with_prefix(conn, DEFAULT_KEY_PREFIX)
    }

    /// Creates a Redis cache with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Prepended to every short id (e.g. `"myapp:link:"`)
    pub fn with_prefix(conn: MultiplexedConnection, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
            ttl: None,
        }
    }

    /// Expire cached links `ttl` after they were last written.
    ///
    /// Redis expiries have second granularity; anything shorter than a
    /// second is rounded up to one.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Opens a multiplexed connection and builds a cache on it.
    ///
    /// # Arguments
    ///
    /// * `redis_url` - Connection URL, e.g. `redis://127.0.0.1:6379`
    /// * `key_prefix` - Prepended to every short id
    ///
    /// # Errors
    ///
    /// [`CacheError::Initialization`] for a malformed URL, otherwise the
    /// mapped connection error.
    pub async fn connect(redis_url: &str, key_prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| CacheError::Initialization(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        Ok(Self::with_prefix(conn, key_prefix))
    }

    fn cache_key(&self, short_id: &ShortId) -> String {
        format!("{}{}", self.key_prefix, short_id.as_str())
    }
}

#[async_trait]
impl LinkCache for RedisLinkCache {
    fn name(&self) -> &str {
        "redis"
    }

    async fn init(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING")
            .query_async::<String>(&mut conn)
            .await
            .map_err(|e| map_redis_error("failed to ping Redis", e))?;
        debug!(prefix = %self.key_prefix, "Redis cache ready");
        Ok(())
    }

    async fn get(&self, short_id: &ShortId) -> Result<Option<String>> {
        let key = self.cache_key(short_id);

        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(target_url)) => {
                debug!(short_id = %short_id, "Cache hit in Redis");
                Ok(Some(target_url))
            }
            Ok(None) => {
                trace!(short_id = %short_id, "Cache miss in Redis");
                Ok(None)
            }
            Err(e) => {
                warn!(short_id = %short_id, error = %e, "Redis error on get");
                Err(map_redis_error("failed to fetch value from Redis", e))
            }
        }
    }

    async fn set(&self, short_id: &ShortId, target_url: &str) -> Result<()> {
        let key = self.cache_key(short_id);

        let mut conn = self.conn.clone();
        let result = match self.ttl {
            Some(ttl) => {
                let seconds = ttl.as_secs().max(1);
                conn.set_ex::<_, _, ()>(&key, target_url, seconds).await
            }
            None => conn.set::<_, _, ()>(&key, target_url).await,
        };

        match result {
            Ok(()) => {
                trace!(short_id = %short_id, "Cached link in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(short_id = %short_id, error = %e, "Failed to cache link in Redis");
                Err(map_redis_error("failed to write value to Redis", e))
            }
        }
    }
}
