//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Eviction policy requested from the Redis server.
///
/// Popular links are read far more often than fresh ones, so least-frequently
/// used entries go first when `maxmemory` is reached.
const EVICTION_POLICY: &str = "allkeys-lfu";

/// Settings of the URL cache namespace.
#[derive(Debug, Clone)]
pub struct RedisCacheConfig {
    /// Sliding TTL applied on every write and every hit.
    pub ttl: Duration,
    /// Namespace prefix, keys are stored as `{prefix}:{code}`.
    pub key_prefix: String,
}

/// Opens a Redis connection manager and validates it with a PING.
///
/// The manager reconnects on its own and is cheap to clone, so a single one is
/// shared by the cache and the rate limiter.
///
/// # Errors
///
/// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
/// be established, or the PING health check fails.
pub async fn connect_manager(redis_url: &str) -> CacheResult<ConnectionManager> {
    let client = Client::open(redis_url).map_err(|e| {
        CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
    })?;

    let manager = ConnectionManager::new(client).await.map_err(|e| {
        CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
    })?;

    let mut test_conn = manager.clone();
    test_conn
        .ping::<()>()
        .await
        .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

    Ok(manager)
}

/// Redis cache implementation for fast URL lookups.
///
/// Uses `GETEX` so a hit and its TTL refresh happen in one round trip
/// (requires Redis 6.2 or newer).
pub struct RedisCache {
    client: ConnectionManager,
    ttl_seconds: u64,
    key_prefix: String,
}

impl RedisCache {
    /// Wraps an established connection and asks the server for LFU eviction.
    ///
    /// The eviction policy is best effort: managed Redis offerings often forbid
    /// `CONFIG SET`, in which case a warning is logged and the cache still works.
    pub async fn new(client: ConnectionManager, config: RedisCacheConfig) -> Self {
        let cache = Self {
            client,
            ttl_seconds: config.ttl.as_secs().max(1),
            key_prefix: config.key_prefix,
        };

        if let Err(e) = cache.apply_eviction_policy().await {
            warn!(
                error = %e,
                "could not set redis maxmemory-policy to {}, ensure it is configured on the server",
                EVICTION_POLICY
            );
        }

        info!(prefix = %cache.key_prefix, ttl_seconds = cache.ttl_seconds, "Redis cache ready");
        cache
    }

    async fn apply_eviction_policy(&self) -> CacheResult<()> {
        let mut conn = self.client.clone();
        redis::cmd("CONFIG")
            .arg("SET")
            .arg("maxmemory-policy")
            .arg(EVICTION_POLICY)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| CacheError::OperationError(e.to_string()))
    }

    /// Constructs the full Redis key with namespace prefix.
    fn build_key(&self, short_code: &str) -> String {
        format!("{}:{}", self.key_prefix, short_code)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        let value = redis::cmd("GETEX")
            .arg(&key)
            .arg("EX")
            .arg(self.ttl_seconds)
            .query_async::<Option<String>>(&mut conn)
            .await
            .map_err(|e| CacheError::OperationError(format!("GETEX {}: {}", key, e)))?;

        match &value {
            Some(_) => debug!(code = %short_code, "Cache HIT"),
            None => debug!(code = %short_code, "Cache MISS"),
        }

        Ok(value)
    }

    async fn set_url(&self, short_code: &str, original_url: &str) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        conn.set_ex::<_, _, ()>(&key, original_url, self.ttl_seconds)
            .await
            .map_err(|e| CacheError::OperationError(format!("SET {}: {}", key, e)))?;

        debug!(
            code = %short_code,
            ttl_seconds = self.ttl_seconds,
            "Cache SET"
        );
        Ok(())
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
