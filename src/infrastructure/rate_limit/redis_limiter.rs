//! Redis-backed token-bucket rate limiter.

use super::service::{LimiterError, RateLimiter};
use crate::domain::token_bucket::RateLimitConfig;
use async_trait::async_trait;
use redis::{Script, aio::ConnectionManager};
use tracing::debug;

/// Refill-and-consume step executed atomically on the Redis server.
///
/// Mirrors `domain::token_bucket::check_and_consume`. The clock is the server's
/// `TIME`, so instances with skewed clocks still agree on elapsed time.
///
/// KEYS[1] bucket key. ARGV: capacity, refill rate, refill period (ms).
/// Returns 1 when admitted, 0 when rejected.
const TOKEN_BUCKET_SCRIPT: &str = r#"
local key = KEYS[1]
local capacity = tonumber(ARGV[1])
local refill_rate = tonumber(ARGV[2])
local period = tonumber(ARGV[3])

local clock = redis.call('TIME')
local now = tonumber(clock[1]) * 1000 + math.floor(tonumber(clock[2]) / 1000)

local state = redis.call('HMGET', key, 'tokens', 'last_refill')
local tokens = tonumber(state[1])
local last_refill = tonumber(state[2])

if tokens == nil or last_refill == nil then
  tokens = capacity
  last_refill = now
end

local elapsed = now - last_refill
if elapsed > 0 then
  local periods = math.floor(elapsed / period)
  if periods > 0 then
    tokens = math.min(capacity, tokens + periods * refill_rate)
    last_refill = last_refill + periods * period
  end
end

local allowed = 0
if tokens > 0 then
  tokens = tokens - 1
  allowed = 1
end

redis.call('HSET', key, 'tokens', tokens, 'last_refill', last_refill)
redis.call('PEXPIRE', key, period * 2)

return allowed
"#;

/// Distributed rate limiter keeping one hash per bucket in Redis.
///
/// Requires Redis 6.2+ alongside the cache. The script is loaded by hash and
/// re-sent transparently when the server's script cache was flushed.
pub struct RedisRateLimiter {
    client: ConnectionManager,
    script: Script,
    config: RateLimitConfig,
}

impl RedisRateLimiter {
    pub fn new(client: ConnectionManager, config: RateLimitConfig) -> Self {
        Self {
            client,
            script: Script::new(TOKEN_BUCKET_SCRIPT),
            config,
        }
    }
}

#[async_trait]
impl RateLimiter for RedisRateLimiter {
    async fn allow(&self, key: &str) -> Result<bool, LimiterError> {
        let bucket_key = self.config.bucket_key(key);
        let mut conn = self.client.clone();

        let reply: i64 = self
            .script
            .key(&bucket_key)
            .arg(self.config.capacity)
            .arg(self.config.refill_rate)
            .arg(self.config.refill_period_ms())
            .invoke_async(&mut conn)
            .await
            .map_err(|e| LimiterError::Backend(e.to_string()))?;

        debug!(key = %bucket_key, reply, "rate limit script");

        match reply {
            1 => Ok(true),
            0 => Ok(false),
            other => Err(LimiterError::UnexpectedReply(other.to_string())),
        }
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
