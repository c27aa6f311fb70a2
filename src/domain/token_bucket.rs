//! Token-bucket arithmetic of the admission gate.
//!
//! The Redis limiter runs the same steps inside a server-side script; the
//! process-local limiter runs them through [`check_and_consume`]. Both must stay
//! in lockstep, so any change here has to be mirrored in
//! `infrastructure::rate_limit::redis_limiter`.

use std::time::Duration;

/// Rate limiter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum tokens in a bucket.
    pub capacity: u64,
    /// Tokens added per elapsed refill period.
    pub refill_rate: u64,
    /// How often tokens are added.
    pub refill_period: Duration,
    /// Namespace prepended to every bucket key.
    pub key_prefix: String,
}

impl Default for RateLimitConfig {
    /// Burst of 10, sustained 40 requests per second.
    fn default() -> Self {
        Self {
            capacity: 10,
            refill_rate: 40,
            refill_period: Duration::from_secs(1),
            key_prefix: "ratelimit:".to_string(),
        }
    }
}

impl RateLimitConfig {
    /// Refill period in whole milliseconds, never zero.
    pub fn refill_period_ms(&self) -> u64 {
        (self.refill_period.as_millis() as u64).max(1)
    }

    /// Idle lifetime of a bucket key.
    pub fn idle_ttl(&self) -> Duration {
        Duration::from_millis(self.refill_period_ms().saturating_mul(2))
    }

    /// Full storage key for a caller key.
    pub fn bucket_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

/// Persisted state of a single bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBucket {
    pub tokens: u64,
    /// Milliseconds on the limiter's clock at which the last whole period ended.
    pub last_refill_ms: u64,
}

impl TokenBucket {
    /// A bucket seen for the first time starts full.
    pub fn full(capacity: u64, now_ms: u64) -> Self {
        Self {
            tokens: capacity,
            last_refill_ms: now_ms,
        }
    }

    /// Adds tokens for every whole period elapsed since `last_refill_ms`.
    ///
    /// `last_refill_ms` advances by whole periods only, so partial progress
    /// toward the next period is kept.
    pub fn refill(&mut self, now_ms: u64, config: &RateLimitConfig) {
        let period = config.refill_period_ms();
        let elapsed = now_ms.saturating_sub(self.last_refill_ms);
        let periods = elapsed / period;

        if periods > 0 {
            self.tokens = self
                .tokens
                .saturating_add(periods.saturating_mul(config.refill_rate))
                .min(config.capacity);
            self.last_refill_ms += periods * period;
        }
    }

    /// Consumes one token if any is left.
    pub fn try_take(&mut self) -> bool {
        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }
}

/// Runs one admission check: lazy init, refill, consume.
///
/// Returns the state to persist and whether the request is admitted.
pub fn check_and_consume(
    state: Option<TokenBucket>,
    now_ms: u64,
    config: &RateLimitConfig,
) -> (TokenBucket, bool) {
    let mut bucket = state.unwrap_or_else(|| TokenBucket::full(config.capacity, now_ms));
    bucket.refill(now_ms, config);
    let allowed = bucket.try_take();
    (bucket, allowed)
}
