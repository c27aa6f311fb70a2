//! Process-local token-bucket rate limiter.

use super::service::{LimiterError, RateLimiter};
use crate::domain::token_bucket::{RateLimitConfig, TokenBucket, check_and_consume};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::time::Instant;

/// Idle buckets are swept once every this many checks.
const SWEEP_EVERY: u64 = 1024;

#[derive(Debug, Clone, Copy)]
struct Slot {
    bucket: TokenBucket,
    last_seen_ms: u64,
}

/// Rate limiter keeping buckets in this process.
///
/// Used when no shared store is configured. Limits are per instance, so a
/// fleet of N instances admits up to N times the configured budget. Buckets
/// idle for longer than `2 × refill_period` are forgotten and start full again,
/// like expired keys in Redis.
pub struct LocalRateLimiter {
    buckets: DashMap<String, Slot>,
    config: RateLimitConfig,
    epoch: Instant,
    checks: AtomicU64,
}

impl LocalRateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            buckets: DashMap::new(),
            config,
            epoch: Instant::now(),
            checks: AtomicU64::new(0),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn is_idle(&self, slot: &Slot, now_ms: u64) -> bool {
        now_ms.saturating_sub(slot.last_seen_ms) > self.config.idle_ttl().as_millis() as u64
    }

    /// Drops every bucket that would have expired.
    pub fn sweep_idle(&self) {
        let now_ms = self.now_ms();
        self.buckets.retain(|_, slot| !self.is_idle(slot, now_ms));
    }

    /// Number of live buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

#[async_trait]
impl RateLimiter for LocalRateLimiter {
    async fn allow(&self, key: &str) -> Result<bool, LimiterError> {
        if self.checks.fetch_add(1, Ordering::Relaxed) % SWEEP_EVERY == SWEEP_EVERY - 1 {
            self.sweep_idle();
        }

        let now_ms = self.now_ms();
        let bucket_key = self.config.bucket_key(key);

        // The entry guard holds the shard lock, which makes the read-modify-write atomic.
        let allowed = match self.buckets.entry(bucket_key) {
            Entry::Occupied(mut occupied) => {
                let slot = occupied.get_mut();
                let state = (!self.is_idle(slot, now_ms)).then_some(slot.bucket);
                let (bucket, allowed) = check_and_consume(state, now_ms, &self.config);
                *slot = Slot {
                    bucket,
                    last_seen_ms: now_ms,
                };
                allowed
            }
            Entry::Vacant(vacant) => {
                let (bucket, allowed) = check_and_consume(None, now_ms, &self.config);
                vacant.insert(Slot {
                    bucket,
                    last_seen_ms: now_ms,
                });
                allowed
            }
        };

        Ok(allowed)
    }

    fn backend(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn limiter(capacity: u64, refill_rate: u64, period: Duration) -> LocalRateLimiter {
        LocalRateLimiter::new(RateLimitConfig {
            capacity,
            refill_rate,
            refill_period: period,
            key_prefix: "ratelimit:".to_string(),
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_then_reject_then_refill() {
        let limiter = limiter(10, 40, Duration::from_secs(1));

        for _ in 0..10 {
            assert!(limiter.allow("global").await.unwrap());
        }
        assert!(!limiter.allow("global").await.unwrap());

        tokio::time::advance(Duration::from_secs(1)).await;

        let mut admitted = 0;
        for _ in 0..20 {
            if limiter.allow("global").await.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 10);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_refill_within_a_period() {
        let limiter = limiter(2, 1, Duration::from_secs(1));

        assert!(limiter.allow("k").await.unwrap());
        assert!(limiter.allow("k").await.unwrap());
        assert!(!limiter.allow("k").await.unwrap());

        tokio::time::advance(Duration::from_millis(900)).await;
        assert!(!limiter.allow("k").await.unwrap());

        tokio::time::advance(Duration::from_millis(100)).await;
        assert!(limiter.allow("k").await.unwrap());
        assert!(!limiter.allow("k").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_bucket_starts_full() {
        let limiter = limiter(3, 1, Duration::from_secs(1));

        for _ in 0..3 {
            assert!(limiter.allow("k").await.unwrap());
        }
        assert!(!limiter.allow("k").await.unwrap());

        tokio::time::advance(Duration::from_millis(2_500)).await;

        for _ in 0..3 {
            assert!(limiter.allow("k").await.unwrap());
        }
        assert!(!limiter.allow("k").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_drops_idle_buckets() {
        let limiter = limiter(3, 1, Duration::from_secs(1));
        limiter.allow("a").await.unwrap();
        limiter.allow("b").await.unwrap();
        assert_eq!(limiter.bucket_count(), 2);

        tokio::time::advance(Duration::from_secs(3)).await;
        limiter.allow("c").await.unwrap();
        limiter.sweep_idle();

        assert_eq!(limiter.bucket_count(), 1);
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let limiter = limiter(1, 1, Duration::from_secs(60));

        assert!(limiter.allow("10.0.0.1").await.unwrap());
        assert!(!limiter.allow("10.0.0.1").await.unwrap());
        assert!(limiter.allow("10.0.0.2").await.unwrap());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_admissions_bounded_by_capacity() {
        let limiter = Arc::new(limiter(10, 1, Duration::from_secs(60)));

        let handles: Vec<_> = (0..200)
            .map(|_| {
                let limiter = limiter.clone();
                tokio::spawn(async move { limiter.allow("global").await.unwrap() })
            })
            .collect();

        let mut admitted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                admitted += 1;
            }
        }

        assert_eq!(admitted, 10);
    }
}
