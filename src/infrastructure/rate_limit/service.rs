//! Rate limiter trait.

use async_trait::async_trait;

pub use crate::domain::errors::LimiterError;

/// Token-bucket admission check against a backing store.
///
/// Each call runs the full refill-and-consume step for one bucket atomically,
/// so concurrent callers on any number of instances observe a total order per
/// key.
///
/// # Implementations
///
/// - [`crate::infrastructure::rate_limit::RedisRateLimiter`] - Shared bucket state in Redis
/// - [`crate::infrastructure::rate_limit::LocalRateLimiter`] - Bucket state in this process only
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Consumes one token from the bucket of `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(true)` if the request is admitted
    /// - `Ok(false)` if the bucket is empty
    ///
    /// # Errors
    ///
    /// Returns [`LimiterError`] when the backing store cannot run the check.
    /// Callers must treat this as a rejection.
    async fn allow(&self, key: &str) -> Result<bool, LimiterError>;

    /// Short name of the backend for logs and health reports.
    fn backend(&self) -> &'static str;
}
