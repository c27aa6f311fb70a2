//! Cache service trait and error types.

use async_trait::async_trait;

pub use crate::domain::errors::CacheError;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Trait for caching short URL mappings.
///
/// Keys passed in are bare short codes; implementations namespace them under
/// their own key prefix. Every entry carries the implementation's configured
/// TTL, and a hit slides that TTL forward in the same operation.
///
/// Implementations report failures honestly. Absorbing them is the read path's
/// job (see [`crate::application::services::ReadThroughCache`]), the cache is
/// never a dependency for correctness.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache shared by all instances
/// - [`crate::infrastructure::cache::MemoryCache`] - Process-local cache
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the original URL for a short code and resets its TTL.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` on cache hit
    /// - `Ok(None)` on cache miss
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend cannot answer.
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>>;

    /// Stores a URL mapping with the configured TTL.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend rejects or cannot receive the write.
    async fn set_url(&self, short_code: &str, original_url: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    ///
    /// Used by health check endpoints to report cache status.
    async fn health_check(&self) -> bool;

    /// Short name of the backend for logs and health reports.
    fn backend(&self) -> &'static str;
}
