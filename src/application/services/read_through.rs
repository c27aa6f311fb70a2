//! Cache-aside read path for short code resolution.

use std::sync::Arc;

use metrics::counter;
use tracing::{debug, warn};

use crate::application::services::Deadlines;
use crate::domain::errors::{CacheError, LinkError, StoreError};
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;

/// Resolves short codes through the cache, falling back to the store.
///
/// # Read Flow
///
/// 1. Cache lookup. A hit slides the entry's TTL and returns at once.
/// 2. On a miss, a cache error or a cache timeout, the store is queried.
/// 3. A store hit is returned immediately and written back to the cache on a
///    detached task bounded by [`Deadlines::cache_warm`].
/// 4. A store miss is terminal and never cached.
///
/// Cache failures are logged and counted, never returned. Writes never touch
/// the cache; entries appear on first read.
#[derive(Clone)]
pub struct ReadThroughCache {
    cache: Arc<dyn CacheService>,
    repository: Arc<dyn LinkRepository>,
    deadlines: Deadlines,
}

impl ReadThroughCache {
    pub fn new(
        cache: Arc<dyn CacheService>,
        repository: Arc<dyn LinkRepository>,
        deadlines: Deadlines,
    ) -> Self {
        Self {
            cache,
            repository,
            deadlines,
        }
    }

    /// Returns the target stored under `code`.
    ///
    /// # Errors
    ///
    /// - [`LinkError::NotFound`] if the store has no such code
    /// - [`LinkError::Store`] if the store fails or times out
    pub async fn get(&self, code: &str) -> Result<String, LinkError> {
        if let Some(target) = self.lookup_cache(code).await {
            return Ok(target);
        }

        let found = tokio::time::timeout(self.deadlines.store, self.repository.find_target(code))
            .await
            .unwrap_or(Err(StoreError::Timeout))?;

        match found {
            Some(target) => {
                self.spawn_warm_up(code, &target);
                Ok(target)
            }
            None => Err(LinkError::NotFound),
        }
    }

    async fn lookup_cache(&self, code: &str) -> Option<String> {
        let result = tokio::time::timeout(self.deadlines.cache, self.cache.get_url(code))
            .await
            .unwrap_or(Err(CacheError::Timeout));

        match result {
            Ok(Some(target)) => {
                counter!("shortlink_cache_lookups_total", "result" => "hit").increment(1);
                debug!(code = %code, "cache hit");
                Some(target)
            }
            Ok(None) => {
                counter!("shortlink_cache_lookups_total", "result" => "miss").increment(1);
                debug!(code = %code, "cache miss");
                None
            }
            Err(e) => {
                counter!("shortlink_cache_lookups_total", "result" => "error").increment(1);
                warn!(code = %code, backend = self.cache.backend(), error = %e, "cache lookup failed, falling back to store");
                None
            }
        }
    }

    /// Populates the cache off the request path.
    ///
    /// The task is not tied to the caller: dropping the request future (client
    /// disconnect) leaves it running until it finishes or hits its own deadline.
    fn spawn_warm_up(&self, code: &str, target: &str) {
        let cache = self.cache.clone();
        let deadline = self.deadlines.cache_warm;
        let code = code.to_string();
        let target = target.to_string();

        tokio::spawn(async move {
            match tokio::time::timeout(deadline, cache.set_url(&code, &target)).await {
                Ok(Ok(())) => {
                    counter!("shortlink_cache_warmups_total", "result" => "ok").increment(1);
                    debug!(code = %code, "cache warmed");
                }
                Ok(Err(e)) => {
                    counter!("shortlink_cache_warmups_total", "result" => "error").increment(1);
                    warn!(code = %code, error = %e, "cache warm-up failed");
                }
                Err(_) => {
                    counter!("shortlink_cache_warmups_total", "result" => "timeout").increment(1);
                    warn!(code = %code, timeout_ms = deadline.as_millis() as u64, "cache warm-up timed out");
                }
            }
        });
    }
}
