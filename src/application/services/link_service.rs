//! Link creation and retrieval service.

use std::sync::Arc;

use crate::application::services::{Deadlines, IdAllocator, ReadThroughCache};
use crate::domain::entities::ShortLink;
use crate::domain::errors::{LinkError, StoreError};
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::validate_code;
use crate::utils::url_normalizer::normalize_url;

/// Service for creating and retrieving shortened links.
///
/// Validates caller input, then hands writes to the [`IdAllocator`] and reads
/// to the [`ReadThroughCache`].
pub struct LinkService {
    allocator: IdAllocator,
    reader: ReadThroughCache,
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    deadlines: Deadlines,
    base_url: String,
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// `base_url` is the public origin short URLs are built on, for example
    /// `https://s.example.com`.
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        deadlines: Deadlines,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            allocator: IdAllocator::new(repository.clone(), deadlines.store),
            reader: ReadThroughCache::new(cache.clone(), repository.clone(), deadlines),
            repository,
            cache,
            deadlines,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Replaces the allocator, e.g. to inject a deterministic code source.
    pub fn with_allocator(mut self, allocator: IdAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    /// Creates a short link for `long_url`.
    ///
    /// The URL is normalized first, so `HTTPS://Example.com:443/a#top` is stored
    /// as `https://example.com/a`. Every call allocates a new code; equal URLs
    /// are not deduplicated.
    ///
    /// # Errors
    ///
    /// - [`LinkError::InvalidUrl`] if the URL fails validation
    /// - [`LinkError::AllocationExhausted`], [`LinkError::Store`] or
    ///   [`LinkError::Entropy`] from allocation
    pub async fn shorten(&self, long_url: &str) -> Result<ShortLink, LinkError> {
        let normalized = normalize_url(long_url).map_err(|e| LinkError::InvalidUrl(e.to_string()))?;
        self.allocator.allocate(&normalized).await
    }

    /// Resolves a short code to its target URL.
    ///
    /// # Errors
    ///
    /// - [`LinkError::InvalidCode`] if `code` is not a well-formed short code
    /// - [`LinkError::NotFound`] if no link exists under `code`
    /// - [`LinkError::Store`] on store failure
    pub async fn resolve(&self, code: &str) -> Result<String, LinkError> {
        validate_code(code)?;
        self.reader.get(code).await
    }

    /// Constructs the full short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }

    /// Checks that the link store answers within the store deadline.
    pub async fn store_health(&self) -> Result<(), StoreError> {
        tokio::time::timeout(self.deadlines.store, self.repository.health_check())
            .await
            .unwrap_or(Err(StoreError::Timeout))
    }

    /// Checks the cache backend. Returns the backend name and whether it answered.
    pub async fn cache_health(&self) -> (&'static str, bool) {
        let healthy = tokio::time::timeout(self.deadlines.cache, self.cache.health_check())
            .await
            .unwrap_or(false);
        (self.cache.backend(), healthy)
    }
}
