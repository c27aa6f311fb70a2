//! Process-local cache implementation.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::Duration;
use tokio::time::Instant;

struct Entry {
    url: String,
    expires_at: Instant,
}

/// In-memory cache with the same sliding-TTL behavior as [`super::RedisCache`].
///
/// Entries live only in this process, so several instances do not share hits.
/// Suitable for single-node deployments and tests. Expired entries are dropped
/// lazily when they are next read.
pub struct MemoryCache {
    entries: DashMap<String, Entry>,
    ttl: Duration,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let now = Instant::now();

        if let Some(mut entry) = self.entries.get_mut(short_code) {
            if entry.expires_at > now {
                entry.expires_at = now + self.ttl;
                return Ok(Some(entry.url.clone()));
            }
        }

        self.entries
            .remove_if(short_code, |_, entry| entry.expires_at <= now);
        Ok(None)
    }

    async fn set_url(&self, short_code: &str, original_url: &str) -> CacheResult<()> {
        self.entries.insert(
            short_code.to_string(),
            Entry {
                url: original_url.to_string(),
                expires_at: Instant::now() + self.ttl,
            },
        );
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
