//! In-memory implementation of link repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::entities::{InsertOutcome, ShortLink};
use crate::domain::errors::StoreError;
use crate::domain::repositories::LinkRepository;

/// Link store backed by a concurrent hash map.
///
/// Insert-if-absent goes through the map's entry API, which holds the shard
/// lock for the check and the write. Data is lost on restart; meant for tests
/// and local runs.
#[derive(Default)]
pub struct MemoryLinkRepository {
    links: DashMap<String, ShortLink>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn insert_if_absent(
        &self,
        code: &str,
        target: &str,
    ) -> Result<InsertOutcome, StoreError> {
        match self.links.entry(code.to_string()) {
            Entry::Occupied(_) => Ok(InsertOutcome::Collision),
            Entry::Vacant(vacant) => {
                let link = ShortLink::new(code.to_string(), target.to_string(), Utc::now());
                vacant.insert(link.clone());
                Ok(InsertOutcome::Inserted(link))
            }
        }
    }

    async fn find_target(&self, code: &str) -> Result<Option<String>, StoreError> {
        Ok(self.links.get(code).map(|link| link.target.clone()))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
