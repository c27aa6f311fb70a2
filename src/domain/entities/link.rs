//! Link entity representing a shortened URL mapping.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A shortened URL link.
///
/// Created exactly once by the allocator on a successful insert and never
/// modified afterwards. `id` is the primary key of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortLink {
    pub id: String,
    pub target: String,
    pub created_at: DateTime<Utc>,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    pub fn new(id: String, target: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            target,
            created_at,
        }
    }
}

/// Result of a single insert-if-absent attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was stored under the requested id.
    Inserted(ShortLink),
    /// Another row already owns the requested id. Nothing was written.
    Collision,
}

impl InsertOutcome {
    pub fn is_collision(&self) -> bool {
        matches!(self, Self::Collision)
    }
}
