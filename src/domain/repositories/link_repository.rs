//! Repository trait for short link data access.

use crate::domain::entities::InsertOutcome;
use crate::domain::errors::StoreError;
use async_trait::async_trait;

/// Repository interface for the persistent link store.
///
/// The store is the single source of truth for identifier uniqueness: two
/// concurrent inserts for the same id must never both report
/// [`InsertOutcome::Inserted`], across every service instance.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Stores `target` under `code` unless the code is already taken.
    ///
    /// # Returns
    ///
    /// - `Ok(InsertOutcome::Inserted(link))` if the row was created
    /// - `Ok(InsertOutcome::Collision)` if a row with this code already exists
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] for every other failure, including constraint
    /// violations unrelated to the code.
    async fn insert_if_absent(&self, code: &str, target: &str)
    -> Result<InsertOutcome, StoreError>;

    /// Looks up the target URL stored under `code`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(url))` if found
    /// - `Ok(None)` if not found
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on database errors.
    async fn find_target(&self, code: &str) -> Result<Option<String>, StoreError>;

    /// Verifies the store is reachable.
    async fn health_check(&self) -> Result<(), StoreError>;
}
