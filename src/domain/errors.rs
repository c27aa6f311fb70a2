//! Error taxonomy of the shortener core.
//!
//! Each external collaborator reports its own error type. The propagation
//! policy lives with the callers: cache errors are absorbed, store errors are
//! surfaced, collisions never leave the allocator, and limiter errors fail
//! closed.

use thiserror::Error;

/// Failures of the persistent link store.
///
/// A collision is not a `StoreError`; it is reported as
/// [`crate::domain::entities::InsertOutcome::Collision`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("store operation timed out")]
    Timeout,

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store query failed: {0}")]
    Query(String),
}

/// Failures of the shared key-value cache.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("cache connection error: {0}")]
    ConnectionError(String),

    #[error("cache operation error: {0}")]
    OperationError(String),

    #[error("cache operation timed out")]
    Timeout,
}

/// Failures of the rate limiter's own backing store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LimiterError {
    #[error("rate limiter backend error: {0}")]
    Backend(String),

    #[error("rate limiter check timed out")]
    Timeout,

    #[error("rate limiter returned an unexpected reply: {0}")]
    UnexpectedReply(String),
}

/// Terminal outcomes of the allocate and resolve operations.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("invalid short code: {0}")]
    InvalidCode(String),

    #[error("short link not found")]
    NotFound,

    #[error("no free short code after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },

    #[error("random source failure: {0}")]
    Entropy(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl LinkError {
    /// True for failures a caller may retry as-is.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::AllocationExhausted { .. } | Self::Store(StoreError::Timeout)
        )
    }
}
