//! Per-call time bounds for calls leaving the process.

use std::time::Duration;

/// Upper bounds applied to every store, cache and limiter call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadlines {
    /// Insert and lookup against the link store.
    pub store: Duration,
    /// Cache read on the request path.
    pub cache: Duration,
    /// Detached cache population after a store hit.
    pub cache_warm: Duration,
    /// One rate-limiter check.
    pub limiter: Duration,
}

impl Default for Deadlines {
    fn default() -> Self {
        Self {
            store: Duration::from_secs(5),
            cache: Duration::from_millis(500),
            cache_warm: Duration::from_secs(2),
            limiter: Duration::from_millis(500),
        }
    }
}
