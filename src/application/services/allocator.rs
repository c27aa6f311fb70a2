//! Collision-safe short code allocation.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{error, info, warn};

use crate::domain::entities::{InsertOutcome, ShortLink};
use crate::domain::errors::{LinkError, StoreError};
use crate::domain::repositories::LinkRepository;
use crate::utils::code_generator::generate_code;

/// Number of codes tried before giving up.
pub const MAX_ATTEMPTS: u32 = 5;

/// Source of candidate codes.
pub type CodeSource = Arc<dyn Fn() -> Result<String, LinkError> + Send + Sync>;

fn system_codes() -> CodeSource {
    Arc::new(|| generate_code().map_err(|e| LinkError::Entropy(e.to_string())))
}

/// Allocates fresh short codes against a uniqueness-enforcing store.
///
/// Each attempt draws a random code and asks the store to insert it only if
/// absent. A collision is not an error: the code is dropped and a new one is
/// drawn. Store and entropy failures end the allocation at once.
///
/// With 62^6 possible codes, five consecutive collisions only happen when the
/// keyspace is close to full. Exhaustion is reported as transient.
pub struct IdAllocator {
    repository: Arc<dyn LinkRepository>,
    codes: CodeSource,
    store_timeout: Duration,
}

impl IdAllocator {
    pub fn new(repository: Arc<dyn LinkRepository>, store_timeout: Duration) -> Self {
        Self {
            repository,
            codes: system_codes(),
            store_timeout,
        }
    }

    /// Replaces the random code source.
    pub fn with_code_source(mut self, codes: CodeSource) -> Self {
        self.codes = codes;
        self
    }

    /// Stores `target` under a newly allocated code.
    ///
    /// # Errors
    ///
    /// - [`LinkError::AllocationExhausted`] after [`MAX_ATTEMPTS`] collisions
    /// - [`LinkError::Store`] on the first store failure or timeout
    /// - [`LinkError::Entropy`] if the random source fails
    ///
    /// A [`StoreError::Timeout`] does not mean nothing was written: the insert
    /// may still commit after the deadline, leaving a row no caller was told
    /// about. Such a row is unreachable but harmless, and the allocation is not
    /// retried.
    pub async fn allocate(&self, target: &str) -> Result<ShortLink, LinkError> {
        for attempt in 1..=MAX_ATTEMPTS {
            let code = (self.codes)().inspect_err(|e| {
                error!(error = %e, "random source failed");
                counter!("shortlink_allocations_total", "outcome" => "error").increment(1);
            })?;

            let outcome = tokio::time::timeout(
                self.store_timeout,
                self.repository.insert_if_absent(&code, target),
            )
            .await
            .unwrap_or(Err(StoreError::Timeout));

            match outcome {
                Ok(InsertOutcome::Inserted(link)) => {
                    counter!("shortlink_allocation_attempts_total", "outcome" => "success")
                        .increment(1);
                    counter!("shortlink_allocations_total", "outcome" => "success").increment(1);
                    info!(code = %link.id, attempt, "short link created");
                    return Ok(link);
                }
                Ok(InsertOutcome::Collision) => {
                    counter!("shortlink_allocation_attempts_total", "outcome" => "collision")
                        .increment(1);
                    info!(code = %code, attempt, "short code collision, retrying");
                }
                Err(e) => {
                    counter!("shortlink_allocation_attempts_total", "outcome" => "error")
                        .increment(1);
                    counter!("shortlink_allocations_total", "outcome" => "error").increment(1);
                    error!(code = %code, attempt, error = %e, "failed to insert short link");
                    return Err(e.into());
                }
            }
        }

        counter!("shortlink_allocations_total", "outcome" => "exhausted").increment(1);
        warn!(attempts = MAX_ATTEMPTS, "short code allocation exhausted");
        Err(LinkError::AllocationExhausted {
            attempts: MAX_ATTEMPTS,
        })
    }
}
