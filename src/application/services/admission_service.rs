//! Inbound request admission through the rate limiter.

use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tracing::{debug, error};

use crate::domain::errors::LimiterError;
use crate::infrastructure::rate_limit::RateLimiter;

/// Key used when every caller shares one bucket.
pub const GLOBAL_KEY: &str = "global";

/// Key used in per-peer mode when the caller address is unknown.
const UNKNOWN_PEER_KEY: &str = "unknown";

/// How callers are grouped into buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdmissionScope {
    /// One bucket for all traffic.
    #[default]
    Global,
    /// One bucket per client IP address.
    Peer,
}

impl FromStr for AdmissionScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Self::Global),
            "peer" | "ip" => Ok(Self::Peer),
            other => Err(format!(
                "unknown rate limit scope '{}', expected 'global' or 'peer'",
                other
            )),
        }
    }
}

impl fmt::Display for AdmissionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Global => f.write_str("global"),
            Self::Peer => f.write_str("peer"),
        }
    }
}

/// Gate every inbound request passes before any other work.
///
/// Limiter failures and timeouts are returned as errors so the caller rejects
/// the request. Nothing is admitted without a positive answer from the limiter.
pub struct AdmissionService {
    limiter: Arc<dyn RateLimiter>,
    scope: AdmissionScope,
    timeout: Duration,
}

impl AdmissionService {
    pub fn new(limiter: Arc<dyn RateLimiter>, scope: AdmissionScope, timeout: Duration) -> Self {
        Self {
            limiter,
            scope,
            timeout,
        }
    }

    pub fn scope(&self) -> AdmissionScope {
        self.scope
    }

    pub fn backend(&self) -> &'static str {
        self.limiter.backend()
    }

    /// Bucket key for a caller.
    pub fn caller_key(&self, peer: Option<IpAddr>) -> String {
        match self.scope {
            AdmissionScope::Global => GLOBAL_KEY.to_string(),
            AdmissionScope::Peer => peer
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| UNKNOWN_PEER_KEY.to_string()),
        }
    }

    /// Decides whether the caller identified by `key` may proceed.
    ///
    /// # Errors
    ///
    /// Returns [`LimiterError`] if the limiter fails or does not answer in time.
    pub async fn admit(&self, key: &str) -> Result<bool, LimiterError> {
        let decision = tokio::time::timeout(self.timeout, self.limiter.allow(key))
            .await
            .unwrap_or(Err(LimiterError::Timeout));

        match decision {
            Ok(true) => {
                counter!("shortlink_rate_limit_decisions_total", "decision" => "allowed")
                    .increment(1);
                Ok(true)
            }
            Ok(false) => {
                counter!("shortlink_rate_limit_decisions_total", "decision" => "rejected")
                    .increment(1);
                debug!(key = %key, "rate limit exceeded");
                Ok(false)
            }
            Err(e) => {
                counter!("shortlink_rate_limit_decisions_total", "decision" => "error")
                    .increment(1);
                error!(key = %key, backend = self.limiter.backend(), error = %e, "rate limiter check failed");
                Err(e)
            }
        }
    }
}
