//! HTTP middleware for request processing and protection.
//!
//! Provides rate-limit admission and observability middleware.

pub mod rate_limit;
pub mod tracing;
