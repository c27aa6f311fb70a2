//! Token-bucket rate limiting backends.
//!
//! - [`RedisRateLimiter`] - Atomic Lua script, bucket state shared by all instances
//! - [`LocalRateLimiter`] - Same arithmetic on process-local state

mod local_limiter;
mod redis_limiter;
mod service;

pub use local_limiter::LocalRateLimiter;
pub use redis_limiter::RedisRateLimiter;
pub use service::{LimiterError, RateLimiter};

#[cfg(test)]
pub use service::MockRateLimiter;
