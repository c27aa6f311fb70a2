//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer, providing
//! concrete implementations for data persistence, caching and rate limiting.
//!
//! # Modules
//!
//! - [`cache`] - Caching abstractions (Redis, in-memory and no-op implementations)
//! - [`persistence`] - PostgreSQL and in-memory link repositories
//! - [`rate_limit`] - Token-bucket limiters (Redis script and process-local)

pub mod cache;
pub mod persistence;
pub mod rate_limit;
