//! Domain layer containing business entities and logic.
//!
//! This module holds the core data model of the shortener independent of
//! infrastructure concerns: the link entity, the token-bucket arithmetic shared
//! by every rate-limiter backend, the repository contract, and the error types
//! each component reports.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`token_bucket`] - Refill/consume arithmetic of the admission gate
//! - [`errors`] - Store, cache, limiter and link error taxonomy
//!
//! # Design Principles
//!
//! - Domain layer has no dependencies on infrastructure or presentation layers
//! - Repository traits define contracts implemented by infrastructure layer
//! - Uniqueness and admission rules are enforced by the backing stores'
//!   own atomic primitives, never by in-process locks

pub mod entities;
pub mod errors;
pub mod repositories;
pub mod token_bucket;
