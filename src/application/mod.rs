//! Application layer services implementing business logic.
//!
//! This layer orchestrates domain operations by coordinating repository, cache
//! and limiter calls, validation, and the error propagation rules. Services
//! consume the domain and infrastructure traits and provide a clean API for
//! HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Short link creation and resolution
//! - [`services::allocator::IdAllocator`] - Collision-safe code allocation
//! - [`services::read_through::ReadThroughCache`] - Cache-aside lookups with async warm-up
//! - [`services::admission_service::AdmissionService`] - Rate-limit gate for inbound requests

pub mod services;
