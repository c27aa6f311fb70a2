//! Core domain entities representing the business data model.
//!
//! # Entity Types
//!
//! - [`ShortLink`] - An immutable mapping from a short identifier to its target URL
//!
//! # Design Pattern
//!
//! [`InsertOutcome`] is what the store reports for a single insert-if-absent
//! attempt, keeping a collision apart from a failure.

pub mod link;

pub use link::{InsertOutcome, ShortLink};
