//! Utility functions for code generation, URL processing, and request handling.
//!
//! This module provides helper functions used across the application:
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`url_normalizer`] - URL normalization and sanitization
//! - [`client_ip`] - Caller address extraction for per-client rate limiting
//! - [`db_error`] - SQLx error translation

pub mod client_ip;
pub mod code_generator;
pub mod db_error;
pub mod url_normalizer;
