//! DTOs for link lookup endpoint.

use serde::{Deserialize, Serialize};

/// Resolved short link.
#[derive(Debug, Serialize, Deserialize)]
pub struct LinkResponse {
    pub code: String,
    pub long_url: String,
}
