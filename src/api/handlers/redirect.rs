//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Validate the code format
/// 2. Look the code up through the read-through cache
/// 3. Return 302 Found with the target in `Location`
///
/// Cache population after a miss happens in the background and does not delay
/// the redirect.
///
/// # Errors
///
/// Returns 400 Bad Request for malformed codes and 404 Not Found if the short
/// code doesn't exist.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let long_url = state.link_service.resolve(&code).await?;

    let location = HeaderValue::from_str(&long_url).map_err(|_| {
        AppError::internal("Stored URL is not a valid header value", json!({ "code": code }))
    })?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
