//! Handler for link shortening endpoint.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for a long URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/page" }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// {
///   "code": "aB3xY9",
///   "short_url": "https://s.example.com/aB3xY9",
///   "long_url": "https://example.com/some/page",
///   "created_at": "2025-01-01T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - 400 Bad Request if the URL is missing, malformed or not allowed
/// - 503 Service Unavailable if no free code was found (retry)
/// - 500 Internal Server Error on store failure
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let link = state.link_service.shorten(&payload.url).await?;
    let short_url = state.link_service.short_url(&link.id);

    Ok((
        StatusCode::CREATED,
        Json(ShortenResponse::new(link, short_url)),
    ))
}
