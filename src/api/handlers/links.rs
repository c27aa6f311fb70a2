//! Handler for short link lookup.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::link::LinkResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the target of a short code without redirecting.
///
/// # Endpoint
///
/// `GET /api/links/{code}`
///
/// # Errors
///
/// - 400 Bad Request if the code is malformed
/// - 404 Not Found if the code was never allocated
pub async fn link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<LinkResponse>, AppError> {
    let long_url = state.link_service.resolve(&code).await?;

    Ok(Json(LinkResponse { code, long_url }))
}
