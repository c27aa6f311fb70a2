//! API route configuration.
//!
//! All API endpoints pass through the admission middleware applied in
//! [`crate::routes::app_router`].

use crate::api::handlers::{link_handler, shorten_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// REST API routes.
///
/// # Endpoints
///
/// - `POST /shorten`        - Create a short link
/// - `GET  /links/{code}`   - Look up the target of a short link
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/links/{code}", get(link_handler))
}
