//! Rate limiting middleware backed by the admission service.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::json;

use crate::{error::AppError, state::AppState, utils::client_ip::client_ip};

/// Admits or rejects a request before it reaches any handler.
///
/// # Key Extraction
///
/// In `global` scope every request draws from one bucket. In `peer` scope the
/// bucket is keyed by client IP: the socket peer address, or the forwarding
/// headers when [`AppState::behind_proxy`] is set.
///
/// # Errors
///
/// - `429 Too Many Requests` with `Retry-After` when the bucket is empty
/// - `500 Internal Server Error` when the limiter cannot be consulted; the
///   request is never let through in that case
///
/// # Example
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/api/shorten", post(shorten_handler))
///     .layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let key = st
        .admission
        .caller_key(client_ip(req.headers(), peer, st.behind_proxy));

    if !st.admission.admit(&key).await? {
        return Err(AppError::rate_limited(
            "Too many requests",
            json!({ "reason": "rate limit exceeded, retry later" }),
        ));
    }

    Ok(next.run(req).await)
}
