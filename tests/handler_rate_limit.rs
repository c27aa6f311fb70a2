mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use shortlink::application::services::AdmissionScope;
use shortlink::infrastructure::rate_limit::{LimiterError, LocalRateLimiter, RateLimiter};

/// Limiter whose backend is down.
struct BrokenLimiter {
    calls: AtomicUsize,
}

#[async_trait]
impl RateLimiter for BrokenLimiter {
    async fn allow(&self, _key: &str) -> Result<bool, LimiterError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LimiterError::Backend("connection refused".into()))
    }

    fn backend(&self) -> &'static str {
        "broken"
    }
}

#[tokio::test]
async fn test_requests_beyond_capacity_are_rejected() {
    let app = common::create_test_app(common::tight_limits(3), AdmissionScope::Global);
    let server = common::create_test_server(&app);

    for _ in 0..3 {
        server.get("/Nope42").await.assert_status(StatusCode::NOT_FOUND);
    }

    let response = server.get("/Nope42").await;
    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.header("retry-after"), "1");

    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "rate_limited");
}

#[tokio::test]
async fn test_rejected_request_does_no_work() {
    let app = common::create_test_app(common::tight_limits(1), AdmissionScope::Global);
    let server = common::create_test_server(&app);

    server
        .post("/api/shorten")
        .json(&serde_json::json!({ "url": "https://example.com/one" }))
        .await
        .assert_status(StatusCode::CREATED);

    server
        .post("/api/shorten")
        .json(&serde_json::json!({ "url": "https://example.com/two" }))
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    assert_eq!(app.repository.len(), 1);
}

#[tokio::test]
async fn test_global_scope_shares_one_bucket() {
    let app = common::create_test_app(common::tight_limits(2), AdmissionScope::Global);
    let server = common::create_test_server(&app);

    server.get("/Nope42").await.assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/links/Nope42")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/api/links/Nope42")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_peer_scope_buckets_by_forwarded_address() {
    let limiter = Arc::new(LocalRateLimiter::new(common::tight_limits(1)));
    let app = common::create_test_app_with_limiter(limiter, AdmissionScope::Peer, true);
    let server = common::create_test_server(&app);

    server
        .get("/Nope42")
        .add_header("x-forwarded-for", "203.0.113.7")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .get("/Nope42")
        .add_header("x-forwarded-for", "203.0.113.7")
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    server
        .get("/Nope42")
        .add_header("x-forwarded-for", "198.51.100.4")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_is_not_rate_limited() {
    let app = common::create_test_app(common::tight_limits(1), AdmissionScope::Global);
    let server = common::create_test_server(&app);

    for _ in 0..5 {
        server.get("/health").await.assert_status_ok();
    }

    server.get("/Nope42").await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_limiter_failure_rejects_request() {
    let limiter = Arc::new(BrokenLimiter {
        calls: AtomicUsize::new(0),
    });
    let app = common::create_test_app_with_limiter(limiter.clone(), AdmissionScope::Global, false);
    let server = common::create_test_server(&app);

    let response = server
        .post("/api/shorten")
        .json(&serde_json::json!({ "url": "https://example.com/" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let json = response.json::<serde_json::Value>();
    assert_eq!(json["error"]["code"], "internal_error");

    assert_eq!(limiter.calls.load(Ordering::SeqCst), 1);
    assert!(app.repository.is_empty());
}
