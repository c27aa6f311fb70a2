#![allow(dead_code)]

use axum::{Router, extract::ConnectInfo};
use axum_test::TestServer;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::Layer;

use shortlink::application::services::{AdmissionScope, AdmissionService, Deadlines, LinkService};
use shortlink::domain::token_bucket::RateLimitConfig;
use shortlink::infrastructure::cache::MemoryCache;
use shortlink::infrastructure::persistence::MemoryLinkRepository;
use shortlink::infrastructure::rate_limit::{LocalRateLimiter, RateLimiter};
use shortlink::routes::router;
use shortlink::state::AppState;

pub const BASE_URL: &str = "https://s.example.com";

/// In-memory backends behind a test state, kept for direct inspection.
pub struct TestApp {
    pub state: AppState,
    pub repository: Arc<MemoryLinkRepository>,
    pub cache: Arc<MemoryCache>,
}

/// A budget large enough that no test trips it by accident.
pub fn generous_limits() -> RateLimitConfig {
    RateLimitConfig {
        capacity: 10_000,
        refill_rate: 10_000,
        refill_period: Duration::from_secs(1),
        key_prefix: "test:".to_string(),
    }
}

/// A budget of `capacity` requests that does not refill during a test run.
pub fn tight_limits(capacity: u64) -> RateLimitConfig {
    RateLimitConfig {
        capacity,
        refill_rate: 1,
        refill_period: Duration::from_secs(3600),
        key_prefix: "test:".to_string(),
    }
}

pub fn create_test_app(limits: RateLimitConfig, scope: AdmissionScope) -> TestApp {
    create_test_app_with_limiter(Arc::new(LocalRateLimiter::new(limits)), scope, false)
}

pub fn create_test_app_with_limiter(
    limiter: Arc<dyn RateLimiter>,
    scope: AdmissionScope,
    behind_proxy: bool,
) -> TestApp {
    let repository = Arc::new(MemoryLinkRepository::new());
    let cache = Arc::new(MemoryCache::new(Duration::from_secs(300)));
    let deadlines = Deadlines::default();

    let link_service = LinkService::new(repository.clone(), cache.clone(), deadlines, BASE_URL);
    let admission = AdmissionService::new(limiter, scope, deadlines.limiter);

    TestApp {
        state: AppState::new(link_service, admission, behind_proxy),
        repository,
        cache,
    }
}

pub fn create_test_server(app: &TestApp) -> TestServer {
    let router: Router = router(app.state.clone()).layer(MockConnectInfoLayer::default());
    TestServer::new(router).unwrap()
}

/// Inserts the peer address the real server gets from `into_make_service_with_connect_info`.
#[derive(Clone)]
pub struct MockConnectInfoLayer {
    addr: SocketAddr,
}

impl MockConnectInfoLayer {
    pub fn new(addr: SocketAddr) -> Self {
        Self { addr }
    }
}

impl Default for MockConnectInfoLayer {
    fn default() -> Self {
        Self::new("127.0.0.1:12345".parse().unwrap())
    }
}

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService {
            inner,
            addr: self.addr,
        }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
    addr: SocketAddr,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(ConnectInfo(self.addr));
        self.inner.call(req)
    }
}
