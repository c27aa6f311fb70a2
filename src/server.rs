//! HTTP server initialization and runtime setup.
//!
//! Handles database and Redis connections, backend fallbacks, service wiring
//! and the Axum server lifecycle.

use crate::application::services::{AdmissionService, LinkService};
use crate::config::{Config, mask_connection_string};
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::{
    CacheService, NullCache, RedisCache, RedisCacheConfig, connect_manager,
};
use crate::infrastructure::persistence::PgLinkRepository;
use crate::infrastructure::rate_limit::{LocalRateLimiter, RateLimiter, RedisRateLimiter};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use redis::aio::ConnectionManager;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_retry::Retry;
use tokio_retry::strategy::FixedInterval;
use tracing::{info, warn};

/// Delay between startup connection attempts.
const CONNECT_RETRY_INTERVAL: Duration = Duration::from_secs(1);
/// Startup connection attempts before giving up.
const CONNECT_RETRY_ATTEMPTS: usize = 15;

fn connect_retry_strategy() -> impl Iterator<Item = Duration> {
    FixedInterval::new(CONNECT_RETRY_INTERVAL).take(CONNECT_RETRY_ATTEMPTS)
}

/// External collaborators of the services.
pub struct Backends {
    pub pool: PgPool,
    pub repository: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
    pub limiter: Arc<dyn RateLimiter>,
}

/// Opens the PostgreSQL pool, retrying while the database comes up.
///
/// # Errors
///
/// Returns the last connection error once all attempts are used.
pub async fn connect_database(config: &Config) -> Result<PgPool> {
    let options = PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime));

    let pool = Retry::spawn(connect_retry_strategy(), || async {
        options
            .clone()
            .connect(&config.database_url)
            .await
            .inspect_err(|e| warn!(error = %e, "database not ready, retrying"))
    })
    .await
    .with_context(|| {
        format!(
            "Failed to connect to database {}",
            mask_connection_string(&config.database_url)
        )
    })?;

    info!("Connected to database");
    Ok(pool)
}

async fn connect_redis(redis_url: &str) -> Result<ConnectionManager> {
    let manager = Retry::spawn(connect_retry_strategy(), || async {
        connect_manager(redis_url)
            .await
            .inspect_err(|e| warn!(error = %e, "redis not ready, retrying"))
    })
    .await?;

    info!("Connected to Redis");
    Ok(manager)
}

/// Connects every backend and applies migrations.
///
/// The database is mandatory. Redis is optional: when it is not configured or
/// cannot be reached, caching is disabled and rate limiting runs per instance.
///
/// # Errors
///
/// Returns an error if the database is unreachable or migrations fail.
pub async fn init_backends(config: &Config) -> Result<Backends> {
    let pool = connect_database(config).await?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));

    let redis = match &config.redis_url {
        Some(redis_url) => match connect_redis(redis_url).await {
            Ok(manager) => Some(manager),
            Err(e) => {
                warn!(error = %e, "Failed to connect to Redis. Falling back to NullCache and local rate limiting.");
                None
            }
        },
        None => None,
    };

    let (cache, limiter): (Arc<dyn CacheService>, Arc<dyn RateLimiter>) = match redis {
        Some(manager) => {
            let cache: Arc<dyn CacheService> = Arc::new(
                RedisCache::new(
                    manager.clone(),
                    RedisCacheConfig {
                        ttl: config.cache_ttl(),
                        key_prefix: config.cache_key_prefix.clone(),
                    },
                )
                .await,
            );
            let limiter: Arc<dyn RateLimiter> =
                Arc::new(RedisRateLimiter::new(manager, config.rate_limit()));
            info!("Cache enabled (Redis), rate limiting shared (Redis)");
            (cache, limiter)
        }
        None => {
            info!("Cache disabled (NullCache), rate limiting per instance");
            let cache: Arc<dyn CacheService> = Arc::new(NullCache::new());
            let limiter: Arc<dyn RateLimiter> =
                Arc::new(LocalRateLimiter::new(config.rate_limit()));
            (cache, limiter)
        }
    };

    Ok(Backends {
        pool,
        repository,
        cache,
        limiter,
    })
}

/// Wires the services on top of connected backends.
pub fn build_state(config: &Config, backends: &Backends) -> AppState {
    let deadlines = config.deadlines();

    let link_service = LinkService::new(
        backends.repository.clone(),
        backends.cache.clone(),
        deadlines,
        config.base_url.clone(),
    );
    let admission = AdmissionService::new(
        backends.limiter.clone(),
        config.rate_limit_scope,
        deadlines.limiter,
    );

    AppState::new(link_service, admission, config.behind_proxy)
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Redis cache and rate limiter (or local fallbacks)
/// - Axum HTTP server with graceful shutdown
///
/// # Errors
///
/// Returns an error if:
/// - Database connection fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let backends = init_backends(&config).await?;
    let state = build_state(&config, &backends);

    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid LISTEN address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    backends.pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating shutdown"),
    }
}
