//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tracing::debug;

use crate::domain::entities::{InsertOutcome, ShortLink};
use crate::domain::errors::StoreError;
use crate::domain::repositories::LinkRepository;
use crate::utils::db_error::into_store_error;

/// PostgreSQL repository for link storage and retrieval.
///
/// Uniqueness is enforced by the primary key on `links.code`. The insert uses
/// `ON CONFLICT (code) DO NOTHING`, so only a clash on that key yields zero
/// rows; any other constraint violation still surfaces as an error.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert_if_absent(
        &self,
        code: &str,
        target: &str,
    ) -> Result<InsertOutcome, StoreError> {
        let row: Option<(String, String, DateTime<Utc>)> = sqlx::query_as(
            r#"
            INSERT INTO links (code, long_url)
            VALUES ($1, $2)
            ON CONFLICT (code) DO NOTHING
            RETURNING code, long_url, created_at
            "#,
        )
        .bind(code)
        .bind(target)
        .fetch_optional(self.pool.as_ref())
        .await
        .map_err(into_store_error)?;

        match row {
            Some((code, long_url, created_at)) => Ok(InsertOutcome::Inserted(ShortLink::new(
                code, long_url, created_at,
            ))),
            None => {
                debug!(code = %code, "insert skipped, code already taken");
                Ok(InsertOutcome::Collision)
            }
        }
    }

    async fn find_target(&self, code: &str) -> Result<Option<String>, StoreError> {
        sqlx::query_scalar::<_, String>("SELECT long_url FROM links WHERE code = $1")
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await
            .map_err(into_store_error)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .map_err(into_store_error)?;
        Ok(())
    }
}
