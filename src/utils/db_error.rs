//! Translation of SQLx failures into store errors.

use crate::domain::errors::StoreError;

/// Maps a [`sqlx::Error`] onto the store error taxonomy.
///
/// Pool exhaustion is reported as [`StoreError::Timeout`], connectivity
/// problems as [`StoreError::Unavailable`], everything else as
/// [`StoreError::Query`].
pub fn into_store_error(e: sqlx::Error) -> StoreError {
    match e {
        sqlx::Error::PoolTimedOut => StoreError::Timeout,
        sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_) => {
            StoreError::Unavailable(e.to_string())
        }
        other => {
            if let Some(db_err) = other.as_database_error() {
                return StoreError::Query(format!(
                    "{} (code: {})",
                    db_err.message(),
                    db_err.code().as_deref().unwrap_or("unknown")
                ));
            }
            StoreError::Query(other.to_string())
        }
    }
}
