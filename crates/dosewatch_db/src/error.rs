//! Error types for the database client

use dosewatch_common::DoseWatchError;
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Database configuration error: {0}")]
    ConfigError(String),

    #[error("Database URL error: {0}")]
    UrlError(String),

    #[error("Database pool error: {0}")]
    PoolError(String),

    #[error("Database query error: {0}")]
    QueryError(String),

    /// A stored value could not be turned back into a domain value
    #[error("Database decode error: {0}")]
    DecodeError(String),
}

impl From<DbError> for DoseWatchError {
    fn from(err: DbError) -> Self {
        DoseWatchError::DatabaseError(err.to_string())
    }
}
