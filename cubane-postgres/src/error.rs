//! Error types for PostgreSQL operations.

use cubane_migrate::MigrateError;
use thiserror::Error;

/// Result type for PostgreSQL operations.
pub type PgResult<T> = Result<T, PgError>;

/// Errors that can occur during PostgreSQL operations.
#[derive(Error, Debug)]
pub enum PgError {
    /// PostgreSQL error.
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(String),
}

impl PgError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    /// Whether the error is a failed lock acquisition (`lock_not_available`).
    pub fn is_lock_failure(&self) -> bool {
        match self {
            Self::Postgres(e) => e
                .code()
                .is_some_and(|c| c.code() == "55P03"),
            _ => false,
        }
    }
}

impl From<PgError> for MigrateError {
    fn from(err: PgError) -> Self {
        if err.is_lock_failure() {
            MigrateError::LockFailed(err.to_string())
        } else {
            MigrateError::Driver(err.to_string())
        }
    }
}
