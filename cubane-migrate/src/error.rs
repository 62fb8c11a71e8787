//! Error types for the reconciler.

use cubane_catalogue::CatalogueError;
use thiserror::Error;

/// Result type alias for migration operations.
pub type MigrateResult<T> = Result<T, MigrateError>;

/// Errors that can occur during a migration run.
///
/// Any of these aborts the run; the reconciler rolls the surrounding
/// transaction back before propagating.
#[derive(Debug, Error)]
pub enum MigrateError {
    /// Database operation error reported by the driver.
    #[error("driver error: {0}")]
    Driver(String),

    /// Failed to acquire an exclusive lock on a table.
    #[error("failed to acquire lock on {0}")]
    LockFailed(String),

    /// Catalogue validation error.
    #[error("catalogue error: {0}")]
    Catalogue(#[from] CatalogueError),

    /// I/O error (prompt input).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Declared NOT NULL without a default while NULL rows exist.
    #[error(
        "NULL values exist in column '{table}.{column}'; provide a default or clean data first"
    )]
    NullValuesExist {
        /// Table containing the column.
        table: String,
        /// Column being tightened.
        column: String,
    },

    /// A column's type cannot be changed automatically.
    #[error("unsupported type change for '{table}.{column}': {from} -> {to}")]
    UnsupportedTypeChange {
        /// Table containing the column.
        table: String,
        /// The column whose type differs.
        column: String,
        /// The live type.
        from: String,
        /// The declared type.
        to: String,
    },

    /// A foreign key references a table that does not exist.
    #[error("referenced table '{referenced}' required by '{table}' does not exist")]
    MissingReferencedTable {
        /// Table carrying the foreign key.
        table: String,
        /// The missing referenced table.
        referenced: String,
    },

    /// Fixture data could not be loaded.
    #[error("fixture error: {0}")]
    Fixture(String),
}

impl MigrateError {
    /// Create a driver error.
    pub fn driver(msg: impl Into<String>) -> Self {
        Self::Driver(msg.into())
    }

    /// Create a lock error.
    pub fn lock_failed(msg: impl Into<String>) -> Self {
        Self::LockFailed(msg.into())
    }

    /// Create a fixture error.
    pub fn fixture(msg: impl Into<String>) -> Self {
        Self::Fixture(msg.into())
    }

    /// Whether retrying the run may succeed without operator action.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::LockFailed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MigrateError::NullValuesExist {
            table: "part".to_string(),
            column: "name".to_string(),
        };
        assert!(err.to_string().contains("part.name"));

        let err = MigrateError::UnsupportedTypeChange {
            table: "part".to_string(),
            column: "name".to_string(),
            from: "text".to_string(),
            to: "integer".to_string(),
        };
        assert!(err.to_string().contains("text -> integer"));
    }

    #[test]
    fn test_is_retryable() {
        assert!(MigrateError::LockFailed("part".to_string()).is_retryable());
        assert!(!MigrateError::driver("connection lost").is_retryable());
    }
}
