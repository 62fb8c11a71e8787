//! CLI error types and result alias.

use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(cubane::io))]
    Io(#[from] std::io::Error),

    /// Catalogue error
    #[error("Catalogue error: {0}")]
    #[diagnostic(code(cubane::catalogue))]
    Catalogue(String),

    /// Migration error
    #[error("Migration error: {0}")]
    #[diagnostic(code(cubane::migration))]
    Migration(String),

    /// Database error
    #[error("Database error: {0}")]
    #[diagnostic(code(cubane::database))]
    Database(String),
}

impl From<cubane_catalogue::CatalogueError> for CliError {
    fn from(err: cubane_catalogue::CatalogueError) -> Self {
        CliError::Catalogue(err.to_string())
    }
}

impl From<cubane_migrate::MigrateError> for CliError {
    fn from(err: cubane_migrate::MigrateError) -> Self {
        CliError::Migration(err.to_string())
    }
}

impl From<cubane_postgres::PgError> for CliError {
    fn from(err: cubane_postgres::PgError) -> Self {
        CliError::Database(err.to_string())
    }
}
