//! Error types for catalogue construction and validation.

use thiserror::Error;

/// Result type alias for catalogue operations.
pub type CatalogueResult<T> = Result<T, CatalogueError>;

/// Errors that can occur while building or validating a catalogue.
#[derive(Debug, Error)]
pub enum CatalogueError {
    /// A model with the same qualified name was declared twice.
    #[error("duplicate model '{0}'")]
    DuplicateModel(String),

    /// Two models declare the same table name.
    #[error("models '{first}' and '{second}' both map to table '{table}'")]
    DuplicateTable {
        /// First model using the table.
        first: String,
        /// Second model using the table.
        second: String,
        /// The contested table name.
        table: String,
    },

    /// A field was declared twice within one model.
    #[error("duplicate field '{field}' in model '{model}'")]
    DuplicateField {
        /// Model containing the duplicate.
        model: String,
        /// Field name declared twice.
        field: String,
    },

    /// A foreign key references a table no declared model maps to.
    #[error("field '{model}.{field}' references unknown table '{target}'")]
    UnknownForeignKeyTarget {
        /// Model containing the foreign key.
        model: String,
        /// Field carrying the reference.
        field: String,
        /// The referenced table name.
        target: String,
    },

    /// A unique-together group or FTS spec names a column the model does not have.
    #[error("model '{model}' references unknown column '{column}'")]
    UnknownColumn {
        /// Model containing the reference.
        model: String,
        /// The missing column name.
        column: String,
    },

    /// An FTS generated column is not named with the `fts_` prefix.
    #[error("FTS column '{column}' in model '{model}' must start with 'fts_'")]
    InvalidFtsColumn {
        /// Model containing the FTS spec.
        model: String,
        /// The offending generated-column name.
        column: String,
    },

    /// A field kind string could not be parsed.
    #[error("invalid field kind '{0}'")]
    InvalidKind(String),

    /// Catalogue file could not be parsed.
    #[error("catalogue file error: {0}")]
    File(String),
}

impl CatalogueError {
    /// Create a file error.
    pub fn file(msg: impl Into<String>) -> Self {
        Self::File(msg.into())
    }
}

impl From<toml::de::Error> for CatalogueError {
    fn from(err: toml::de::Error) -> Self {
        CatalogueError::File(err.to_string())
    }
}
