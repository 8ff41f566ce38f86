//! Error types for statement building, table definitions and configuration.

use thiserror::Error;

/// Errors produced while building SQL text or loading configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An identifier contains characters outside `[A-Za-z0-9_]` or starts
    /// with a digit.
    #[error("invalid identifier '{0}': must match [A-Za-z_][A-Za-z0-9_]*")]
    InvalidIdentifier(String),

    /// An identifier is an SQL keyword and would need quoting.
    #[error("identifier '{0}' is an SQL keyword")]
    ReservedKeyword(String),

    /// An `IN` / `NOT IN` comparison was given no values.
    #[error("empty value list for IN comparison on column '{0}'")]
    EmptyInList(String),

    /// A statement has nothing to render (no columns, no assignments).
    #[error("empty statement: {0}")]
    EmptyStatement(String),

    /// A table definition declares the same column twice.
    #[error("duplicate column '{column}' in table '{table}'")]
    DuplicateColumn {
        /// Table being defined.
        table: String,
        /// Column declared more than once.
        column: String,
    },

    /// Catalog `type` value outside `table`, `index`, `view`, `trigger`.
    #[error("unknown catalog object type: {0}")]
    UnknownObjectType(String),

    /// Configuration failed validation.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;
