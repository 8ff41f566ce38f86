//! Error types for ledger, introspection and migration operations.

use entity_ledger_core::CoreError;
use thiserror::Error;

/// Errors that can occur while reading or writing schema state.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A version lower than the stored one was requested.
    ///
    /// Raised before any write or DDL is applied.
    #[error("version regression for entity '{entity}': stored {current}, requested {requested}")]
    VersionRegression {
        /// Entity whose version would have decreased.
        entity: String,
        /// Version currently stored.
        current: u32,
        /// Version that was requested.
        requested: u32,
    },

    /// The engine connection could not be read or written.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(#[from] rusqlite::Error),

    /// A migration step failed; the entity was rolled back.
    #[error("migration of '{entity}' to version {version} failed on table '{table}': {reason}")]
    MigrationFailed {
        /// Entity being migrated.
        entity: String,
        /// Version the failing step produces.
        version: u32,
        /// Table the step was applied to.
        table: String,
        /// Underlying failure.
        reason: String,
    },

    /// The entity is not declared.
    #[error("unknown entity: {0}")]
    UnknownEntity(String),

    /// Statement building or configuration failure.
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Convenience alias for results with [`LedgerError`].
pub type Result<T> = std::result::Result<T, LedgerError>;
