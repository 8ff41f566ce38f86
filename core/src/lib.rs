//! Dialect identifiers, typed statements and table definitions for entity
//! schema tracking.
//!
//! This crate holds everything that does not need a live connection:
//!
//! - [`Dialect`] — the immutable set of reserved table and column names
//!   (`EntityVersions`, `sqlite_master`, `android_metadata`, ...).
//! - [`Select`], [`Insert`], [`Update`], [`Delete`] — statement builders over
//!   the [`Clause`] sum type, rendered to a [`Statement`] of SQL text plus
//!   bound [`SqlValue`] parameters.
//! - [`TableDef`] / [`ColumnDef`] — typed DDL generation.
//! - [`VersionRecord`], [`CatalogEntry`], [`SchemaDrift`] — the ledger and
//!   catalog data model.
//! - [`LedgerConfig`] — YAML declaration of tracked entities.
//!
//! # Example
//!
//! ```
//! use entity_ledger_core::*;
//!
//! let dialect = Dialect::LATEST;
//! let lookup = Select::from(dialect.catalog_table)
//!     .columns([dialect.catalog.sql])
//!     .filter(Condition::eq(dialect.catalog.object_type, dialect.table_type))
//!     .filter(Condition::eq(dialect.catalog.name, "Users"))
//!     .build()
//!     .unwrap();
//! assert_eq!(lookup.sql, "SELECT sql FROM sqlite_master WHERE type = ? AND name = ?");
//!
//! let ledger = TableDef::ledger(&dialect).create_sql().unwrap();
//! assert!(ledger.starts_with("CREATE TABLE IF NOT EXISTS EntityVersions"));
//! ```

mod config;
mod dialect;
mod error;
mod statement;
mod table;
mod types;
mod validate;

pub use config::{EntityConfig, LedgerConfig, TABLE_PLACEHOLDER, render_template};
pub use dialect::{CatalogColumns, Dialect, LedgerColumns};
pub use error::{CoreError, Result};
pub use statement::{
    Assignment, Clause, CompareOp, Condition, Delete, Direction, Insert, JoinKind, Operand,
    OrderKey, Projection, Select, SqlValue, Statement, Update,
};
pub use table::{ColumnDef, ColumnType, TableDef, drop_table_sql};
pub use types::{CatalogEntry, ObjectType, SchemaDrift, VersionRecord, normalize_definition};
pub use validate::{is_sql_keyword, validate_column_ref, validate_identifier};
