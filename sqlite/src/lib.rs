//! SQLite backend for the entity schema-version ledger.
//!
//! This crate stores one schema version per named entity in the
//! `EntityVersions` table, reads the engine catalog (`sqlite_master`) and
//! brings declared entities up to their target versions.
//!
//! # Architecture
//!
//! - **`exec`** — binds built [`Statement`](entity_ledger_core::Statement)s
//!   and runs multi-statement work atomically
//! - **`ledger`** — [`VersionLedger`], forward-only version bookkeeping
//! - **`introspect`** — [`Introspector`], catalog lookups and drift checks
//! - **`migrate`** — [`Migrator`], per-entity create and step application
//!
//! # Quick start — ledger
//!
//! ```
//! use entity_ledger_core::Dialect;
//! use entity_ledger_sqlite::{Introspector, VersionLedger};
//! use rusqlite::Connection;
//!
//! let conn = Connection::open_in_memory().unwrap();
//! let dialect = Dialect::LATEST;
//!
//! let ledger = VersionLedger::new(&conn, &dialect);
//! ledger.ensure_ledger_exists().unwrap();
//! ledger.set_version("Users", 1).unwrap();
//!
//! let introspector = Introspector::new(&conn, &dialect);
//! assert!(introspector.table_exists("EntityVersions").unwrap());
//! assert_eq!(ledger.get_version("Users").unwrap(), 1);
//! ```
//!
//! # Quick start — migrations
//!
//! ```no_run
//! use entity_ledger_core::LedgerConfig;
//! use entity_ledger_sqlite::Migrator;
//!
//! let config = LedgerConfig::load("ledger.yaml").unwrap();
//! let mut migrator = Migrator::from_config(&config).unwrap();
//! let report = migrator.run().unwrap();
//! for (entity, outcome) in &report.entities {
//!     println!("{entity}: {outcome}");
//! }
//! ```

mod error;
mod exec;
mod introspect;
mod ledger;
mod migrate;

pub use error::{LedgerError, Result};
pub use exec::{atomically, execute, query_optional, query_rows};
pub use introspect::Introspector;
pub use ledger::VersionLedger;
pub use migrate::{
    EntityMigrations, EntityOutcome, EntityStatus, MigrationReport, MigrationStep, Migrator,
    SqlStep,
};
