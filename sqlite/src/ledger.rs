//! Persistent schema versions per entity.
//!
//! The ledger is a single table (`EntityVersions`) holding one row per
//! tracked entity. Versions only move forward: [`VersionLedger::set_version`]
//! refuses to lower a stored version and reports
//! [`VersionRegression`](crate::LedgerError::VersionRegression) before
//! writing anything.
//!
//! Every multi-statement operation runs through
//! [`atomically`](crate::atomically), so a failure between the read and the
//! write leaves the ledger untouched.
//!
//! # Example
//!
//! ```
//! use entity_ledger_core::Dialect;
//! use entity_ledger_sqlite::VersionLedger;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open_in_memory().unwrap();
//! let dialect = Dialect::LATEST;
//! let ledger = VersionLedger::new(&conn, &dialect);
//!
//! ledger.ensure_ledger_exists().unwrap();
//! assert_eq!(ledger.get_version("Users").unwrap(), 0);
//!
//! ledger.set_version("Users", 2).unwrap();
//! assert_eq!(ledger.get_version("Users").unwrap(), 2);
//! assert!(ledger.set_version("Users", 1).is_err());
//! ```

use entity_ledger_core::{
    Condition, Delete, Dialect, Direction, Insert, Select, TableDef, Update, VersionRecord,
};
use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{LedgerError, Result};
use crate::exec::{atomically, execute, query_optional, query_rows};
use crate::introspect::Introspector;

/// Read/write access to the version ledger table.
pub struct VersionLedger<'a> {
    conn: &'a Connection,
    dialect: &'a Dialect,
}

impl<'a> VersionLedger<'a> {
    /// Creates a ledger handle over `conn`.
    pub fn new(conn: &'a Connection, dialect: &'a Dialect) -> Self {
        Self { conn, dialect }
    }

    /// Creates the ledger table when the catalog reports it absent.
    ///
    /// Idempotent. The catalog check and the creation run in one
    /// transaction. Returns `true` when the table was created by this call.
    pub fn ensure_ledger_exists(&self) -> Result<bool> {
        atomically(self.conn, |conn| {
            let introspector = Introspector::new(conn, self.dialect);
            if introspector.table_exists(self.dialect.ledger_table)? {
                return Ok(false);
            }
            let ddl = TableDef::ledger(self.dialect).create_sql()?;
            conn.execute_batch(&ddl)?;
            info!(table = self.dialect.ledger_table, "Created version ledger");
            Ok(true)
        })
    }

    fn ledger_present(&self) -> Result<bool> {
        Introspector::new(self.conn, self.dialect).table_exists(self.dialect.ledger_table)
    }

    /// Returns the full record of `entity`, if registered.
    ///
    /// A database without ledger table has no registered entities; the
    /// table is not created.
    pub fn record(&self, entity: &str) -> Result<Option<VersionRecord>> {
        if !self.ledger_present()? {
            return Ok(None);
        }
        let cols = &self.dialect.ledger;
        let stmt = Select::from(self.dialect.ledger_table)
            .columns([cols.name, cols.version, cols.notes])
            .filter(Condition::eq(cols.name, entity))
            .order_by(cols.id, Direction::Asc)
            .limit(1)
            .build()?;
        query_optional(self.conn, &stmt, read_record)
    }

    /// Returns the stored version of `entity`, or `0` when it was never
    /// registered.
    pub fn get_version(&self, entity: &str) -> Result<u32> {
        Ok(self.record(entity)?.map_or(0, |r| r.version))
    }

    /// Returns `true` if `entity` has a ledger row.
    pub fn contains(&self, entity: &str) -> Result<bool> {
        Ok(self.record(entity)?.is_some())
    }

    /// Lists all records ordered by entity name. Empty when the ledger
    /// table does not exist.
    pub fn records(&self) -> Result<Vec<VersionRecord>> {
        if !self.ledger_present()? {
            return Ok(Vec::new());
        }
        let cols = &self.dialect.ledger;
        let stmt = Select::from(self.dialect.ledger_table)
            .columns([cols.name, cols.version, cols.notes])
            .order_by(cols.name, Direction::Asc)
            .build()?;
        query_rows(self.conn, &stmt, read_record)
    }

    /// Stores `new_version` for `entity`, inserting or updating one row.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::VersionRegression`] when `new_version` is lower
    /// than the stored version; nothing is written in that case.
    pub fn set_version(&self, entity: &str, new_version: u32) -> Result<()> {
        atomically(self.conn, |conn| {
            let ledger = VersionLedger::new(conn, self.dialect);
            let cols = &self.dialect.ledger;
            match ledger.record(entity)? {
                Some(record) if new_version < record.version => {
                    Err(LedgerError::VersionRegression {
                        entity: entity.to_string(),
                        current: record.version,
                        requested: new_version,
                    })
                }
                Some(record) => {
                    if record.version != new_version {
                        let stmt = Update::table(self.dialect.ledger_table)
                            .set(cols.version, new_version)
                            .filter(Condition::eq(cols.name, entity))
                            .build()?;
                        execute(conn, &stmt)?;
                        info!(entity, from = record.version, to = new_version, "Entity version updated");
                    }
                    Ok(())
                }
                None => {
                    ledger.insert(entity, new_version)?;
                    info!(entity, version = new_version, "Entity version registered");
                    Ok(())
                }
            }
        })
    }

    /// Registers `entity` at `initial_version` unless it already has a row.
    ///
    /// Returns `true` when a row was inserted.
    pub fn register(&self, entity: &str, initial_version: u32) -> Result<bool> {
        atomically(self.conn, |conn| {
            let ledger = VersionLedger::new(conn, self.dialect);
            if ledger.contains(entity)? {
                return Ok(false);
            }
            ledger.insert(entity, initial_version)?;
            debug!(entity, version = initial_version, "Entity registered");
            Ok(true)
        })
    }

    /// Replaces the notes of a registered entity.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownEntity`] if `entity` has no row.
    pub fn set_notes(&self, entity: &str, notes: &str) -> Result<()> {
        if !self.ledger_present()? {
            return Err(LedgerError::UnknownEntity(entity.to_string()));
        }
        let cols = &self.dialect.ledger;
        let stmt = Update::table(self.dialect.ledger_table)
            .set(cols.notes, notes)
            .filter(Condition::eq(cols.name, entity))
            .build()?;
        if execute(self.conn, &stmt)? == 0 {
            return Err(LedgerError::UnknownEntity(entity.to_string()));
        }
        Ok(())
    }

    /// Removes the row of `entity`. Used when the entity itself is dropped.
    ///
    /// Returns `true` when a row was removed.
    pub fn remove(&self, entity: &str) -> Result<bool> {
        if !self.ledger_present()? {
            return Ok(false);
        }
        let stmt = Delete::from(self.dialect.ledger_table)
            .filter(Condition::eq(self.dialect.ledger.name, entity))
            .build()?;
        let removed = execute(self.conn, &stmt)? > 0;
        if removed {
            info!(entity, "Entity removed from ledger");
        }
        Ok(removed)
    }

    fn insert(&self, entity: &str, version: u32) -> Result<()> {
        let cols = &self.dialect.ledger;
        let stmt = Insert::into(self.dialect.ledger_table)
            .value(cols.name, entity)
            .value(cols.version, version)
            .value(cols.notes, "")
            .build()?;
        execute(self.conn, &stmt)?;
        Ok(())
    }
}

fn read_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<VersionRecord> {
    Ok(VersionRecord {
        entity_name: row.get(0)?,
        version: row.get(1)?,
        notes: row.get::<_, Option<String>>(2)?.unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ledger_conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        let dialect = Dialect::LATEST;
        VersionLedger::new(&conn, &dialect)
            .ensure_ledger_exists()
            .unwrap();
        conn
    }

    #[test]
    fn test_ensure_ledger_exists_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        let dialect = Dialect::LATEST;
        let ledger = VersionLedger::new(&conn, &dialect);
        assert!(ledger.ensure_ledger_exists().unwrap());
        assert!(!ledger.ensure_ledger_exists().unwrap());

        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='EntityVersions'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_unregistered_entity_is_zero() {
        let conn = ledger_conn();
        let dialect = Dialect::LATEST;
        let ledger = VersionLedger::new(&conn, &dialect);
        assert_eq!(ledger.get_version("Nobody").unwrap(), 0);
        assert!(ledger.record("Nobody").unwrap().is_none());
    }

    #[test]
    fn test_set_version_forward_and_equal() {
        let conn = ledger_conn();
        let dialect = Dialect::LATEST;
        let ledger = VersionLedger::new(&conn, &dialect);
        ledger.set_version("Users", 1).unwrap();
        ledger.set_version("Users", 1).unwrap();
        ledger.set_version("Users", 4).unwrap();
        assert_eq!(ledger.get_version("Users").unwrap(), 4);
        assert_eq!(ledger.records().unwrap().len(), 1);
    }

    #[test]
    fn test_regression_leaves_version_untouched() {
        let conn = ledger_conn();
        let dialect = Dialect::LATEST;
        let ledger = VersionLedger::new(&conn, &dialect);
        ledger.set_version("Users", 3).unwrap();
        let err = ledger.set_version("Users", 2).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::VersionRegression { current: 3, requested: 2, .. }
        ));
        assert_eq!(ledger.get_version("Users").unwrap(), 3);
    }

    #[test]
    fn test_register_does_not_overwrite() {
        let conn = ledger_conn();
        let dialect = Dialect::LATEST;
        let ledger = VersionLedger::new(&conn, &dialect);
        assert!(ledger.register("Users", 2).unwrap());
        assert!(!ledger.register("Users", 5).unwrap());
        assert_eq!(ledger.get_version("Users").unwrap(), 2);
    }

    #[test]
    fn test_notes_and_remove() {
        let conn = ledger_conn();
        let dialect = Dialect::LATEST;
        let ledger = VersionLedger::new(&conn, &dialect);
        ledger.set_version("Users", 1).unwrap();
        ledger.set_notes("Users", "added email").unwrap();
        assert_eq!(ledger.record("Users").unwrap().unwrap().notes, "added email");
        assert!(matches!(
            ledger.set_notes("Ghost", "x"),
            Err(LedgerError::UnknownEntity(_))
        ));

        assert!(ledger.remove("Users").unwrap());
        assert!(!ledger.remove("Users").unwrap());
        assert_eq!(ledger.get_version("Users").unwrap(), 0);
    }

    #[test]
    fn test_records_sorted_by_name() {
        let conn = ledger_conn();
        let dialect = Dialect::LATEST;
        let ledger = VersionLedger::new(&conn, &dialect);
        ledger.set_version("Zeta", 1).unwrap();
        ledger.set_version("Alpha", 2).unwrap();
        let names: Vec<_> = ledger
            .records()
            .unwrap()
            .into_iter()
            .map(|r| r.entity_name)
            .collect();
        assert_eq!(names, vec!["Alpha", "Zeta"]);
    }

    #[test]
    fn test_reads_ledger_without_unique_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE EntityVersions (name TEXT NOT NULL, version INT NOT NULL, notes TEXT NOT NULL, id INTEGER NOT NULL PRIMARY KEY);
             INSERT INTO EntityVersions (name, version, notes) VALUES ('Legacy', 7, '');",
        )
        .unwrap();
        let dialect = Dialect::LATEST;
        let ledger = VersionLedger::new(&conn, &dialect);
        assert!(!ledger.ensure_ledger_exists().unwrap());
        assert_eq!(ledger.get_version("Legacy").unwrap(), 7);
        ledger.set_version("Legacy", 8).unwrap();
        assert_eq!(ledger.get_version("Legacy").unwrap(), 8);
        assert_eq!(ledger.records().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_ledger_reads_as_unregistered() {
        let conn = Connection::open_in_memory().unwrap();
        let dialect = Dialect::LATEST;
        let ledger = VersionLedger::new(&conn, &dialect);
        assert_eq!(ledger.get_version("Users").unwrap(), 0);
        assert!(!ledger.contains("Users").unwrap());
        assert!(ledger.records().unwrap().is_empty());
        assert!(!ledger.remove("Users").unwrap());
        assert!(matches!(
            ledger.set_notes("Users", "x"),
            Err(LedgerError::UnknownEntity(_))
        ));

        let intro = Introspector::new(&conn, &dialect);
        assert!(!intro.table_exists("EntityVersions").unwrap());
    }
}
