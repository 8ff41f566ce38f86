//! Read-only access to the engine catalog.
//!
//! [`Introspector`] answers "does this table exist, and with what
//! definition?" from `sqlite_master`. It never writes to the catalog and
//! never parses the stored DDL beyond normalised text comparison.

use entity_ledger_core::{
    CatalogEntry, Condition, Dialect, Direction, ObjectType, Projection, SchemaDrift, Select,
    normalize_definition,
};
use rusqlite::Connection;
use tracing::warn;

use crate::error::Result;
use crate::exec::{query_optional, query_rows};

/// Catalog reader bound to a connection and a dialect.
///
/// # Examples
///
/// ```
/// use entity_ledger_core::Dialect;
/// use entity_ledger_sqlite::Introspector;
/// use rusqlite::Connection;
///
/// let conn = Connection::open_in_memory().unwrap();
/// conn.execute_batch("CREATE TABLE Users (id INTEGER PRIMARY KEY)").unwrap();
///
/// let dialect = Dialect::LATEST;
/// let introspector = Introspector::new(&conn, &dialect);
/// assert!(introspector.table_exists("Users").unwrap());
/// assert!(introspector.get_definition("Missing").unwrap().is_none());
/// ```
pub struct Introspector<'a> {
    conn: &'a Connection,
    dialect: &'a Dialect,
}

impl<'a> Introspector<'a> {
    /// Creates an introspector over `conn`.
    pub fn new(conn: &'a Connection, dialect: &'a Dialect) -> Self {
        Self { conn, dialect }
    }

    fn table_lookup(&self, name: &str) -> Select {
        let cols = &self.dialect.catalog;
        Select::from(self.dialect.catalog_table)
            .filter(Condition::eq(cols.object_type, self.dialect.table_type))
            .filter(Condition::eq(cols.name, name))
    }

    /// Returns `true` if a table named `name` exists.
    ///
    /// # Errors
    ///
    /// Returns [`StorageUnavailable`](crate::LedgerError::StorageUnavailable)
    /// if the catalog cannot be read.
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let stmt = self
            .table_lookup(name)
            .project(Projection::CountAll)
            .build()?;
        let count = query_optional(self.conn, &stmt, |row| row.get::<_, i64>(0))?;
        Ok(count.unwrap_or(0) > 0)
    }

    /// Returns the stored `CREATE TABLE` text of `name`, or `None` when the
    /// table does not exist.
    pub fn get_definition(&self, name: &str) -> Result<Option<String>> {
        let stmt = self
            .table_lookup(name)
            .columns([self.dialect.catalog.sql])
            .build()?;
        let sql = query_optional(self.conn, &stmt, |row| row.get::<_, Option<String>>(0))?;
        Ok(sql.flatten())
    }

    /// Lists every catalog object, ordered by type then name.
    pub fn entries(&self) -> Result<Vec<CatalogEntry>> {
        let cols = &self.dialect.catalog;
        let stmt = Select::from(self.dialect.catalog_table)
            .columns([
                cols.name,
                cols.object_type,
                cols.table_name,
                cols.sql,
                cols.root_page,
            ])
            .order_by(cols.object_type, Direction::Asc)
            .order_by(cols.name, Direction::Asc)
            .build()?;
        let raw = query_rows(self.conn, &stmt, |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, Option<i64>>(4)?,
            ))
        })?;

        let mut entries = Vec::with_capacity(raw.len());
        for (name, kind, table_name, definition_sql, root_page) in raw {
            entries.push(CatalogEntry {
                name,
                object_type: kind.parse::<ObjectType>()?,
                table_name,
                definition_sql,
                root_page: root_page.unwrap_or(0),
            });
        }
        Ok(entries)
    }

    /// Lists application tables, leaving out engine, platform and ledger
    /// tables.
    pub fn table_names(&self) -> Result<Vec<String>> {
        let cols = &self.dialect.catalog;
        let stmt = Select::from(self.dialect.catalog_table)
            .columns([cols.name])
            .filter(Condition::eq(cols.object_type, self.dialect.table_type))
            .order_by(cols.name, Direction::Asc)
            .build()?;
        let names = query_rows(self.conn, &stmt, |row| row.get::<_, String>(0))?;
        Ok(names
            .into_iter()
            .filter(|n| !self.dialect.is_reserved_table(n))
            .collect())
    }

    /// Compares the stored definition of `table` with `expected`.
    ///
    /// Returns `None` when they match after normalisation or when the table
    /// does not exist. Detection only; nothing is altered.
    pub fn check_drift(&self, table: &str, expected: &str) -> Result<Option<SchemaDrift>> {
        let Some(actual) = self.get_definition(table)? else {
            return Ok(None);
        };
        if normalize_definition(&actual) == normalize_definition(expected) {
            return Ok(None);
        }
        warn!(table, expected, actual = %actual, "Schema drift detected");
        Ok(Some(SchemaDrift {
            table: table.to_string(),
            expected: expected.to_string(),
            actual,
        }))
    }
}
