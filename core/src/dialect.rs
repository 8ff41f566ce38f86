//! Reserved identifiers of the SQLite dialect used by the ledger.
//!
//! Every table and column name that must match an already deployed schema
//! lives in one immutable [`Dialect`] value. Components receive the dialect
//! explicitly instead of reaching for global constants.

use serde::Serialize;

/// Column names of the engine catalog (`sqlite_master`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CatalogColumns {
    /// Object kind: `table`, `index`, `view` or `trigger`.
    pub object_type: &'static str,
    /// Object name.
    pub name: &'static str,
    /// Table the object belongs to.
    pub table_name: &'static str,
    /// Engine storage locator.
    pub root_page: &'static str,
    /// DDL text that created the object.
    pub sql: &'static str,
}

/// Identifiers of the version ledger table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LedgerColumns {
    /// Entity name (unique key).
    pub name: &'static str,
    /// Stored schema version.
    pub version: &'static str,
    /// Free-form notes.
    pub notes: &'static str,
    /// Integer row id.
    pub id: &'static str,
}

/// Immutable set of reserved identifiers for one dialect revision.
///
/// `id_column`, `row_id`, `name_column`, `position_column` and
/// `type_column` name the reserved columns of entity tables. The ledger
/// never reads them; they are exported so callers writing entity DDL and
/// queries use the same spelling. `revision` identifies the identifier set
/// and is not stored anywhere.
///
/// # Examples
///
/// ```
/// use entity_ledger_core::Dialect;
///
/// let dialect = Dialect::LATEST;
/// assert_eq!(dialect.ledger_table, "EntityVersions");
/// assert_eq!(dialect.ledger.version, "version");
/// assert!(dialect.is_reserved_table("android_metadata"));
/// assert!(!dialect.is_reserved_table("Users"));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dialect {
    /// Revision of this identifier set.
    pub revision: u32,
    /// Name of the version ledger table.
    pub ledger_table: &'static str,
    /// Ledger column names.
    pub ledger: LedgerColumns,
    /// Reserved integer id column of every entity table.
    pub id_column: &'static str,
    /// Engine-native row identifier alias.
    pub row_id: &'static str,
    /// Conventional name column.
    pub name_column: &'static str,
    /// Optional ordering column.
    pub position_column: &'static str,
    /// Conventional type column.
    pub type_column: &'static str,
    /// Catalog `type` value for tables.
    pub table_type: &'static str,
    /// Platform metadata table that is never an application table.
    pub android_metadata: &'static str,
    /// Engine catalog table.
    pub catalog_table: &'static str,
    /// Catalog column names.
    pub catalog: CatalogColumns,
    /// Prefix of engine-internal tables.
    pub engine_prefix: &'static str,
    /// Path that opens an in-memory database.
    pub in_memory: &'static str,
}

impl Dialect {
    /// The authoritative identifier set.
    pub const LATEST: Dialect = Dialect {
        revision: 1,
        ledger_table: "EntityVersions",
        ledger: LedgerColumns {
            name: "name",
            version: "version",
            notes: "notes",
            id: "id",
        },
        id_column: "id",
        row_id: "ROWID",
        name_column: "name",
        position_column: "position",
        type_column: "type",
        table_type: "table",
        android_metadata: "android_metadata",
        catalog_table: "sqlite_master",
        catalog: CatalogColumns {
            object_type: "type",
            name: "name",
            table_name: "tbl_name",
            root_page: "rootpage",
            sql: "sql",
        },
        engine_prefix: "sqlite_",
        in_memory: ":memory:",
    };

    /// Returns `true` for tables owned by the engine, the platform or the
    /// ledger itself.
    ///
    /// Engine tables are matched by prefix without regard to case, as
    /// SQLite reserves `sqlite_` in any letter case.
    pub fn is_reserved_table(&self, name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        lower.starts_with(self.engine_prefix)
            || name.eq_ignore_ascii_case(self.android_metadata)
            || name.eq_ignore_ascii_case(self.ledger_table)
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::LATEST
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_latest() {
        assert_eq!(Dialect::default(), Dialect::LATEST);
    }

    #[test]
    fn test_catalog_identifiers() {
        let d = Dialect::LATEST;
        assert_eq!(d.catalog_table, "sqlite_master");
        assert_eq!(d.catalog.sql, "sql");
        assert_eq!(d.catalog.table_name, "tbl_name");
        assert_eq!(d.catalog.root_page, "rootpage");
        assert_eq!(d.catalog.object_type, "type");
        assert_eq!(d.catalog.name, "name");
    }

    #[test]
    fn test_reserved_columns() {
        let d = Dialect::LATEST;
        assert_eq!(d.revision, 1);
        assert_eq!(d.id_column, d.ledger.id);
        assert_eq!(d.row_id, "ROWID");
        assert_eq!(d.name_column, "name");
        assert_eq!(d.position_column, "position");
        assert_eq!(d.type_column, "type");
        assert_eq!(d.in_memory, ":memory:");
    }

    #[test]
    fn test_reserved_tables() {
        let d = Dialect::LATEST;
        assert!(d.is_reserved_table("sqlite_sequence"));
        assert!(d.is_reserved_table("SQLITE_stat1"));
        assert!(d.is_reserved_table("android_metadata"));
        assert!(d.is_reserved_table("EntityVersions"));
        assert!(!d.is_reserved_table("Users"));
        assert!(!d.is_reserved_table("my_sqlite_notes"));
    }
}
