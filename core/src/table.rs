//! Table definitions rendered to DDL.
//!
//! A [`TableDef`] is a list of typed [`ColumnDef`]s. Column types map onto
//! the type names used by already deployed schemas (`INT`, `TEXT`, `BOOL`,
//! `BIGINT`, `REAL`, `BLOB`), and the reserved id column becomes the
//! engine's row id alias.
//!
//! # Example
//!
//! ```
//! use entity_ledger_core::{ColumnDef, ColumnType, TableDef};
//!
//! let users = TableDef::new("Users")
//!     .column(ColumnDef::new("name", ColumnType::Text).default_value(""))
//!     .column(ColumnDef::new("age", ColumnType::Int).default_value(0))
//!     .column(ColumnDef::id("id"));
//!
//! assert_eq!(
//!     users.create_sql().unwrap(),
//!     "CREATE TABLE IF NOT EXISTS Users (name TEXT NOT NULL DEFAULT '', age INT NOT NULL DEFAULT 0, id INTEGER NOT NULL PRIMARY KEY)"
//! );
//! assert_eq!(users.drop_sql().unwrap(), "DROP TABLE IF EXISTS Users");
//! ```

use std::collections::HashSet;

use crate::dialect::Dialect;
use crate::error::{CoreError, Result};
use crate::statement::SqlValue;
use crate::validate::validate_identifier;

/// Storage type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// Integer primary key, aliasing the row id.
    Id,
    /// 32-bit integer.
    Int,
    /// Text.
    Text,
    /// Boolean stored as `0` / `1`.
    Bool,
    /// 64-bit integer.
    BigInt,
    /// Floating point.
    Real,
    /// Raw bytes.
    Blob,
}

impl ColumnType {
    /// SQL type name.
    pub fn sql_name(&self) -> &'static str {
        match self {
            Self::Id => "INTEGER",
            Self::Int => "INT",
            Self::Text => "TEXT",
            Self::Bool => "BOOL",
            Self::BigInt => "BIGINT",
            Self::Real => "REAL",
            Self::Blob => "BLOB",
        }
    }
}

/// One column of a [`TableDef`].
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Storage type.
    pub column_type: ColumnType,
    /// Allows `NULL` when set.
    pub nullable: bool,
    /// Adds a `UNIQUE` constraint when set.
    pub unique: bool,
    /// Literal `DEFAULT` value.
    pub default: Option<SqlValue>,
}

impl ColumnDef {
    /// Creates a `NOT NULL` column without a default.
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
            nullable: false,
            unique: false,
            default: None,
        }
    }

    /// Creates an integer primary key column.
    pub fn id(name: impl Into<String>) -> Self {
        Self::new(name, ColumnType::Id)
    }

    /// Allows `NULL` values.
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Adds a `UNIQUE` constraint.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets a literal default value.
    #[must_use]
    pub fn default_value(mut self, value: impl Into<SqlValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    fn render(&self) -> Result<String> {
        validate_identifier(&self.name)?;
        let mut sql = format!("{} {}", self.name, self.column_type.sql_name());
        if self.column_type == ColumnType::Id {
            sql.push_str(" NOT NULL PRIMARY KEY");
            return Ok(sql);
        }
        if !self.nullable {
            sql.push_str(" NOT NULL");
        }
        if self.unique {
            sql.push_str(" UNIQUE");
        }
        if let Some(default) = &self.default {
            sql.push_str(" DEFAULT ");
            sql.push_str(&default.to_literal());
        }
        Ok(sql)
    }
}

/// A table made of typed columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    /// Table name.
    pub name: String,
    /// Columns in declaration order.
    pub columns: Vec<ColumnDef>,
}

impl TableDef {
    /// Starts an empty table definition.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
        }
    }

    /// Appends a column.
    #[must_use]
    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    /// Definition of the version ledger table for `dialect`.
    ///
    /// Column order and types match ledgers created by earlier deployments.
    pub fn ledger(dialect: &Dialect) -> Self {
        let cols = &dialect.ledger;
        Self::new(dialect.ledger_table)
            .column(ColumnDef::new(cols.name, ColumnType::Text).unique())
            .column(ColumnDef::new(cols.version, ColumnType::Int).default_value(0))
            .column(ColumnDef::new(cols.notes, ColumnType::Text).default_value(""))
            .column(ColumnDef::id(cols.id))
    }

    /// Renders `CREATE TABLE IF NOT EXISTS`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyStatement`] for a table without columns,
    /// [`CoreError::DuplicateColumn`] when a name repeats and
    /// [`CoreError::InvalidIdentifier`] or [`CoreError::ReservedKeyword`] for
    /// unusable names.
    pub fn create_sql(&self) -> Result<String> {
        validate_identifier(&self.name)?;
        if self.columns.is_empty() {
            return Err(CoreError::EmptyStatement(format!(
                "table '{}' has no columns",
                self.name
            )));
        }
        let mut seen = HashSet::new();
        let mut defs = Vec::with_capacity(self.columns.len());
        for column in &self.columns {
            if !seen.insert(column.name.to_ascii_lowercase()) {
                return Err(CoreError::DuplicateColumn {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
            defs.push(column.render()?);
        }
        Ok(format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.name,
            defs.join(", ")
        ))
    }

    /// Renders `DROP TABLE IF EXISTS`.
    pub fn drop_sql(&self) -> Result<String> {
        drop_table_sql(&self.name)
    }
}

/// Renders `DROP TABLE IF EXISTS name` for any table.
pub fn drop_table_sql(name: &str) -> Result<String> {
    validate_identifier(name)?;
    Ok(format!("DROP TABLE IF EXISTS {name}"))
}
