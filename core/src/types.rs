//! Ledger and catalog data model.
//!
//! [`VersionRecord`] is owned by the ledger. [`CatalogEntry`] mirrors one
//! row of the engine catalog and is never written by this crate.
//! [`SchemaDrift`] describes a live definition that differs from the
//! declared one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Schema state of one tracked entity.
///
/// # Examples
///
/// ```
/// use entity_ledger_core::VersionRecord;
///
/// let record = VersionRecord::new("Users", 3);
/// assert_eq!(record.entity_name, "Users");
/// assert_eq!(record.version, 3);
/// assert!(record.notes.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    /// Entity name, unique within the ledger.
    pub entity_name: String,
    /// Current schema revision; never decreases.
    pub version: u32,
    /// Free-form notes.
    #[serde(default)]
    pub notes: String,
}

impl VersionRecord {
    /// Creates a record with empty notes.
    pub fn new(entity_name: impl Into<String>, version: u32) -> Self {
        Self {
            entity_name: entity_name.into(),
            version,
            notes: String::new(),
        }
    }
}

/// Kind of schema object listed in the engine catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    /// A table.
    Table,
    /// An index.
    Index,
    /// A view.
    View,
    /// A trigger.
    Trigger,
}

impl ObjectType {
    /// Catalog spelling of this object type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::Index => "index",
            Self::View => "view",
            Self::Trigger => "trigger",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "table" => Ok(Self::Table),
            "index" => Ok(Self::Index),
            "view" => Ok(Self::View),
            "trigger" => Ok(Self::Trigger),
            other => Err(CoreError::UnknownObjectType(other.to_string())),
        }
    }
}

/// One row of the engine catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Object name.
    pub name: String,
    /// Object kind.
    pub object_type: ObjectType,
    /// Table the object belongs to (the object itself for tables).
    pub table_name: String,
    /// DDL text; absent for automatically created indexes.
    pub definition_sql: Option<String>,
    /// Engine storage locator, passed through unmodified.
    pub root_page: i64,
}

/// A live table definition that differs from the declared one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDrift {
    /// Table whose definition drifted.
    pub table: String,
    /// Definition declared in code or configuration.
    pub expected: String,
    /// Definition stored in the catalog.
    pub actual: String,
}

impl fmt::Display for SchemaDrift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "schema drift on '{}': expected `{}`, found `{}`",
            self.table, self.expected, self.actual
        )
    }
}

/// Normalizes DDL text for drift comparison.
///
/// Outside `'...'` literals: collapses whitespace runs, drops whitespace
/// next to parentheses and commas and lowercases. Literals are kept
/// verbatim. Also removes a trailing `;` and the `IF NOT EXISTS` clause of
/// the statement head. The engine strips `IF NOT EXISTS` when it stores a
/// definition, so both sides must agree on that.
///
/// # Examples
///
/// ```
/// use entity_ledger_core::normalize_definition;
///
/// assert_eq!(
///     normalize_definition("CREATE TABLE IF NOT EXISTS Users (id INTEGER ,  name TEXT);"),
///     normalize_definition("create table Users(id INTEGER, name TEXT)"),
/// );
/// ```
pub fn normalize_definition(sql: &str) -> String {
    let sql = sql.trim().trim_end_matches(';').trim_end();
    let mut out = String::with_capacity(sql.len());
    let mut in_literal = false;
    let mut pending_space = false;

    for c in sql.chars() {
        if in_literal {
            out.push(c);
            if c == '\'' {
                in_literal = false;
            }
            continue;
        }
        match c {
            c if c.is_whitespace() => pending_space = true,
            '(' | ')' | ',' => {
                pending_space = false;
                out.push(c);
            }
            _ => {
                if pending_space && !out.is_empty() && !out.ends_with(['(', ',']) {
                    out.push(' ');
                }
                pending_space = false;
                if c == '\'' {
                    in_literal = true;
                }
                out.push(c.to_ascii_lowercase());
            }
        }
    }

    const GUARD: &str = " if not exists";
    let head_end = out.find(['(', '\'']).unwrap_or(out.len());
    if let Some(pos) = out[..head_end].find(" if not exists ") {
        out.replace_range(pos..pos + GUARD.len(), "");
    }
    out
}
