//! Identifier validation.
//!
//! Table and column names are spliced into SQL text unquoted, so they are
//! checked against a conservative grammar before rendering and SQL keywords
//! are refused. Values never go through here; they are always bound as
//! parameters.

use crate::error::{CoreError, Result};

/// Keywords recognised by SQLite.
const SQL_KEYWORDS: &[&str] = &[
    "ABORT", "ACTION", "ADD", "AFTER", "ALL", "ALTER", "ALWAYS", "ANALYZE", "AND", "AS", "ASC",
    "ATTACH", "AUTOINCREMENT", "BEFORE", "BEGIN", "BETWEEN", "BY", "CASCADE", "CASE", "CAST",
    "CHECK", "COLLATE", "COLUMN", "COMMIT", "CONFLICT", "CONSTRAINT", "CREATE", "CROSS",
    "CURRENT", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "DATABASE", "DEFAULT",
    "DEFERRABLE", "DEFERRED", "DELETE", "DESC", "DETACH", "DISTINCT", "DO", "DROP", "EACH",
    "ELSE", "END", "ESCAPE", "EXCEPT", "EXCLUDE", "EXCLUSIVE", "EXISTS", "EXPLAIN", "FAIL",
    "FILTER", "FIRST", "FOLLOWING", "FOR", "FOREIGN", "FROM", "FULL", "GENERATED", "GLOB",
    "GROUP", "GROUPS", "HAVING", "IF", "IGNORE", "IMMEDIATE", "IN", "INDEX", "INDEXED",
    "INITIALLY", "INNER", "INSERT", "INSTEAD", "INTERSECT", "INTO", "IS", "ISNULL", "JOIN",
    "KEY", "LAST", "LEFT", "LIKE", "LIMIT", "MATCH", "MATERIALIZED", "NATURAL", "NO", "NOT",
    "NOTHING", "NOTNULL", "NULL", "NULLS", "OF", "OFFSET", "ON", "OR", "ORDER", "OTHERS",
    "OUTER", "OVER", "PARTITION", "PLAN", "PRAGMA", "PRECEDING", "PRIMARY", "QUERY", "RAISE",
    "RANGE", "RECURSIVE", "REFERENCES", "REGEXP", "REINDEX", "RELEASE", "RENAME", "REPLACE",
    "RESTRICT", "RETURNING", "RIGHT", "ROLLBACK", "ROW", "ROWS", "SAVEPOINT", "SELECT", "SET",
    "TABLE", "TEMP", "TEMPORARY", "THEN", "TIES", "TO", "TRANSACTION", "TRIGGER", "UNBOUNDED",
    "UNION", "UNIQUE", "UPDATE", "USING", "VACUUM", "VALUES", "VIEW", "VIRTUAL", "WHEN",
    "WHERE", "WINDOW", "WITH", "WITHOUT",
];

/// Returns `true` if `word` is an SQLite keyword, in any letter case.
pub fn is_sql_keyword(word: &str) -> bool {
    SQL_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(word))
}

/// Validates a bare identifier: `[A-Za-z_][A-Za-z0-9_]*` that is not an
/// SQL keyword.
///
/// # Errors
///
/// Returns [`CoreError::InvalidIdentifier`] for malformed names and
/// [`CoreError::ReservedKeyword`] for keywords such as `order`.
///
/// # Examples
///
/// ```
/// use entity_ledger_core::validate_identifier;
///
/// assert!(validate_identifier("EntityVersions").is_ok());
/// assert!(validate_identifier("_rowid_").is_ok());
/// assert!(validate_identifier("1abc").is_err());
/// assert!(validate_identifier("name; DROP TABLE x").is_err());
/// assert!(validate_identifier("order").is_err());
/// ```
pub fn validate_identifier(ident: &str) -> Result<()> {
    let mut chars = ident.chars();
    let valid = match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if !valid {
        return Err(CoreError::InvalidIdentifier(ident.to_string()));
    }
    if is_sql_keyword(ident) {
        return Err(CoreError::ReservedKeyword(ident.to_string()));
    }
    Ok(())
}

/// Validates a column reference, optionally qualified as `table.column`.
pub fn validate_column_ref(column: &str) -> Result<()> {
    match column.split_once('.') {
        Some((table, col)) => {
            validate_identifier(table).and_then(|()| validate_identifier(col))
        }
        None => validate_identifier(column),
    }
}
