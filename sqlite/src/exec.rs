//! Execution of built statements against a rusqlite connection.
//!
//! Bridges [`Statement`] values from the core crate to rusqlite: parameters
//! are bound positionally, rows are mapped by caller-supplied closures, and
//! multi-statement work runs inside [`atomically`].

use entity_ledger_core::{SqlValue, Statement};
use rusqlite::types::Value;
use rusqlite::{Connection, OptionalExtension, Row, params_from_iter};

use crate::error::Result;

fn bind(params: &[SqlValue]) -> Vec<Value> {
    params
        .iter()
        .map(|p| match p {
            SqlValue::Null => Value::Null,
            SqlValue::Integer(i) => Value::Integer(*i),
            SqlValue::Real(r) => Value::Real(*r),
            SqlValue::Text(s) => Value::Text(s.clone()),
            SqlValue::Blob(b) => Value::Blob(b.clone()),
        })
        .collect()
}

/// Executes a statement and returns the number of changed rows.
pub fn execute(conn: &Connection, stmt: &Statement) -> Result<usize> {
    let values = bind(&stmt.params);
    let changed = conn.execute(&stmt.sql, params_from_iter(values.iter()))?;
    Ok(changed)
}

/// Runs a query and maps every row.
pub fn query_rows<T, F>(conn: &Connection, stmt: &Statement, map: F) -> Result<Vec<T>>
where
    F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
{
    let values = bind(&stmt.params);
    let mut prepared = conn.prepare(&stmt.sql)?;
    let rows = prepared
        .query_map(params_from_iter(values.iter()), map)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Runs a query and maps the first row, if any.
pub fn query_optional<T, F>(conn: &Connection, stmt: &Statement, map: F) -> Result<Option<T>>
where
    F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
{
    let values = bind(&stmt.params);
    let mut prepared = conn.prepare(&stmt.sql)?;
    let row = prepared
        .query_row(params_from_iter(values.iter()), map)
        .optional()?;
    Ok(row)
}

/// Runs `work` inside a transaction.
///
/// Commits when `work` succeeds and rolls back on every other exit path,
/// including early returns through `?`. When the connection is already
/// inside a transaction, `work` joins it and the outer scope decides.
pub fn atomically<T, F>(conn: &Connection, work: F) -> Result<T>
where
    F: FnOnce(&Connection) -> Result<T>,
{
    if !conn.is_autocommit() {
        return work(conn);
    }
    let tx = conn.unchecked_transaction()?;
    let value = work(&*tx)?;
    tx.commit()?;
    Ok(value)
}
