//! Typed statement builder.
//!
//! Queries are assembled from [`Clause`] values and rendered to SQL text only
//! at the boundary, in [`Select::build`], [`Insert::build`],
//! [`Update::build`] and [`Delete::build`]. Identifiers are validated before
//! they are spliced into the text; values always travel as `?` parameters in
//! [`Statement::params`].
//!
//! # Example
//!
//! ```
//! use entity_ledger_core::{Condition, Direction, Select};
//!
//! let stmt = Select::from("Users")
//!     .columns(["id", "name"])
//!     .filter(Condition::eq("active", 1).and(Condition::like("name", "A%")))
//!     .order_by("name", Direction::Asc)
//!     .limit(10)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     stmt.sql,
//!     "SELECT id, name FROM Users WHERE (active = ? AND name LIKE ?) ORDER BY name ASC LIMIT 10"
//! );
//! assert_eq!(stmt.params.len(), 2);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::validate::{validate_column_ref, validate_identifier};

/// A value bound to a `?` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SqlValue {
    /// SQL `NULL`.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Raw bytes.
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Renders the value as a SQL literal, for DDL `DEFAULT` clauses where
    /// parameters are not accepted.
    pub fn to_literal(&self) -> String {
        match self {
            Self::Null => "NULL".to_string(),
            Self::Integer(i) => i.to_string(),
            Self::Real(r) => {
                let text = r.to_string();
                if text.contains(['.', 'e', 'E']) || !r.is_finite() {
                    text
                } else {
                    format!("{text}.0")
                }
            }
            Self::Text(s) => format!("'{}'", s.replace('\'', "''")),
            Self::Blob(bytes) => {
                let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        Self::Integer(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<u32> for SqlValue {
    fn from(v: u32) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        Self::Integer(i64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        Self::Real(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        Self::Text(v.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        Self::Text(v)
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        Self::Blob(v)
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

/// Rendered SQL text with its bound parameters, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    /// SQL text with `?` placeholders.
    pub sql: String,
    /// Values for the placeholders.
    pub params: Vec<SqlValue>,
}

/// Binary comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,
    /// `LIKE`
    Like,
    /// `NOT LIKE`
    NotLike,
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
        })
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A bound value.
    Value(SqlValue),
    /// Another column.
    Column(String),
    /// A scalar sub-select.
    Subquery(Box<Select>),
}

/// A boolean condition for `WHERE`, `JOIN ... ON` clauses.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `column op operand`
    Compare {
        /// Left-hand column.
        column: String,
        /// Operator.
        op: CompareOp,
        /// Right-hand side.
        operand: Operand,
    },
    /// `column [NOT] IN (?, ...)`
    In {
        /// Left-hand column.
        column: String,
        /// Candidate values; must not be empty.
        values: Vec<SqlValue>,
        /// Renders `NOT IN` when set.
        negated: bool,
    },
    /// `column IS [NOT] NULL`
    IsNull {
        /// Column to test.
        column: String,
        /// Renders `IS NOT NULL` when set.
        negated: bool,
    },
    /// All conditions hold.
    And(Vec<Condition>),
    /// Any condition holds.
    Or(Vec<Condition>),
    /// The condition does not hold.
    Not(Box<Condition>),
}

impl Condition {
    fn compare(column: impl Into<String>, op: CompareOp, value: impl Into<SqlValue>) -> Self {
        Self::Compare {
            column: column.into(),
            op,
            operand: Operand::Value(value.into()),
        }
    }

    /// `column = value`
    pub fn eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    /// `column != value`
    pub fn not_eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::NotEq, value)
    }

    /// `column < value`
    pub fn lt(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::Lt, value)
    }

    /// `column <= value`
    pub fn lt_eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::LtEq, value)
    }

    /// `column > value`
    pub fn gt(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::Gt, value)
    }

    /// `column >= value`
    pub fn gt_eq(column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        Self::compare(column, CompareOp::GtEq, value)
    }

    /// `column LIKE pattern`
    pub fn like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::compare(column, CompareOp::Like, SqlValue::Text(pattern.into()))
    }

    /// `column NOT LIKE pattern`
    pub fn not_like(column: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::compare(column, CompareOp::NotLike, SqlValue::Text(pattern.into()))
    }

    /// Compares two columns, e.g. for join predicates.
    pub fn columns(left: impl Into<String>, op: CompareOp, right: impl Into<String>) -> Self {
        Self::Compare {
            column: left.into(),
            op,
            operand: Operand::Column(right.into()),
        }
    }

    /// Compares a column against a scalar sub-select.
    pub fn subquery(column: impl Into<String>, op: CompareOp, select: Select) -> Self {
        Self::Compare {
            column: column.into(),
            op,
            operand: Operand::Subquery(Box::new(select)),
        }
    }

    /// `column IN (values...)`
    pub fn is_in<V: Into<SqlValue>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: false,
        }
    }

    /// `column NOT IN (values...)`
    pub fn not_in<V: Into<SqlValue>>(
        column: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
            negated: true,
        }
    }

    /// `column IS NULL`
    pub fn is_null(column: impl Into<String>) -> Self {
        Self::IsNull {
            column: column.into(),
            negated: false,
        }
    }

    /// `column IS NOT NULL`
    pub fn is_not_null(column: impl Into<String>) -> Self {
        Self::IsNull {
            column: column.into(),
            negated: true,
        }
    }

    /// Combines with `AND`, flattening nested conjunctions.
    #[must_use]
    pub fn and(self, other: Condition) -> Self {
        match self {
            Self::And(mut parts) => {
                parts.push(other);
                Self::And(parts)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Combines with `OR`, flattening nested disjunctions.
    #[must_use]
    pub fn or(self, other: Condition) -> Self {
        match self {
            Self::Or(mut parts) => {
                parts.push(other);
                Self::Or(parts)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Negates the condition.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    fn render(&self, sql: &mut String, params: &mut Vec<SqlValue>) -> Result<()> {
        match self {
            Self::Compare {
                column,
                op,
                operand,
            } => {
                validate_column_ref(column)?;
                sql.push_str(column);
                sql.push(' ');
                sql.push_str(&op.to_string());
                sql.push(' ');
                match operand {
                    Operand::Value(value) => {
                        sql.push('?');
                        params.push(value.clone());
                    }
                    Operand::Column(other) => {
                        validate_column_ref(other)?;
                        sql.push_str(other);
                    }
                    Operand::Subquery(select) => {
                        sql.push('(');
                        select.render(sql, params)?;
                        sql.push(')');
                    }
                }
            }
            Self::In {
                column,
                values,
                negated,
            } => {
                validate_column_ref(column)?;
                if values.is_empty() {
                    return Err(CoreError::EmptyInList(column.clone()));
                }
                sql.push_str(column);
                sql.push_str(if *negated { " NOT IN (" } else { " IN (" });
                sql.push_str(&vec!["?"; values.len()].join(", "));
                sql.push(')');
                params.extend(values.iter().cloned());
            }
            Self::IsNull { column, negated } => {
                validate_column_ref(column)?;
                sql.push_str(column);
                sql.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Self::And(parts) | Self::Or(parts) => {
                if parts.is_empty() {
                    return Err(CoreError::EmptyStatement("empty condition group".into()));
                }
                let joiner = if matches!(self, Self::And(_)) {
                    " AND "
                } else {
                    " OR "
                };
                sql.push('(');
                for (idx, part) in parts.iter().enumerate() {
                    if idx > 0 {
                        sql.push_str(joiner);
                    }
                    part.render(sql, params)?;
                }
                sql.push(')');
            }
            Self::Not(inner) => {
                sql.push_str("NOT (");
                inner.render(sql, params)?;
                sql.push(')');
            }
        }
        Ok(())
    }
}

/// Join flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `CROSS JOIN`
    Cross,
}

impl fmt::Display for JoinKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Cross => "CROSS JOIN",
        })
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending (the default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

/// What an `ORDER BY` entry sorts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderKey {
    /// A column.
    Column(String),
    /// `RANDOM()`
    Random,
}

/// One clause of a query.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// A `WHERE` condition; several are combined with `AND`.
    Comparison(Condition),
    /// A join against another table.
    Join {
        /// Join flavour.
        kind: JoinKind,
        /// Joined table.
        table: String,
        /// Join predicate; ignored for cross joins.
        on: Option<Condition>,
    },
    /// An `ORDER BY` entry.
    Ordering {
        /// Sort key.
        key: OrderKey,
        /// Sort direction.
        direction: Direction,
    },
    /// A `GROUP BY` column.
    Grouping(String),
}

/// Selected output expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// `*`
    All,
    /// A column.
    Column(String),
    /// `COUNT(*)`
    CountAll,
    /// `MAX(column)`
    Max(String),
    /// `MIN(column)`
    Min(String),
}

impl Projection {
    fn render(&self) -> Result<String> {
        Ok(match self {
            Self::All => "*".to_string(),
            Self::Column(c) => {
                validate_column_ref(c)?;
                c.clone()
            }
            Self::CountAll => "COUNT(*)".to_string(),
            Self::Max(c) => {
                validate_column_ref(c)?;
                format!("MAX({c})")
            }
            Self::Min(c) => {
                validate_column_ref(c)?;
                format!("MIN({c})")
            }
        })
    }
}

fn render_where<'a>(
    conditions: impl Iterator<Item = &'a Condition>,
    sql: &mut String,
    params: &mut Vec<SqlValue>,
) -> Result<()> {
    for (idx, cond) in conditions.enumerate() {
        sql.push_str(if idx == 0 { " WHERE " } else { " AND " });
        cond.render(sql, params)?;
    }
    Ok(())
}

/// `SELECT` builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Select {
    table: String,
    projections: Vec<Projection>,
    distinct: bool,
    clauses: Vec<Clause>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Select {
    /// Starts a `SELECT * FROM table`.
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            projections: Vec::new(),
            distinct: false,
            clauses: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Selects the given columns.
    #[must_use]
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projections
            .extend(columns.into_iter().map(|c| Projection::Column(c.into())));
        self
    }

    /// Adds one projection.
    #[must_use]
    pub fn project(mut self, projection: Projection) -> Self {
        self.projections.push(projection);
        self
    }

    /// Shorthand for `SELECT COUNT(*)`.
    #[must_use]
    pub fn count(self) -> Self {
        self.project(Projection::CountAll)
    }

    /// Renders `SELECT DISTINCT`.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Adds a raw clause.
    #[must_use]
    pub fn clause(mut self, clause: Clause) -> Self {
        self.clauses.push(clause);
        self
    }

    /// Adds a `WHERE` condition, `AND`-ed with earlier ones.
    #[must_use]
    pub fn filter(self, condition: Condition) -> Self {
        self.clause(Clause::Comparison(condition))
    }

    /// Adds a join.
    #[must_use]
    pub fn join(self, kind: JoinKind, table: impl Into<String>, on: Option<Condition>) -> Self {
        self.clause(Clause::Join {
            kind,
            table: table.into(),
            on,
        })
    }

    /// Adds an `ORDER BY` column.
    #[must_use]
    pub fn order_by(self, column: impl Into<String>, direction: Direction) -> Self {
        self.clause(Clause::Ordering {
            key: OrderKey::Column(column.into()),
            direction,
        })
    }

    /// Orders by `RANDOM()`.
    #[must_use]
    pub fn order_random(self) -> Self {
        self.clause(Clause::Ordering {
            key: OrderKey::Random,
            direction: Direction::Asc,
        })
    }

    /// Adds a `GROUP BY` column.
    #[must_use]
    pub fn group_by(self, column: impl Into<String>) -> Self {
        self.clause(Clause::Grouping(column.into()))
    }

    /// Sets `LIMIT`.
    #[must_use]
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sets `OFFSET`; rendered as `LIMIT -1 OFFSET n` when no limit is set.
    #[must_use]
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Renders the statement.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidIdentifier`] for malformed table or column
    /// names, [`CoreError::ReservedKeyword`] for SQL keywords and
    /// [`CoreError::EmptyInList`] for `IN` lists without values.
    pub fn build(&self) -> Result<Statement> {
        let mut sql = String::new();
        let mut params = Vec::new();
        self.render(&mut sql, &mut params)?;
        Ok(Statement { sql, params })
    }

    fn render(&self, sql: &mut String, params: &mut Vec<SqlValue>) -> Result<()> {
        validate_identifier(&self.table)?;

        sql.push_str(if self.distinct { "SELECT DISTINCT " } else { "SELECT " });
        if self.projections.is_empty() {
            sql.push('*');
        } else {
            let rendered = self
                .projections
                .iter()
                .map(Projection::render)
                .collect::<Result<Vec<_>>>()?;
            sql.push_str(&rendered.join(", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(&self.table);

        for clause in &self.clauses {
            if let Clause::Join { kind, table, on } = clause {
                validate_identifier(table)?;
                sql.push(' ');
                sql.push_str(&kind.to_string());
                sql.push(' ');
                sql.push_str(table);
                if let (Some(cond), false) = (on, *kind == JoinKind::Cross) {
                    sql.push_str(" ON ");
                    cond.render(sql, params)?;
                }
            }
        }

        render_where(
            self.clauses.iter().filter_map(|c| match c {
                Clause::Comparison(cond) => Some(cond),
                _ => None,
            }),
            sql,
            params,
        )?;

        let groups = self
            .clauses
            .iter()
            .filter_map(|c| match c {
                Clause::Grouping(col) => Some(col),
                _ => None,
            })
            .map(|col| validate_column_ref(col).map(|()| col.as_str()))
            .collect::<Result<Vec<_>>>()?;
        if !groups.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&groups.join(", "));
        }

        let mut orderings = Vec::new();
        for clause in &self.clauses {
            if let Clause::Ordering { key, direction } = clause {
                match key {
                    OrderKey::Random => orderings.push("RANDOM()".to_string()),
                    OrderKey::Column(col) => {
                        validate_column_ref(col)?;
                        orderings.push(match direction {
                            Direction::Asc => format!("{col} ASC"),
                            Direction::Desc => format!("{col} DESC"),
                        });
                    }
                }
            }
        }
        if !orderings.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&orderings.join(", "));
        }

        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}"));
            }
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }
        Ok(())
    }
}

/// `INSERT` builder for a single row.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    table: String,
    values: Vec<(String, SqlValue)>,
}

impl Insert {
    /// Starts an `INSERT INTO table`.
    pub fn into(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
        }
    }

    /// Sets a column value.
    #[must_use]
    pub fn value(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }

    /// Renders the statement.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyStatement`] when no values were set.
    pub fn build(&self) -> Result<Statement> {
        validate_identifier(&self.table)?;
        if self.values.is_empty() {
            return Err(CoreError::EmptyStatement(format!(
                "INSERT INTO {} has no values",
                self.table
            )));
        }
        let mut columns = Vec::with_capacity(self.values.len());
        for (column, _) in &self.values {
            validate_identifier(column)?;
            columns.push(column.as_str());
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            self.table,
            columns.join(", "),
            vec!["?"; columns.len()].join(", ")
        );
        let params = self.values.iter().map(|(_, v)| v.clone()).collect();
        Ok(Statement { sql, params })
    }
}

/// Right-hand side of an `UPDATE ... SET` assignment.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    /// `column = ?`
    Value(SqlValue),
    /// `column = other_column`
    Column(String),
    /// `column = column + ?`
    Add(SqlValue),
}

/// `UPDATE` builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    table: String,
    assignments: Vec<(String, Assignment)>,
    conditions: Vec<Condition>,
}

impl Update {
    /// Starts an `UPDATE table`.
    pub fn table(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            assignments: Vec::new(),
            conditions: Vec::new(),
        }
    }

    /// `SET column = value`
    #[must_use]
    pub fn set(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.assignments
            .push((column.into(), Assignment::Value(value.into())));
        self
    }

    /// `SET column = other`
    #[must_use]
    pub fn set_column(mut self, column: impl Into<String>, other: impl Into<String>) -> Self {
        self.assignments
            .push((column.into(), Assignment::Column(other.into())));
        self
    }

    /// `SET column = column + delta`
    #[must_use]
    pub fn add(mut self, column: impl Into<String>, delta: impl Into<SqlValue>) -> Self {
        self.assignments
            .push((column.into(), Assignment::Add(delta.into())));
        self
    }

    /// Adds a `WHERE` condition, `AND`-ed with earlier ones.
    #[must_use]
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Renders the statement.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EmptyStatement`] when no assignments were set.
    pub fn build(&self) -> Result<Statement> {
        validate_identifier(&self.table)?;
        if self.assignments.is_empty() {
            return Err(CoreError::EmptyStatement(format!(
                "UPDATE {} has no assignments",
                self.table
            )));
        }
        let mut sql = format!("UPDATE {} SET ", self.table);
        let mut params = Vec::new();
        for (idx, (column, assignment)) in self.assignments.iter().enumerate() {
            validate_identifier(column)?;
            if idx > 0 {
                sql.push_str(", ");
            }
            match assignment {
                Assignment::Value(value) => {
                    sql.push_str(&format!("{column} = ?"));
                    params.push(value.clone());
                }
                Assignment::Column(other) => {
                    validate_column_ref(other)?;
                    sql.push_str(&format!("{column} = {other}"));
                }
                Assignment::Add(delta) => {
                    sql.push_str(&format!("{column} = {column} + ?"));
                    params.push(delta.clone());
                }
            }
        }
        render_where(self.conditions.iter(), &mut sql, &mut params)?;
        Ok(Statement { sql, params })
    }
}

/// `DELETE` builder.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    table: String,
    conditions: Vec<Condition>,
}

impl Delete {
    /// Starts a `DELETE FROM table`. Without conditions every row is removed.
    pub fn from(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            conditions: Vec::new(),
        }
    }

    /// Adds a `WHERE` condition, `AND`-ed with earlier ones.
    #[must_use]
    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Renders the statement.
    pub fn build(&self) -> Result<Statement> {
        validate_identifier(&self.table)?;
        let mut sql = format!("DELETE FROM {}", self.table);
        let mut params = Vec::new();
        render_where(self.conditions.iter(), &mut sql, &mut params)?;
        Ok(Statement { sql, params })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all() {
        let stmt = Select::from("Users").build().unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM Users");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_select_count_with_filter() {
        let stmt = Select::from("sqlite_master")
            .count()
            .filter(Condition::eq("type", "table"))
            .filter(Condition::eq("name", "Users"))
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT COUNT(*) FROM sqlite_master WHERE type = ? AND name = ?"
        );
        assert_eq!(
            stmt.params,
            vec![SqlValue::Text("table".into()), SqlValue::Text("Users".into())]
        );
    }

    #[test]
    fn test_in_and_not_in() {
        let stmt = Select::from("Users")
            .columns(["id"])
            .filter(Condition::is_in("id", [1, 2, 3]))
            .filter(Condition::not_in("name", ["a", "b"]))
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT id FROM Users WHERE id IN (?, ?, ?) AND name NOT IN (?, ?)"
        );
        assert_eq!(stmt.params.len(), 5);
    }

    #[test]
    fn test_empty_in_list_is_rejected() {
        let err = Select::from("Users")
            .filter(Condition::is_in("id", Vec::<i64>::new()))
            .build()
            .unwrap_err();
        assert!(matches!(err, CoreError::EmptyInList(col) if col == "id"));
    }

    #[test]
    fn test_or_group_and_negation() {
        let stmt = Select::from("Users")
            .filter(
                Condition::eq("a", 1)
                    .or(Condition::eq("b", 2))
                    .or(Condition::is_null("c")),
            )
            .filter(Condition::like("name", "x%").negate())
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM Users WHERE (a = ? OR b = ? OR c IS NULL) AND NOT (name LIKE ?)"
        );
    }

    #[test]
    fn test_join_group_order_limit_offset() {
        let stmt = Select::from("Orders")
            .columns(["Users.name"])
            .project(Projection::Max("Orders.total".into()))
            .join(
                JoinKind::Left,
                "Users",
                Some(Condition::columns("Orders.user_id", CompareOp::Eq, "Users.id")),
            )
            .group_by("Users.name")
            .order_by("Users.name", Direction::Desc)
            .limit(5)
            .offset(10)
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT Users.name, MAX(Orders.total) FROM Orders LEFT JOIN Users ON Orders.user_id = Users.id GROUP BY Users.name ORDER BY Users.name DESC LIMIT 5 OFFSET 10"
        );
    }

    #[test]
    fn test_cross_join_ignores_predicate() {
        let stmt = Select::from("A")
            .join(JoinKind::Cross, "B", Some(Condition::eq("x", 1)))
            .build()
            .unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM A CROSS JOIN B");
        assert!(stmt.params.is_empty());
    }

    #[test]
    fn test_offset_without_limit_and_random_order() {
        let stmt = Select::from("Users").order_random().offset(3).build().unwrap();
        assert_eq!(stmt.sql, "SELECT * FROM Users ORDER BY RANDOM() LIMIT -1 OFFSET 3");
    }

    #[test]
    fn test_subquery_params_in_order() {
        let inner = Select::from("Users")
            .project(Projection::Max("position".into()))
            .filter(Condition::eq("kind", "x"));
        let stmt = Select::from("Users")
            .filter(Condition::eq("active", true))
            .filter(Condition::subquery("position", CompareOp::Eq, inner))
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "SELECT * FROM Users WHERE active = ? AND position = (SELECT MAX(position) FROM Users WHERE kind = ?)"
        );
        assert_eq!(
            stmt.params,
            vec![SqlValue::Integer(1), SqlValue::Text("x".into())]
        );
    }

    #[test]
    fn test_invalid_identifiers_rejected() {
        assert!(Select::from("Users; DROP TABLE x").build().is_err());
        assert!(Select::from("Users").columns(["na me"]).build().is_err());
        assert!(Select::from("Users")
            .filter(Condition::eq("1=1 OR x", 1))
            .build()
            .is_err());
        assert!(Select::from("Users")
            .order_by("name DESC", Direction::Asc)
            .build()
            .is_err());
    }

    #[test]
    fn test_keyword_identifiers_rejected() {
        assert!(matches!(
            Select::from("order").build(),
            Err(CoreError::ReservedKeyword(_))
        ));
        assert!(matches!(
            Select::from("Users").columns(["group"]).build(),
            Err(CoreError::ReservedKeyword(_))
        ));
        assert!(matches!(
            Insert::into("Table").value("name", "x").build(),
            Err(CoreError::ReservedKeyword(_))
        ));
    }

    #[test]
    fn test_insert() {
        let stmt = Insert::into("EntityVersions")
            .value("name", "Users")
            .value("version", 2u32)
            .build()
            .unwrap();
        assert_eq!(stmt.sql, "INSERT INTO EntityVersions (name, version) VALUES (?, ?)");
        assert_eq!(
            stmt.params,
            vec![SqlValue::Text("Users".into()), SqlValue::Integer(2)]
        );
        assert!(Insert::into("EntityVersions").build().is_err());
    }

    #[test]
    fn test_update_assignments() {
        let stmt = Update::table("Items")
            .set("name", "x")
            .add("position", -1)
            .set_column("old_name", "name")
            .filter(Condition::gt("position", 3))
            .build()
            .unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE Items SET name = ?, position = position + ?, old_name = name WHERE position > ?"
        );
        assert_eq!(
            stmt.params,
            vec![
                SqlValue::Text("x".into()),
                SqlValue::Integer(-1),
                SqlValue::Integer(3)
            ]
        );
        assert!(Update::table("Items").build().is_err());
    }

    #[test]
    fn test_delete() {
        let all = Delete::from("Items").build().unwrap();
        assert_eq!(all.sql, "DELETE FROM Items");
        let one = Delete::from("Items")
            .filter(Condition::eq("id", 7))
            .build()
            .unwrap();
        assert_eq!(one.sql, "DELETE FROM Items WHERE id = ?");
    }

    #[test]
    fn test_literals() {
        assert_eq!(SqlValue::Null.to_literal(), "NULL");
        assert_eq!(SqlValue::Integer(-4).to_literal(), "-4");
        assert_eq!(SqlValue::Real(1.0).to_literal(), "1.0");
        assert_eq!(SqlValue::Real(0.25).to_literal(), "0.25");
        assert_eq!(SqlValue::from("it's").to_literal(), "'it''s'");
        assert_eq!(SqlValue::Blob(vec![0xAB, 0x01]).to_literal(), "X'AB01'");
        assert_eq!(SqlValue::from(None::<i64>), SqlValue::Null);
    }
}
