//! Versioned entity migrations.
//!
//! A [`Migrator`] owns the connection and a list of [`EntityMigrations`].
//! [`Migrator::run`] makes sure the ledger exists, then brings every
//! declared entity up to its target version, one transaction per entity.
//!
//! # Example
//!
//! ```
//! use entity_ledger_sqlite::{EntityMigrations, EntityOutcome, Migrator};
//!
//! let users = EntityMigrations::new("Users", 2)
//!     .create("CREATE TABLE IF NOT EXISTS {table} (id INTEGER NOT NULL PRIMARY KEY, email TEXT)")
//!     .sql_step(2, "ALTER TABLE {table} ADD COLUMN email TEXT");
//!
//! let mut migrator = Migrator::open_in_memory().unwrap().with_entity(users);
//! let report = migrator.run().unwrap();
//! assert_eq!(report.outcome("Users"), Some(&EntityOutcome::Created));
//!
//! // A second run finds nothing to do.
//! let report = migrator.run().unwrap();
//! assert_eq!(report.outcome("Users"), Some(&EntityOutcome::UpToDate));
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use entity_ledger_core::{
    Dialect, EntityConfig, LedgerConfig, SchemaDrift, drop_table_sql, render_template,
};
use rusqlite::Connection;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{LedgerError, Result};
use crate::introspect::Introspector;
use crate::ledger::VersionLedger;

/// One schema change applied to a table of an entity.
///
/// Implemented for SQL templates ([`SqlStep`]) and for closures taking the
/// connection and the table name.
pub trait MigrationStep {
    /// Applies the change to `table`.
    fn apply(&self, conn: &Connection, table: &str) -> Result<()>;
}

impl<F> MigrationStep for F
where
    F: Fn(&Connection, &str) -> Result<()>,
{
    fn apply(&self, conn: &Connection, table: &str) -> Result<()> {
        self(conn, table)
    }
}

/// SQL template step; `{table}` is replaced by the table name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlStep(pub String);

impl MigrationStep for SqlStep {
    fn apply(&self, conn: &Connection, table: &str) -> Result<()> {
        conn.execute_batch(&render_template(&self.0, table))?;
        Ok(())
    }
}

/// Declaration of one entity: target version, tables, DDL and steps.
pub struct EntityMigrations {
    name: String,
    target: u32,
    tables: Vec<String>,
    create: Option<String>,
    steps: BTreeMap<u32, Box<dyn MigrationStep>>,
}

impl EntityMigrations {
    /// Declares `name` at `target` version.
    pub fn new(name: impl Into<String>, target: u32) -> Self {
        Self {
            name: name.into(),
            target,
            tables: Vec::new(),
            create: None,
            steps: BTreeMap::new(),
        }
    }

    /// Builds a declaration from configuration, with SQL template steps.
    pub fn from_config(config: &EntityConfig) -> Self {
        let mut entity = Self::new(&config.name, config.version);
        entity.tables = config.tables.clone();
        entity.create = config.create.clone();
        for (version, sql) in &config.steps {
            entity = entity.sql_step(*version, sql.clone());
        }
        entity
    }

    /// Adds a table using this entity. Without any, the entity name is used.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.tables.push(table.into());
        self
    }

    /// Sets the `CREATE TABLE` template used for missing tables.
    pub fn create(mut self, template: impl Into<String>) -> Self {
        self.create = Some(template.into());
        self
    }

    /// Registers the step producing `version`. A later call for the same
    /// version replaces the earlier step.
    pub fn step(mut self, version: u32, step: impl MigrationStep + 'static) -> Self {
        self.steps.insert(version, Box::new(step));
        self
    }

    /// Registers a SQL template step producing `version`.
    pub fn sql_step(self, version: u32, template: impl Into<String>) -> Self {
        self.step(version, SqlStep(template.into()))
    }

    /// Entity name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Target version.
    pub fn target(&self) -> u32 {
        self.target
    }

    /// Tables using this entity, falling back to the entity name.
    pub fn table_names(&self) -> Vec<String> {
        if self.tables.is_empty() {
            vec![self.name.clone()]
        } else {
            self.tables.clone()
        }
    }

    fn create_sql(&self, table: &str) -> Option<String> {
        self.create.as_deref().map(|t| render_template(t, table))
    }
}

impl fmt::Debug for EntityMigrations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityMigrations")
            .field("name", &self.name)
            .field("target", &self.target)
            .field("tables", &self.tables)
            .field("create", &self.create)
            .field("steps", &self.steps.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// What [`Migrator::run`] did to one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EntityOutcome {
    /// Tables were created from scratch and registered at the target.
    Created,
    /// Steps were applied to move from `from` to `to`.
    Migrated {
        /// Version before the run.
        from: u32,
        /// Version after the run.
        to: u32,
        /// Versions whose steps were applied, ascending.
        steps: Vec<u32>,
    },
    /// Already at the target version.
    UpToDate,
}

impl fmt::Display for EntityOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "created"),
            Self::Migrated { from, to, steps } => {
                write!(f, "migrated {from} -> {to} ({} steps)", steps.len())
            }
            Self::UpToDate => write!(f, "up to date"),
        }
    }
}

/// Result of a [`Migrator::run`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Outcome per entity, in declaration order.
    pub entities: Vec<(String, EntityOutcome)>,
    /// Tables whose stored definition differs from the declared one.
    pub drifts: Vec<SchemaDrift>,
    /// Undeclared entities removed from the ledger.
    pub pruned: Vec<String>,
}

impl MigrationReport {
    /// Looks up the outcome of `entity`.
    pub fn outcome(&self, entity: &str) -> Option<&EntityOutcome> {
        self.entities
            .iter()
            .find(|(name, _)| name == entity)
            .map(|(_, outcome)| outcome)
    }
}

/// Ledger state of an entity next to its declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntityStatus {
    /// Entity name.
    pub name: String,
    /// Version stored in the ledger, if registered.
    pub stored: Option<u32>,
    /// Declared target version, if declared.
    pub target: Option<u32>,
    /// Ledger notes.
    pub notes: String,
}

impl EntityStatus {
    /// Returns `true` when the entity is declared and behind its target.
    pub fn is_pending(&self) -> bool {
        match self.target {
            Some(target) => self.stored.unwrap_or(0) < target,
            None => false,
        }
    }
}

/// Applies declared entity migrations to an owned connection.
pub struct Migrator {
    conn: Connection,
    dialect: Dialect,
    entities: Vec<EntityMigrations>,
    prune_undeclared: bool,
}

impl Migrator {
    /// Creates a migrator over `conn` with the latest dialect.
    pub fn new(conn: Connection) -> Self {
        Self {
            conn,
            dialect: Dialect::LATEST,
            entities: Vec::new(),
            prune_undeclared: false,
        }
    }

    /// Opens (or creates) the database file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(path)?;
        Ok(Self::new(conn))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self::new(conn))
    }

    /// Opens the configured database and declares its entities.
    pub fn from_config(config: &LedgerConfig) -> Result<Self> {
        Ok(Self::open(&config.database)?.with_config(config))
    }

    /// Declares every entity of `config` and adopts its prune setting.
    pub fn with_config(mut self, config: &LedgerConfig) -> Self {
        self.prune_undeclared = config.prune_undeclared;
        for entity in &config.entities {
            self.entities.push(EntityMigrations::from_config(entity));
        }
        self
    }

    /// Declares one more entity. Entities migrate in declaration order.
    pub fn with_entity(mut self, entity: EntityMigrations) -> Self {
        self.entities.push(entity);
        self
    }

    /// Removes ledger rows of undeclared entities during [`run`](Self::run).
    pub fn prune_undeclared(mut self, prune: bool) -> Self {
        self.prune_undeclared = prune;
        self
    }

    /// The dialect in use.
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// Borrows the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Releases the underlying connection.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Brings every declared entity to its target version.
    ///
    /// Each entity is migrated in its own transaction. Entities before a
    /// failing one stay committed; the failing one is rolled back entirely.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::VersionRegression`] when the stored version is above
    ///   the target; nothing is applied for that entity.
    /// - [`LedgerError::MigrationFailed`] when a step or a create fails.
    pub fn run(&mut self) -> Result<MigrationReport> {
        VersionLedger::new(&self.conn, &self.dialect).ensure_ledger_exists()?;

        let mut report = MigrationReport::default();
        for entity in &self.entities {
            let tx = self.conn.transaction()?;
            let outcome = migrate_entity(&tx, &self.dialect, entity)?;
            tx.commit()?;
            info!(entity = entity.name(), %outcome, "Entity migrated");
            report.entities.push((entity.name.clone(), outcome));
        }

        let introspector = Introspector::new(&self.conn, &self.dialect);
        for entity in &self.entities {
            for table in entity.table_names() {
                if let Some(expected) = entity.create_sql(&table) {
                    if let Some(drift) = introspector.check_drift(&table, &expected)? {
                        report.drifts.push(drift);
                    }
                }
            }
        }

        if self.prune_undeclared {
            let tx = self.conn.transaction()?;
            report.pruned = prune(&tx, &self.dialect, &self.entities)?;
            tx.commit()?;
        }

        Ok(report)
    }

    /// Lists declared entities and ledger records side by side.
    ///
    /// Declared entities come first in declaration order, then undeclared
    /// ledger records ordered by name.
    pub fn status(&self) -> Result<Vec<EntityStatus>> {
        let mut records = VersionLedger::new(&self.conn, &self.dialect).records()?;

        let mut status = Vec::with_capacity(self.entities.len() + records.len());
        for entity in &self.entities {
            let record = records
                .iter()
                .position(|r| r.entity_name == entity.name)
                .map(|i| records.remove(i));
            status.push(EntityStatus {
                name: entity.name.clone(),
                stored: record.as_ref().map(|r| r.version),
                target: Some(entity.target),
                notes: record.map(|r| r.notes).unwrap_or_default(),
            });
        }
        for record in records {
            status.push(EntityStatus {
                name: record.entity_name,
                stored: Some(record.version),
                target: None,
                notes: record.notes,
            });
        }
        Ok(status)
    }

    /// Drops every table of `name` and removes its ledger row, atomically.
    ///
    /// Undeclared entities are dropped by their ledger name.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::UnknownEntity`] if `name` is neither declared
    /// nor registered.
    pub fn drop_entity(&mut self, name: &str) -> Result<()> {
        let tables = match self.entities.iter().find(|e| e.name == name) {
            Some(entity) => entity.table_names(),
            None => vec![name.to_string()],
        };
        let declared = self.entities.iter().any(|e| e.name == name);

        VersionLedger::new(&self.conn, &self.dialect).ensure_ledger_exists()?;
        let tx = self.conn.transaction()?;
        let ledger = VersionLedger::new(&tx, &self.dialect);
        if !declared && !ledger.contains(name)? {
            return Err(LedgerError::UnknownEntity(name.to_string()));
        }
        for table in &tables {
            tx.execute_batch(&drop_table_sql(table)?)?;
        }
        ledger.remove(name)?;
        tx.commit()?;
        info!(entity = name, tables = tables.len(), "Entity dropped");
        Ok(())
    }
}

fn migrate_entity(
    conn: &Connection,
    dialect: &Dialect,
    entity: &EntityMigrations,
) -> Result<EntityOutcome> {
    let ledger = VersionLedger::new(conn, dialect);
    let introspector = Introspector::new(conn, dialect);
    let name = entity.name();
    let target = entity.target();
    let tables = entity.table_names();

    let record = ledger.record(name)?;
    let stored = record.as_ref().map_or(0, |r| r.version);
    if stored > target {
        return Err(LedgerError::VersionRegression {
            entity: name.to_string(),
            current: stored,
            requested: target,
        });
    }

    let mut missing = Vec::new();
    for table in &tables {
        if !introspector.table_exists(table)? {
            missing.push(table.clone());
        }
    }

    if record.is_none() && missing.len() == tables.len() {
        for table in &tables {
            create_table(conn, entity, table)?;
        }
        ledger.register(name, target)?;
        return Ok(EntityOutcome::Created);
    }

    // Tables created here already carry the target layout, also when the
    // ledger claims the entity is current.
    for table in &missing {
        create_table(conn, entity, table)?;
    }

    if stored == target {
        if record.is_none() {
            ledger.register(name, target)?;
        }
        return Ok(EntityOutcome::UpToDate);
    }

    let pending: Vec<(&u32, &Box<dyn MigrationStep>)> = entity
        .steps
        .range(stored + 1..=target)
        .collect();
    for table in tables.iter().filter(|t| !missing.contains(*t)) {
        for (version, step) in &pending {
            debug!(entity = name, table = table.as_str(), version = **version, "Applying step");
            step.apply(conn, table)
                .map_err(|err| LedgerError::MigrationFailed {
                    entity: name.to_string(),
                    version: **version,
                    table: table.clone(),
                    reason: err.to_string(),
                })?;
        }
    }

    ledger.set_version(name, target)?;
    Ok(EntityOutcome::Migrated {
        from: stored,
        to: target,
        steps: pending.iter().map(|(v, _)| **v).collect(),
    })
}

fn create_table(conn: &Connection, entity: &EntityMigrations, table: &str) -> Result<()> {
    let Some(ddl) = entity.create_sql(table) else {
        debug!(entity = entity.name(), table, "No create DDL declared, table left absent");
        return Ok(());
    };
    conn.execute_batch(&ddl)
        .map_err(|err| LedgerError::MigrationFailed {
            entity: entity.name().to_string(),
            version: entity.target(),
            table: table.to_string(),
            reason: err.to_string(),
        })?;
    info!(entity = entity.name(), table, "Table created");
    Ok(())
}

fn prune(conn: &Connection, dialect: &Dialect, declared: &[EntityMigrations]) -> Result<Vec<String>> {
    let ledger = VersionLedger::new(conn, dialect);
    let mut pruned = Vec::new();
    for record in ledger.records()? {
        if declared.iter().any(|e| e.name == record.entity_name) {
            continue;
        }
        ledger.remove(&record.entity_name)?;
        pruned.push(record.entity_name);
    }
    Ok(pruned)
}

#[cfg(test)]
mod tests {
    use super::*;

    const USERS_V1: &str =
        "CREATE TABLE IF NOT EXISTS {table} (id INTEGER NOT NULL PRIMARY KEY, name TEXT NOT NULL DEFAULT '')";
    const USERS_V2: &str = "CREATE TABLE IF NOT EXISTS {table} (id INTEGER NOT NULL PRIMARY KEY, name TEXT NOT NULL DEFAULT '', email TEXT NOT NULL DEFAULT '')";

    fn users_v2() -> EntityMigrations {
        EntityMigrations::new("Users", 2)
            .create(USERS_V2)
            .sql_step(2, "ALTER TABLE {table} ADD COLUMN email TEXT NOT NULL DEFAULT ''")
    }

    fn stored_version(migrator: &Migrator, entity: &str) -> u32 {
        VersionLedger::new(migrator.connection(), migrator.dialect())
            .get_version(entity)
            .unwrap()
    }

    #[test]
    fn test_fresh_database_creates_and_registers() {
        let mut migrator = Migrator::open_in_memory().unwrap().with_entity(users_v2());
        let report = migrator.run().unwrap();

        assert_eq!(report.outcome("Users"), Some(&EntityOutcome::Created));
        assert!(report.drifts.is_empty());
        assert_eq!(stored_version(&migrator, "Users"), 2);
        let intro = Introspector::new(migrator.connection(), migrator.dialect());
        assert!(intro.table_exists("Users").unwrap());
    }

    #[test]
    fn test_existing_v1_database_is_migrated() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&render_template(USERS_V1, "Users")).unwrap();
        let mut migrator = Migrator::new(conn).with_entity(users_v2());
        VersionLedger::new(migrator.connection(), migrator.dialect())
            .ensure_ledger_exists()
            .unwrap();
        VersionLedger::new(migrator.connection(), migrator.dialect())
            .set_version("Users", 1)
            .unwrap();

        let report = migrator.run().unwrap();
        assert_eq!(
            report.outcome("Users"),
            Some(&EntityOutcome::Migrated { from: 1, to: 2, steps: vec![2] })
        );
        assert!(report.drifts.is_empty(), "{:?}", report.drifts);
        assert_eq!(stored_version(&migrator, "Users"), 2);
    }

    #[test]
    fn test_unregistered_existing_table_starts_at_zero() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE Notes (id INTEGER NOT NULL PRIMARY KEY)")
            .unwrap();
        let entity = EntityMigrations::new("Notes", 2)
            .sql_step(1, "ALTER TABLE {table} ADD COLUMN body TEXT")
            .sql_step(2, "ALTER TABLE {table} ADD COLUMN title TEXT");
        let mut migrator = Migrator::new(conn).with_entity(entity);

        let report = migrator.run().unwrap();
        assert_eq!(
            report.outcome("Notes"),
            Some(&EntityOutcome::Migrated { from: 0, to: 2, steps: vec![1, 2] })
        );
        migrator
            .connection()
            .execute("INSERT INTO Notes (body, title) VALUES ('b', 't')", [])
            .unwrap();
    }

    #[test]
    fn test_second_run_is_up_to_date() {
        let mut migrator = Migrator::open_in_memory().unwrap().with_entity(users_v2());
        migrator.run().unwrap();
        let report = migrator.run().unwrap();
        assert_eq!(report.outcome("Users"), Some(&EntityOutcome::UpToDate));
    }

    #[test]
    fn test_dropped_table_is_recreated_when_up_to_date() {
        let mut migrator = Migrator::open_in_memory().unwrap().with_entity(users_v2());
        migrator.run().unwrap();
        migrator
            .connection()
            .execute_batch("DROP TABLE Users")
            .unwrap();

        let report = migrator.run().unwrap();
        assert_eq!(report.outcome("Users"), Some(&EntityOutcome::UpToDate));
        assert!(report.drifts.is_empty());
        let intro = Introspector::new(migrator.connection(), migrator.dialect());
        assert!(intro.table_exists("Users").unwrap());
        assert_eq!(stored_version(&migrator, "Users"), 2);
    }

    #[test]
    fn test_failing_step_rolls_back_entity() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE Orders (id INTEGER NOT NULL PRIMARY KEY)")
            .unwrap();
        let entity = EntityMigrations::new("Orders", 2)
            .sql_step(1, "ALTER TABLE {table} ADD COLUMN total INT")
            .sql_step(2, "ALTER TABLE {table} ADD COLUMN broken NOT A TYPE (");
        let mut migrator = Migrator::new(conn).with_entity(entity);

        let err = migrator.run().unwrap_err();
        match err {
            LedgerError::MigrationFailed { entity, version, table, .. } => {
                assert_eq!(entity, "Orders");
                assert_eq!(version, 2);
                assert_eq!(table, "Orders");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(stored_version(&migrator, "Orders"), 0);
        let sql: String = migrator
            .connection()
            .query_row("SELECT sql FROM sqlite_master WHERE name = 'Orders'", [], |r| r.get(0))
            .unwrap();
        assert!(!sql.contains("total"), "step 1 must be rolled back: {sql}");
    }

    #[test]
    fn test_downgrade_is_refused_before_ddl() {
        let mut migrator = Migrator::open_in_memory().unwrap().with_entity(users_v2());
        migrator.run().unwrap();
        let conn = migrator.into_connection();

        let touched = std::rc::Rc::new(std::cell::Cell::new(false));
        let flag = touched.clone();
        let older = EntityMigrations::new("Users", 1).step(1, move |_: &Connection, _: &str| -> Result<()> {
            flag.set(true);
            Ok(())
        });
        let mut migrator = Migrator::new(conn).with_entity(older);
        let err = migrator.run().unwrap_err();
        assert!(matches!(
            err,
            LedgerError::VersionRegression { current: 2, requested: 1, .. }
        ));
        assert!(!touched.get());
        assert_eq!(stored_version(&migrator, "Users"), 2);
    }

    #[test]
    fn test_closure_step_receives_each_table() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE Inbox (id INTEGER NOT NULL PRIMARY KEY);
             CREATE TABLE Outbox (id INTEGER NOT NULL PRIMARY KEY);",
        )
        .unwrap();
        let entity = EntityMigrations::new("Message", 1)
            .table("Inbox")
            .table("Outbox")
            .step(1, |conn: &Connection, table: &str| -> Result<()> {
                conn.execute(&format!("INSERT INTO {table} (id) VALUES (7)"), [])?;
                Ok(())
            });
        let mut migrator = Migrator::new(conn).with_entity(entity);
        migrator.run().unwrap();

        for table in ["Inbox", "Outbox"] {
            let id: i64 = migrator
                .connection()
                .query_row(&format!("SELECT id FROM {table}"), [], |r| r.get(0))
                .unwrap();
            assert_eq!(id, 7);
        }
    }

    #[test]
    fn test_drift_is_reported_not_fixed() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE Users (id INTEGER NOT NULL PRIMARY KEY)")
            .unwrap();
        let mut migrator = Migrator::new(conn).with_entity(EntityMigrations::new("Users", 0).create(USERS_V1));

        let report = migrator.run().unwrap();
        assert_eq!(report.outcome("Users"), Some(&EntityOutcome::UpToDate));
        assert_eq!(report.drifts.len(), 1);
        assert_eq!(report.drifts[0].table, "Users");
        assert_eq!(stored_version(&migrator, "Users"), 0);
        assert!(
            VersionLedger::new(migrator.connection(), migrator.dialect())
                .contains("Users")
                .unwrap()
        );
    }

    #[test]
    fn test_prune_undeclared() {
        let mut migrator = Migrator::open_in_memory().unwrap().with_entity(users_v2());
        migrator.run().unwrap();
        VersionLedger::new(migrator.connection(), migrator.dialect())
            .set_version("Legacy", 3)
            .unwrap();

        let report = migrator.run().unwrap();
        assert!(report.pruned.is_empty());

        let conn = migrator.into_connection();
        let mut migrator = Migrator::new(conn)
            .with_entity(users_v2())
            .prune_undeclared(true);
        let report = migrator.run().unwrap();
        assert_eq!(report.pruned, vec!["Legacy".to_string()]);
        assert_eq!(stored_version(&migrator, "Legacy"), 0);
        assert_eq!(stored_version(&migrator, "Users"), 2);
    }

    #[test]
    fn test_status_and_drop_entity() {
        let mut migrator = Migrator::open_in_memory().unwrap().with_entity(users_v2());
        assert_eq!(migrator.status().unwrap()[0].stored, None);
        assert!(migrator.status().unwrap()[0].is_pending());

        migrator.run().unwrap();
        VersionLedger::new(migrator.connection(), migrator.dialect())
            .set_version("Legacy", 1)
            .unwrap();
        let status = migrator.status().unwrap();
        assert_eq!(status.len(), 2);
        assert_eq!(status[0].name, "Users");
        assert_eq!(status[0].stored, Some(2));
        assert!(!status[0].is_pending());
        assert_eq!(status[1].name, "Legacy");
        assert_eq!(status[1].target, None);

        migrator.drop_entity("Users").unwrap();
        let intro = Introspector::new(migrator.connection(), migrator.dialect());
        assert!(!intro.table_exists("Users").unwrap());
        assert_eq!(stored_version(&migrator, "Users"), 0);

        assert!(matches!(
            migrator.drop_entity("Ghost"),
            Err(LedgerError::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_from_config_entity() {
        let config = LedgerConfig::from_yaml(
            r#"
database: ":memory:"
entities:
  - name: Tags
    version: 1
    create: "CREATE TABLE IF NOT EXISTS {table} (id INTEGER NOT NULL PRIMARY KEY)"
"#,
        )
        .unwrap();
        let mut migrator = Migrator::from_config(&config).unwrap();
        let report = migrator.run().unwrap();
        assert_eq!(report.outcome("Tags"), Some(&EntityOutcome::Created));
    }
}
