//! Declarative entity configuration.
//!
//! Describes the database file and the entities whose schema versions are
//! tracked, together with the DDL and migration steps for each entity.
//!
//! # Example YAML
//!
//! ```yaml
//! database: app.db
//! prune_undeclared: false
//! entities:
//!   - name: Users
//!     version: 2
//!     tables: [Users]
//!     create: "CREATE TABLE IF NOT EXISTS {table} (id INTEGER NOT NULL PRIMARY KEY, name TEXT NOT NULL DEFAULT '', email TEXT NOT NULL DEFAULT '')"
//!     steps:
//!       2: "ALTER TABLE {table} ADD COLUMN email TEXT NOT NULL DEFAULT ''"
//! ```
//!
//! `{table}` is replaced by each table name of the entity.

use std::collections::{BTreeMap, HashSet};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::dialect::Dialect;
use crate::error::{CoreError, Result};
use crate::validate::validate_identifier;

/// Placeholder substituted with the table name in DDL templates.
pub const TABLE_PLACEHOLDER: &str = "{table}";

/// One tracked entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityConfig {
    /// Entity name, stored in the ledger.
    pub name: String,
    /// Target schema version.
    pub version: u32,
    /// Tables using this entity; defaults to a single table named after it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<String>,
    /// `CREATE TABLE` template for fresh tables.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<String>,
    /// SQL templates keyed by the version they produce.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub steps: BTreeMap<u32, String>,
}

impl EntityConfig {
    /// Creates an entity with no tables, DDL or steps.
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
            tables: Vec::new(),
            create: None,
            steps: BTreeMap::new(),
        }
    }

    /// Tables using this entity, falling back to the entity name.
    pub fn table_names(&self) -> Vec<String> {
        if self.tables.is_empty() {
            vec![self.name.clone()]
        } else {
            self.tables.clone()
        }
    }
}

/// Substitutes [`TABLE_PLACEHOLDER`] in `template`.
///
/// # Examples
///
/// ```
/// use entity_ledger_core::render_template;
///
/// assert_eq!(
///     render_template("DROP TABLE IF EXISTS {table}", "Users"),
///     "DROP TABLE IF EXISTS Users"
/// );
/// ```
pub fn render_template(template: &str, table: &str) -> String {
    template.replace(TABLE_PLACEHOLDER, table)
}

/// Top-level ledger configuration.
///
/// # Examples
///
/// ```no_run
/// use entity_ledger_core::LedgerConfig;
///
/// let config = LedgerConfig::load("ledger.yaml").unwrap();
/// for entity in &config.entities {
///     println!("{} -> v{}", entity.name, entity.version);
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Database file; relative paths resolve against the config file.
    pub database: PathBuf,
    /// Remove ledger rows of entities that are no longer declared.
    #[serde(default)]
    pub prune_undeclared: bool,
    /// Declared entities, migrated in this order.
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
}

impl LedgerConfig {
    /// Loads and validates configuration from a YAML file.
    ///
    /// A relative `database` path is resolved against the directory of the
    /// config file; the dialect's in-memory path is kept as is.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::IoError`] if the file cannot be read,
    /// [`CoreError::YamlError`] if parsing fails and
    /// [`CoreError::InvalidConfig`] if validation fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let mut config: Self = serde_yaml::from_reader(reader)?;
        if config.database.is_relative() && config.database.as_os_str() != Dialect::LATEST.in_memory {
            if let Some(parent) = path.parent() {
                config.database = parent.join(&config.database);
            }
        }
        config.validate()?;
        Ok(config)
    }

    /// Parses configuration from a YAML string without path resolution.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Looks up a declared entity by name.
    pub fn entity(&self, name: &str) -> Option<&EntityConfig> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// Checks names, duplicates and step versions.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidConfig`] describing the first problem.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for entity in &self.entities {
            validate_identifier(&entity.name).map_err(|_| {
                CoreError::InvalidConfig(format!("invalid entity name '{}'", entity.name))
            })?;
            if !names.insert(entity.name.as_str()) {
                return Err(CoreError::InvalidConfig(format!(
                    "duplicate entity '{}'",
                    entity.name
                )));
            }
            for table in &entity.tables {
                validate_identifier(table).map_err(|_| {
                    CoreError::InvalidConfig(format!(
                        "invalid table name '{table}' for entity '{}'",
                        entity.name
                    ))
                })?;
            }
            if let Some(step) = entity
                .steps
                .keys()
                .find(|v| **v == 0 || **v > entity.version)
            {
                return Err(CoreError::InvalidConfig(format!(
                    "step {step} of entity '{}' is outside 1..={}",
                    entity.name, entity.version
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
database: app.db
entities:
  - name: Users
    version: 2
    create: "CREATE TABLE IF NOT EXISTS {table} (id INTEGER NOT NULL PRIMARY KEY)"
    steps:
      2: "ALTER TABLE {table} ADD COLUMN email TEXT NOT NULL DEFAULT ''"
  - name: Items
    version: 1
    tables: [ItemsA, ItemsB]
"#;

    #[test]
    fn test_parse_sample() {
        let config = LedgerConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.database, PathBuf::from("app.db"));
        assert!(!config.prune_undeclared);
        assert_eq!(config.entities.len(), 2);

        let users = config.entity("Users").unwrap();
        assert_eq!(users.table_names(), vec!["Users".to_string()]);
        assert_eq!(users.steps.len(), 1);

        let items = config.entity("Items").unwrap();
        assert_eq!(items.table_names(), vec!["ItemsA", "ItemsB"]);
        assert!(config.entity("Nope").is_none());
    }

    #[test]
    fn test_duplicate_entity_rejected() {
        let yaml = "database: x.db\nentities:\n  - {name: A, version: 1}\n  - {name: A, version: 2}\n";
        assert!(matches!(
            LedgerConfig::from_yaml(yaml),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_step_out_of_range_rejected() {
        let yaml = "database: x.db\nentities:\n  - name: A\n    version: 1\n    steps:\n      2: \"SELECT 1\"\n";
        assert!(matches!(
            LedgerConfig::from_yaml(yaml),
            Err(CoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_table_rejected() {
        let yaml = "database: x.db\nentities:\n  - name: A\n    version: 1\n    tables: [\"a b\"]\n";
        assert!(LedgerConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_render_template() {
        assert_eq!(
            render_template("ALTER TABLE {table} ADD COLUMN x INT", "T1"),
            "ALTER TABLE T1 ADD COLUMN x INT"
        );
    }

    #[test]
    fn test_load_resolves_relative_database() {
        let dir = std::env::temp_dir().join(format!("ledger_config_test_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ledger.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let config = LedgerConfig::load(&path).unwrap();
        assert_eq!(config.database, dir.join("app.db"));

        config.save(&path).unwrap();
        let reloaded = LedgerConfig::load(&path).unwrap();
        assert_eq!(reloaded.entities, config.entities);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_keeps_in_memory_database() {
        let dir = std::env::temp_dir().join(format!("ledger_config_mem_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ledger.yaml");
        std::fs::write(&path, "database: \":memory:\"\nentities: []\n").unwrap();

        let config = LedgerConfig::load(&path).unwrap();
        assert_eq!(config.database, PathBuf::from(":memory:"));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
