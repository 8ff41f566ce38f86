use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use entity_ledger_core::{Dialect, LedgerConfig, VersionRecord};
use entity_ledger_sqlite::{Introspector, MigrationReport, Migrator, VersionLedger, atomically};
use rusqlite::Connection;
use tracing_subscriber::EnvFilter;

/// Output format for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum CliOutputFormat {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "entity-ledger")]
#[command(about = "Track and migrate per-entity schema versions in SQLite databases")]
#[command(version)]
struct Cli {
    /// Log debug details to stderr (RUST_LOG is honoured otherwise).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the version ledger table if it does not exist.
    Init(DbArgs),
    /// List every entity recorded in the ledger.
    Status(StatusArgs),
    /// Print the stored version of an entity (0 when unregistered).
    Get(GetArgs),
    /// Record a new version for an entity. Versions never decrease.
    Set(SetArgs),
    /// List tables from the database catalog.
    Tables(TablesArgs),
    /// Print the stored CREATE statement of a table.
    Definition(DefinitionArgs),
    /// Bring the entities declared in a YAML config up to their versions.
    Migrate(MigrateArgs),
}

#[derive(Debug, Args)]
struct DbArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct GetArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
    /// Entity name.
    #[arg(long)]
    entity: String,
}

#[derive(Debug, Args)]
struct SetArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
    /// Entity name.
    #[arg(long)]
    entity: String,
    /// New version; must not be lower than the stored one.
    #[arg(long)]
    version: u32,
    /// Replace the entity notes.
    #[arg(long)]
    notes: Option<String>,
}

#[derive(Debug, Args)]
struct TablesArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
    /// Include indexes, views, triggers and reserved tables.
    #[arg(long)]
    all: bool,
}

#[derive(Debug, Args)]
struct DefinitionArgs {
    /// Database file path.
    #[arg(long)]
    db: PathBuf,
    /// Table name.
    #[arg(long)]
    table: String,
}

#[derive(Debug, Args)]
struct MigrateArgs {
    /// Path to the ledger YAML config.
    #[arg(long)]
    config: PathBuf,
    /// Override the database path from the config.
    #[arg(long)]
    db: Option<PathBuf>,
    /// Output format for the report.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

fn main() {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);

    let result = match cli.command {
        Command::Init(args) => run_init(args),
        Command::Status(args) => run_status(args),
        Command::Get(args) => run_get(args),
        Command::Set(args) => run_set(args),
        Command::Tables(args) => run_tables(args),
        Command::Definition(args) => run_definition(args),
        Command::Migrate(args) => run_migrate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn setup_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run_init(args: DbArgs) -> Result<(), String> {
    let conn = open_db(&args.db)?;
    let dialect = Dialect::LATEST;
    let created = VersionLedger::new(&conn, &dialect)
        .ensure_ledger_exists()
        .map_err(|e| format!("Failed to create ledger: {e}"))?;
    if created {
        println!("Created ledger table {}", dialect.ledger_table);
    } else {
        println!("Ledger table {} already exists", dialect.ledger_table);
    }
    Ok(())
}

fn run_status(args: StatusArgs) -> Result<(), String> {
    let conn = open_db(&args.db)?;
    let dialect = Dialect::LATEST;
    let records = VersionLedger::new(&conn, &dialect)
        .records()
        .map_err(|e| format!("Failed to read ledger: {e}"))?;

    match args.format {
        CliOutputFormat::Json => {
            let json = serde_json::to_string_pretty(&records)
                .map_err(|e| format!("JSON serialization failed: {e}"))?;
            println!("{json}");
        }
        CliOutputFormat::Table => {
            if records.is_empty() {
                println!("No entities recorded");
                return Ok(());
            }
            print!("{}", format_records(&records));
        }
    }
    Ok(())
}

fn run_get(args: GetArgs) -> Result<(), String> {
    let conn = open_db(&args.db)?;
    let dialect = Dialect::LATEST;
    let version = VersionLedger::new(&conn, &dialect)
        .get_version(&args.entity)
        .map_err(|e| format!("Failed to read version of '{}': {e}", args.entity))?;
    println!("{version}");
    Ok(())
}

fn run_set(args: SetArgs) -> Result<(), String> {
    let conn = open_db(&args.db)?;
    let dialect = Dialect::LATEST;
    atomically(&conn, |conn| {
        let ledger = VersionLedger::new(conn, &dialect);
        ledger.ensure_ledger_exists()?;
        ledger.set_version(&args.entity, args.version)?;
        if let Some(notes) = &args.notes {
            ledger.set_notes(&args.entity, notes)?;
        }
        Ok(())
    })
    .map_err(|e| e.to_string())?;
    println!("{}: {}", args.entity, args.version);
    Ok(())
}

fn run_tables(args: TablesArgs) -> Result<(), String> {
    let conn = open_db(&args.db)?;
    let dialect = Dialect::LATEST;
    let introspector = Introspector::new(&conn, &dialect);

    if args.all {
        let entries = introspector
            .entries()
            .map_err(|e| format!("Failed to read catalog: {e}"))?;
        for entry in entries {
            println!("{:<8} {:<32} {}", entry.object_type, entry.name, entry.table_name);
        }
    } else {
        let names = introspector
            .table_names()
            .map_err(|e| format!("Failed to read catalog: {e}"))?;
        for name in names {
            println!("{name}");
        }
    }
    Ok(())
}

fn run_definition(args: DefinitionArgs) -> Result<(), String> {
    let conn = open_db(&args.db)?;
    let dialect = Dialect::LATEST;
    let definition = Introspector::new(&conn, &dialect)
        .get_definition(&args.table)
        .map_err(|e| format!("Failed to read catalog: {e}"))?;
    match definition {
        Some(sql) => println!("{sql}"),
        None => println!("Table '{}' not found", args.table),
    }
    Ok(())
}

fn run_migrate(args: MigrateArgs) -> Result<(), String> {
    let config = LedgerConfig::load(&args.config)
        .map_err(|e| format!("Failed to load config '{}': {e}", args.config.display()))?;
    let db = args.db.as_deref().unwrap_or(&config.database);
    let mut migrator = Migrator::open(db)
        .map_err(|e| format!("Failed to open database '{}': {e}", db.display()))?
        .with_config(&config);
    let report = migrator.run().map_err(|e| e.to_string())?;

    match args.format {
        CliOutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)
                .map_err(|e| format!("JSON serialization failed: {e}"))?;
            println!("{json}");
        }
        CliOutputFormat::Table => print!("{}", format_report(&report)),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn open_db(path: &Path) -> Result<Connection, String> {
    Connection::open(path).map_err(|e| format!("Failed to open database '{}': {e}", path.display()))
}

fn format_records(records: &[VersionRecord]) -> String {
    let width = records
        .iter()
        .map(|r| r.entity_name.len())
        .max()
        .unwrap_or(0)
        .max("ENTITY".len());
    let mut out = format!("{:<width$}  VERSION  NOTES\n", "ENTITY");
    for record in records {
        out.push_str(&format!(
            "{:<width$}  {:>7}  {}\n",
            record.entity_name, record.version, record.notes
        ));
    }
    out
}

fn format_report(report: &MigrationReport) -> String {
    let mut out = String::new();
    for (entity, outcome) in &report.entities {
        out.push_str(&format!("{entity}: {outcome}\n"));
    }
    for drift in &report.drifts {
        out.push_str(&format!("warning: {drift}\n"));
    }
    for entity in &report.pruned {
        out.push_str(&format!("pruned: {entity}\n"));
    }
    out
}
