//! sqlkit developer CLI.
//!
//! Runs statements against a database file, lists its tables and writes or
//! inspects whole-database snapshots. Set `RUST_LOG=sqlkit_core=debug` to see
//! every statement that is executed.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use eyre::{eyre, WrapErr};
use sqlkit_core::{DatabaseSpec, QueryDescriptor, QueryOutcome, RegisterOptions, SqlKit};
use tracing_subscriber::EnvFilter;

/// Name the `inspect` command registers the restored snapshot under.
const SNAPSHOT_NAME: &str = "snapshot";

#[derive(Debug, Parser)]
#[command(name = "sqlkit", author, version, about = "Query SQLite databases through sqlkit", long_about = None)]
struct Cli {
    /// Database as `PATH` or `NAME=PATH`.
    #[arg(long, short, env = "SQLKIT_DATABASE", global = true)]
    database: Option<DatabaseSpec>,

    /// Hold a single connection for the whole command.
    #[arg(long, env = "SQLKIT_KEEP_OPEN", global = true)]
    keep_open: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create the database file
    Create,

    /// Run statements that return no rows
    Exec {
        /// SQL text
        sql: String,
    },

    /// Run a query and print the outcome as JSON
    Query {
        /// SQL text
        sql: String,
    },

    /// Build and run a SELECT
    Select {
        /// Table to select from (repeatable)
        #[arg(long = "table", required = true)]
        tables: Vec<String>,

        /// Column to return (repeatable)
        #[arg(long = "field", default_value = "*")]
        fields: Vec<String>,

        /// WHERE clause
        #[arg(long = "where")]
        filter: Option<String>,

        /// Maximum number of rows, negative for no limit
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        limit: i64,

        /// Rows to skip
        #[arg(long, default_value_t = 0)]
        offset: i64,
    },

    /// List the tables of the database
    Tables,

    /// Write a snapshot of the database to a file
    Dump {
        /// Output file
        #[arg(long)]
        out: PathBuf,
    },

    /// Load a snapshot into memory and query it
    Inspect {
        /// Snapshot file written by `dump`
        #[arg(long)]
        snapshot: PathBuf,

        /// SQL text
        sql: String,
    },
}

fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = run(cli)?;
    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

/// Executes the parsed command and returns what should be printed.
fn run(cli: Cli) -> eyre::Result<String> {
    if let Command::Inspect { snapshot, sql } = &cli.command {
        return inspect(snapshot, sql);
    }

    let spec = cli
        .database
        .ok_or_else(|| eyre!("no database given, pass --database or set SQLKIT_DATABASE"))?;

    if matches!(cli.command, Command::Create) {
        SqlKit::try_create(&spec.path)?;
        tracing::info!("created {}", spec.path.display());
        return Ok(String::new());
    }

    let mut kit = SqlKit::new();
    kit.try_register(
        &spec.name,
        &spec.path,
        RegisterOptions::new().keep_open(cli.keep_open),
    )?;
    let name = spec.name.as_str();

    match cli.command {
        Command::Create | Command::Inspect { .. } => Ok(String::new()),
        Command::Exec { sql } => {
            kit.try_exec(name, &sql)?;
            Ok(String::new())
        }
        Command::Query { sql } => render(&kit.try_query(name, &sql)?),
        Command::Select {
            tables,
            fields,
            filter,
            limit,
            offset,
        } => {
            let descriptor = QueryDescriptor::new(tables, fields)
                .filter(filter.unwrap_or_default())
                .limit(limit)
                .offset(offset);
            render(&kit.try_select(name, &descriptor)?)
        }
        Command::Tables => {
            let outcome = kit.try_query(
                name,
                "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
            )?;
            let names: Vec<String> = outcome
                .rows()
                .iter()
                .filter_map(|row| row.get("name").and_then(|v| v.as_str()).map(str::to_string))
                .collect();
            Ok(names.join("\n"))
        }
        Command::Dump { out } => {
            let image = kit.try_dump(name)?;
            std::fs::write(&out, &image)
                .wrap_err_with(|| format!("failed to write {}", out.display()))?;
            tracing::info!("wrote {} bytes to {}", image.len(), out.display());
            Ok(String::new())
        }
    }
}

fn inspect(snapshot: &Path, sql: &str) -> eyre::Result<String> {
    let image = std::fs::read(snapshot)
        .wrap_err_with(|| format!("failed to read {}", snapshot.display()))?;
    let mut kit = SqlKit::new();
    kit.try_register(
        SNAPSHOT_NAME,
        Path::new(":memory:"),
        RegisterOptions::new()
            .test_before_register(false)
            .keep_open(true),
    )?;
    kit.try_restore(SNAPSHOT_NAME, &image)?;
    render(&kit.try_query(SNAPSHOT_NAME, sql)?)
}

fn render(outcome: &QueryOutcome) -> eyre::Result<String> {
    Ok(serde_json::to_string_pretty(outcome)?)
}
