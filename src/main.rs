//! Table Snapshot Exporter: Fetch a Table and Export It to CSV
//!
//! This application takes a complete snapshot of one database table and
//! writes it to a CSV file: header first, then every row in the order the
//! database returned them. The same logical table can be reached two ways,
//! selected per invocation and never combined:
//!
//! - **Direct**: a PostgreSQL connection configured by the `DB_*` variables.
//! - **Hosted**: a Supabase (PostgREST) endpoint configured by the
//!   `SUPABASE_*` variables.
//!
//! ## Design Overview
//! - **Configuration**: The `config` module resolves environment/CLI inputs
//!   into a connection descriptor tagged by access mode.
//! - **Fetching**: The `fetch` module opens one connection and executes a
//!   single unfiltered read of the table.
//! - **Exporting**: The `export` module serializes the snapshot to the
//!   destination file and reports the row count.
//!
//! ## Dependencies
//! - **`tokio`**: Asynchronous runtime for network and database operations.
//! - **`tokio-postgres`**: Direct PostgreSQL database interaction.
//! - **`reqwest`**: HTTP requests to the hosted PostgREST endpoint.
//! - **`csv`**: CSV serialization with standard quoting rules.
//! - **`clap`**: Command-line arguments with environment fallbacks.
//! - **`dotenv`**: Loading environment variables from a `.env` file.
//! - **`log` and `env_logger`**: Structured logging instead of `println!`.
//!
//! ## Usage
//! 1. Configure the application using either a `.env` file or CLI arguments:
//!    ```env
//!    DB_HOST=localhost
//!    DB_PORT=5432
//!    DB_NAME=app
//!    DB_USER=postgres
//!    DB_PASSWORD=secret
//!    ```
//!    or, for the hosted mode:
//!    ```env
//!    SUPABASE_URL=https://abc.supabase.co
//!    SUPABASE_SERVICE_ROLE=service-role-key
//!    ```
//! 2. Run the export:
//!    ```sh
//!    cargo run -- --table users --output users_export.csv
//!    ```
//!    The access mode is auto-detected (`SUPABASE_URL` present selects the
//!    hosted mode) and can be forced with `--source direct|supabase`.
//! 3. Verify connectivity without exporting:
//!    ```sh
//!    cargo run -- --check
//!    ```
//! 4. Logging is controlled by the `RUST_LOG` environment variable:
//!    ```sh
//!    export RUST_LOG=info
//!    cargo run
//!    ```
//!
//! On success the row count is printed to stdout; on failure the error
//! chain is printed and the process exits non-zero.

use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use log::info;
use std::path::PathBuf;
use table_snapshot::config::{AccessMode, ConnectionSettings};
use table_snapshot::export::export_table;
use table_snapshot::fetch::check_connection;

/// Command-line arguments for configuring one export invocation.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
  /// Name of the table to snapshot.
  #[clap(long, env = "EXPORT_TABLE", default_value = "users")]
  table: String,

  /// Destination path of the CSV artifact; overwritten if present.
  #[clap(long, env = "EXPORT_PATH", default_value = "users_export.csv")]
  output: PathBuf,

  /// Access mode; auto-detected from the environment when omitted.
  #[clap(long, value_enum)]
  source: Option<AccessMode>,

  /// PostgreSQL host for direct exports.
  #[clap(long, env = "DB_HOST", default_value = "localhost")]
  db_host: String,

  /// PostgreSQL port for direct exports.
  #[clap(long, env = "DB_PORT", default_value_t = 5432)]
  db_port: u16,

  /// PostgreSQL database name for direct exports.
  #[clap(long, env = "DB_NAME")]
  db_name: Option<String>,

  /// PostgreSQL user for direct exports.
  #[clap(long, env = "DB_USER")]
  db_user: Option<String>,

  /// PostgreSQL password for direct exports.
  #[clap(long, env = "DB_PASSWORD", hide_env_values = true)]
  db_password: Option<String>,

  /// Supabase project URL for hosted exports.
  #[clap(long, env = "SUPABASE_URL")]
  supabase_url: Option<String>,

  /// Supabase service role key for hosted exports.
  #[clap(long, env = "SUPABASE_SERVICE_ROLE", hide_env_values = true)]
  supabase_service_role: Option<String>,

  /// Verify the connection and exit without exporting anything.
  #[clap(long, action)]
  check: bool,
}

/// Resolves the connection descriptor and runs one export (or a
/// connection check) end to end.
///
/// # Returns
/// - `Ok(())` if the export (or check) completes successfully.
/// - `Err(anyhow::Error)` if configuration, connection, query, or write
///   fails; the process then exits non-zero.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialize logging
  env_logger::init();

  // Load environment variables from .env file (if present)
  dotenv().ok();

  // Parse command-line arguments
  let args = Args::parse();

  let settings = ConnectionSettings {
    source: args.source,
    db_host: args.db_host,
    db_port: args.db_port,
    db_name: args.db_name,
    db_user: args.db_user,
    db_password: args.db_password,
    supabase_url: args.supabase_url,
    supabase_service_role: args.supabase_service_role,
  };
  let descriptor = settings
    .resolve()
    .context("Failed to resolve connection settings")?;
  info!("Resolved {} access mode", descriptor.mode_name());

  if args.check {
    check_connection(&descriptor)
      .await
      .context("Connection check failed")?;
    println!("Connection OK ({} mode)", descriptor.mode_name());
    return Ok(());
  }

  let written = export_table(&descriptor, &args.table, &args.output)
    .await
    .with_context(|| format!("Failed to export table {}", args.table))?;
  println!(
    "Exported {} rows from {} to {}",
    written,
    args.table,
    args.output.display()
  );

  Ok(())
}
