use crate::config::ConnectionDescriptor;
use crate::error::ExportResult;
use crate::fetch::fetch_table_snapshot;
use log::info;
use std::path::Path;

/// Exports a complete snapshot of a table to a CSV file.
///
/// Runs the whole one-shot sequence: opens one connection, executes a
/// single unfiltered read of the named table, and serializes the header
/// plus every row to the destination. The destination is only touched
/// once the full row set is in memory, so connection and query failures
/// leave any existing file intact. There are no retries and no
/// pagination; a failed fetch is terminal for this invocation.
///
/// # Arguments
///
/// * `descriptor` - Connection descriptor selecting the access mode.
/// * `table` - Non-empty name of the table to snapshot.
/// * `destination` - Path of the export artifact; overwritten if present.
///
/// # Returns
///
/// * `Ok(usize)` - Count of rows written, equal to the row set size
///   observed at fetch time.
/// * `Err(ExportError)` - Connection, query, or write failure.
///
/// # Examples
///
/// ```rust,no_run
/// use std::path::Path;
/// use table_snapshot::config::{ConnectionDescriptor, DirectParams};
/// use table_snapshot::export::export_table;
///
/// #[tokio::main]
/// async fn main() -> anyhow::Result<()> {
///     let descriptor = ConnectionDescriptor::Direct(DirectParams {
///         host: "localhost".to_string(),
///         port: 5432,
///         dbname: "app".to_string(),
///         user: "postgres".to_string(),
///         password: "secret".to_string(),
///     });
///     let written = export_table(&descriptor, "users", Path::new("users_export.csv")).await?;
///     println!("Exported {} rows", written);
///     Ok(())
/// }
/// ```
pub async fn export_table(
  descriptor: &ConnectionDescriptor,
  table: &str,
  destination: &Path,
) -> ExportResult<usize> {
  info!("Snapshotting table {} ({} mode)", table, descriptor.mode_name());

  let snapshot = fetch_table_snapshot(descriptor, table).await?;
  let written = super::csv::write_snapshot_csv(&snapshot, destination)?;

  Ok(written)
}
