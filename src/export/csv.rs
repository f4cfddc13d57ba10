use crate::error::{ExportError, ExportResult};
use crate::fetch::TableSnapshot;
use csv::Writer;
use log::info;
use std::path::Path;

/// Writes a snapshot to a CSV file at the destination path.
///
/// The header record is written first, then one record per row in
/// snapshot order. Fields containing the delimiter, quotes, or newlines
/// are quoted per standard CSV escaping rules. An existing file at the
/// destination is fully overwritten.
///
/// A snapshot without columns (an empty hosted record set carries no
/// metadata) produces an empty file.
///
/// # Arguments
///
/// * `snapshot` - The fetched snapshot to serialize.
/// * `destination` - Path of the export artifact.
///
/// # Returns
///
/// * `Ok(usize)` - Count of data rows written, equal to the snapshot's
///   row count.
/// * `Err(ExportError::Write)` - The destination was not writable or a
///   record could not be written; any partial file is invalid output.
pub fn write_snapshot_csv(snapshot: &TableSnapshot, destination: &Path) -> ExportResult<usize> {
  if snapshot.columns.is_empty() {
    std::fs::write(destination, b"").map_err(|e| {
      ExportError::write(format!("failed to write {}", destination.display()), e)
    })?;
    return Ok(0);
  }

  let mut writer = Writer::from_path(destination).map_err(|e| {
    ExportError::write(format!("failed to create {}", destination.display()), e)
  })?;

  writer.write_record(&snapshot.columns).map_err(|e| {
    ExportError::write(format!("failed to write header to {}", destination.display()), e)
  })?;

  for row in &snapshot.rows {
    writer.write_record(row).map_err(|e| {
      ExportError::write(format!("failed to write row to {}", destination.display()), e)
    })?;
  }

  writer.flush().map_err(|e| {
    ExportError::write(format!("failed to flush {}", destination.display()), e)
  })?;

  info!("Wrote {} row(s) to {}", snapshot.row_count(), destination.display());
  Ok(snapshot.row_count())
}
