//! # Exporting Table Snapshots to CSV
//!
//! This module serializes a fetched snapshot into the export artifact: a
//! UTF-8 CSV file whose first record is the column header, followed by one
//! record per row in database order. The artifact is created fresh on each
//! run and fully overwrites any prior file of the same name.
//!
//! ## Usage
//!
//! The main entry point is [`export_table`], which runs the whole
//! Connect → Fetch-All → Serialize → Close sequence for one table and
//! returns the count of rows written. [`write_snapshot_csv`] serializes an
//! already-fetched snapshot on its own.
//!
//! ## Submodules
//!
//! - **csv**: CSV serialization of a snapshot.
//! - **snapshot**: The one-shot export operation.

mod csv;
mod snapshot;

pub use self::csv::write_snapshot_csv;
pub use self::snapshot::export_table;
