//! # Fetching Table Snapshots
//!
//! This module produces the in-memory row set of one table at call time.
//! It dispatches on the access mode carried by the connection descriptor:
//! a direct PostgreSQL connection issues a single unfiltered `SELECT *`,
//! while the hosted mode reads the same logical table through a Supabase
//! (PostgREST) endpoint. Either way the column header comes from the
//! driver's result metadata and the rows keep database order.
//!
//! ## Usage
//!
//! The primary entry point is [`fetch_table_snapshot`], which takes a
//! [`ConnectionDescriptor`](crate::config::ConnectionDescriptor) and a
//! table name. [`check_connection`] verifies reachability without
//! fetching anything.
//!
//! ## Submodules
//!
//! - **postgres**: Direct PostgreSQL fetch.
//! - **supabase**: Hosted PostgREST fetch.
//! - **types**: The snapshot structure produced by both modes.

mod postgres;
mod supabase;
mod types;

pub use postgres::fetch_postgres_snapshot;
pub use supabase::fetch_supabase_snapshot;
pub use types::TableSnapshot;

use crate::config::ConnectionDescriptor;
use crate::error::{ExportError, ExportResult};

/// Fetches a complete snapshot of a table through the descriptor's
/// access mode.
///
/// # Arguments
///
/// * `descriptor` - Connection descriptor selecting the access mode.
/// * `table` - Non-empty name of the table to snapshot.
///
/// # Returns
///
/// * `Ok(TableSnapshot)` - Header and all rows at fetch time.
/// * `Err(ExportError)` - Connection or query failure; an empty table
///   name is rejected before any connection is attempted.
pub async fn fetch_table_snapshot(
    descriptor: &ConnectionDescriptor,
    table: &str,
) -> ExportResult<TableSnapshot> {
    if table.trim().is_empty() {
        return Err(ExportError::query_message("table name must not be empty"));
    }
    match descriptor {
        ConnectionDescriptor::Direct(params) => {
            postgres::fetch_postgres_snapshot(params, table).await
        }
        ConnectionDescriptor::Supabase(params) => {
            supabase::fetch_supabase_snapshot(params, table).await
        }
    }
}

/// Verifies that the descriptor can reach the database. No file is
/// touched either way.
pub async fn check_connection(descriptor: &ConnectionDescriptor) -> ExportResult<()> {
    match descriptor {
        ConnectionDescriptor::Direct(params) => {
            postgres::check_postgres_connection(params).await
        }
        ConnectionDescriptor::Supabase(params) => {
            supabase::check_supabase_connection(params).await
        }
    }
}
