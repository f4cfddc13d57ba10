//! # Connection Configuration
//!
//! This module defines the connection descriptor handed to one export
//! invocation: the credentials and parameters needed to open a single
//! database session, read once at startup and immutable afterwards. Two
//! mutually exclusive access modes reach the same logical table, a direct
//! PostgreSQL connection and a hosted Supabase (PostgREST) endpoint.
//!
//! ## Usage
//!
//! Build a [`ConnectionSettings`] from the process environment or CLI
//! arguments and call [`ConnectionSettings::resolve`] to validate it into
//! a [`ConnectionDescriptor`]. Credentials are redacted from all `Debug`
//! output and never logged.
//!
//! ## Submodules
//!
//! - **descriptor**: Descriptor types and access-mode resolution.

mod descriptor;

pub use descriptor::{
    AccessMode, ConnectionDescriptor, ConnectionSettings, DirectParams, SupabaseParams,
};
