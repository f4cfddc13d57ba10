//! # Error Taxonomy for Snapshot Exports
//!
//! Every failure of an export maps to one of three mutually exclusive
//! classes: the database could not be reached (or refused the
//! credentials), the snapshot query itself failed, or the artifact could
//! not be written. Nothing is recovered locally; callers decide whether
//! to log, retry, or abort.

use std::error::Error as StdError;
use thiserror::Error;

/// Result type for snapshot export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// Failure classes of a single export invocation.
#[derive(Error, Debug)]
pub enum ExportError {
    /// The database was unreachable or the credentials were rejected.
    /// The destination file has not been created or overwritten.
    #[error("connection failed: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// The snapshot query failed server-side, e.g. the table does not
    /// exist or a column could not be decoded.
    #[error("query failed: {message}")]
    Query {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// The destination path was not writable. A partially written
    /// artifact must be treated as invalid.
    #[error("write failed: {message}")]
    Write {
        message: String,
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },
}

impl ExportError {
    /// Builds a [`ExportError::Connection`] wrapping an underlying error.
    pub fn connection<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ExportError::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Builds a [`ExportError::Connection`] from a message alone.
    pub fn connection_message(message: impl Into<String>) -> Self {
        ExportError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a [`ExportError::Query`] wrapping an underlying error.
    pub fn query<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ExportError::Query {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Builds a [`ExportError::Query`] from a message alone.
    pub fn query_message(message: impl Into<String>) -> Self {
        ExportError::Query {
            message: message.into(),
            source: None,
        }
    }

    /// Builds a [`ExportError::Write`] wrapping an underlying error.
    pub fn write<E>(message: impl Into<String>, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        ExportError::Write {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns `true` for the connection failure class.
    pub fn is_connection(&self) -> bool {
        matches!(self, ExportError::Connection { .. })
    }

    /// Returns `true` for the query failure class.
    pub fn is_query(&self) -> bool {
        matches!(self, ExportError::Query { .. })
    }

    /// Returns `true` for the write failure class.
    pub fn is_write(&self) -> bool {
        matches!(self, ExportError::Write { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tests that each class renders its prefix and message.
    #[test]
    fn test_error_display() {
        let e = ExportError::connection_message("host unreachable");
        assert_eq!(e.to_string(), "connection failed: host unreachable");

        let e = ExportError::query_message("relation \"users\" does not exist");
        assert_eq!(
            e.to_string(),
            "query failed: relation \"users\" does not exist"
        );

        let e = ExportError::write(
            "failed to create out.csv",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(e.to_string(), "write failed: failed to create out.csv");
    }

    /// Tests that the classifier predicates are mutually exclusive.
    #[test]
    fn test_error_classification() {
        let e = ExportError::connection_message("refused");
        assert!(e.is_connection());
        assert!(!e.is_query());
        assert!(!e.is_write());

        let e = ExportError::query_message("missing table");
        assert!(e.is_query());
    }

    /// Tests that a wrapped source error stays reachable on the chain.
    #[test]
    fn test_error_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let e = ExportError::write("flush failed", io);
        assert!(e.source().is_some());

        let e = ExportError::query_message("no source");
        assert!(e.source().is_none());
    }
}
