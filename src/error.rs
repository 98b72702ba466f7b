//! Error types for metadata harvesting.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::services::database::traits::Dialect;

/// Result type for harvesting operations.
pub type HarvestResult<T> = Result<T, HarvestError>;

/// Errors that can occur while harvesting metadata.
///
/// `Connection` and `Query` abort a whole extraction. `Transform` is only ever
/// raised inside the transformer, which logs it and drops the offending row.
#[derive(Error, Debug)]
pub enum HarvestError {
    /// Authentication, network or driver failure while connecting.
    #[error("failed to connect to {dialect}: {message}")]
    Connection { dialect: Dialect, message: String },

    /// Malformed query, permission denial, lost connection or a row that
    /// breaks the catalog query contract.
    #[error("{dialect} query failed: {message}")]
    Query { dialect: Dialect, message: String },

    /// A raw row could not be turned into an entity.
    #[error("cannot build {kind} entity: {message}")]
    Transform { kind: String, message: String },

    /// Spreadsheet missing, of the wrong kind, or unreadable.
    #[error("spreadsheet {}: {message}", path.display())]
    File { path: PathBuf, message: String },
}

impl HarvestError {
    pub fn connection(dialect: Dialect, err: impl std::fmt::Display) -> Self {
        Self::Connection {
            dialect,
            message: err.to_string(),
        }
    }

    pub fn query(dialect: Dialect, err: impl std::fmt::Display) -> Self {
        Self::Query {
            dialect,
            message: err.to_string(),
        }
    }

    pub fn transform(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transform {
            kind: kind.into(),
            message: message.into(),
        }
    }

    pub fn file(path: &Path, message: impl Into<String>) -> Self {
        Self::File {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_carry_dialect() {
        let err = HarvestError::connection(Dialect::MySQL, "access denied");
        assert_eq!(err.to_string(), "failed to connect to MySQL: access denied");

        let err = HarvestError::query(Dialect::Oracle, "ORA-00942");
        assert_eq!(err.to_string(), "Oracle query failed: ORA-00942");
    }

    #[test]
    fn test_file_error_shows_path() {
        let err = HarvestError::file(Path::new("/data/book.xlsx"), "file not found");
        assert_eq!(err.to_string(), "spreadsheet /data/book.xlsx: file not found");
    }
}
