//! Persistence error types for the identity stores.
//!
//! This module defines structured error types for storage operations. Domain
//! outcomes (wrong login, wrong password, occupied login) live in
//! `user::UserError`; everything here is a storage anomaly or a configuration
//! problem.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur in the storage layer.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Existing variants will not be removed in minor versions
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BackendError {
    /// Encoding the user set failed.
    #[error("Serialization failed")]
    SerializationFailed {
        /// The underlying serialization error
        #[source]
        source: serde_json::Error,
    },

    /// Stored content is not a well-formed user list.
    #[error("Failed to decode users")]
    DecodeFailed {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// A stored record is structurally valid but breaks the user invariants.
    #[error("Corrupted user record (login {login:?}, id {id}): {reason}")]
    CorruptedRecord {
        /// Login of the offending record, possibly empty
        login: String,
        /// Identifier of the offending record, possibly invalid
        id: i64,
        /// What is wrong with it
        reason: String,
    },

    /// File I/O error.
    #[error("File I/O error on {}", path.display())]
    FileIo {
        /// The file being read or written
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// No codec handles this file extension.
    #[error("Unsupported users file extension: {}", path.display())]
    UnsupportedExtension {
        /// The rejected path
        path: PathBuf,
    },

    /// A modification touched a different number of rows than it must.
    #[error("{operation} for login {login:?} affected {affected} rows, expected 1")]
    UnexpectedRowCount {
        /// The statement that misbehaved
        operation: &'static str,
        /// The login being modified
        login: String,
        /// Rows actually affected
        affected: u64,
    },

    /// The database handed back no identifier, or one below 1, for a new user.
    #[error("Invalid identifier {id:?} generated for login {login:?}")]
    InvalidGeneratedId {
        /// The login being registered
        login: String,
        /// The identifier returned, if any
        id: Option<i64>,
    },

    /// Generic SQL database error.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("SQL error: {reason}")]
    SqlxError {
        /// Description of what went wrong
        reason: String,
        /// The underlying sqlx error, if available
        #[source]
        source: Option<sqlx::Error>,
    },

    /// A transaction failed and rolling it back failed too.
    #[cfg(any(feature = "sqlite", feature = "postgres"))]
    #[error("{cause}; rollback failed: {source}")]
    RollbackFailed {
        /// The error that aborted the transaction
        cause: Box<crate::Error>,
        /// The rollback error
        #[source]
        source: sqlx::Error,
    },
}

impl BackendError {
    /// Check if this error is related to I/O or encoding.
    pub fn is_io_error(&self) -> bool {
        matches!(
            self,
            BackendError::FileIo { .. }
                | BackendError::SerializationFailed { .. }
                | BackendError::DecodeFailed { .. }
        )
    }

    /// Check if this error indicates stored data failed validation.
    pub fn is_integrity_error(&self) -> bool {
        matches!(
            self,
            BackendError::DecodeFailed { .. } | BackendError::CorruptedRecord { .. }
        )
    }

    /// Check if this error is a modification anomaly reported by the database.
    pub fn is_modification_anomaly(&self) -> bool {
        matches!(
            self,
            BackendError::UnexpectedRowCount { .. } | BackendError::InvalidGeneratedId { .. }
        )
    }

    /// Check if this error is a configuration problem.
    pub fn is_config_error(&self) -> bool {
        matches!(self, BackendError::UnsupportedExtension { .. })
    }

    /// Check if this error came from the SQL layer.
    pub fn is_sql_error(&self) -> bool {
        match self {
            #[cfg(any(feature = "sqlite", feature = "postgres"))]
            BackendError::SqlxError { .. } | BackendError::RollbackFailed { .. } => true,
            _ => false,
        }
    }
}

// Conversion from BackendError to the main Error type
impl From<BackendError> for crate::Error {
    fn from(err: BackendError) -> Self {
        crate::Error::Backend(err)
    }
}
