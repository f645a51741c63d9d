//! Error types for audit reads

use crate::config::ConfigError;
use thiserror::Error;

/// Errors that can occur while reading audit history.
#[derive(Debug, Error)]
pub enum AuditError {
    /// A caller-supplied argument was rejected before any SQL was executed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The metadata provider has no mapping for the entity type.
    #[error("Unknown entity type: {0}")]
    UnknownEntity(String),

    /// The database driver failed while executing a statement.
    #[error("Query execution failed: {0}")]
    QueryExecution(#[source] sqlx::Error),

    /// A row carried a value that could not be mapped onto an audit entry.
    #[error("Unexpected value in column '{column}': {message}")]
    Decode {
        /// Column that failed to decode.
        column: String,
        /// What went wrong.
        message: String,
    },

    /// The requested pager page lies beyond the last page.
    #[error("Page {page} is out of range (last page is {pages})")]
    PageOutOfRange {
        /// Requested page.
        page: u32,
        /// Number of available pages.
        pages: u32,
    },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<sqlx::Error> for AuditError {
    fn from(err: sqlx::Error) -> Self {
        AuditError::QueryExecution(err)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AuditError>;
