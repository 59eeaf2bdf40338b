//! # Errors
//!
//! One error type for the whole core.
//!
//! Missing records are normally reported as `None`/`false` by the store and
//! the wardrobe service. `NotFound` is only raised where an id is required to
//! make sense of a request (the API maps it to 404).

use thiserror::Error;

/// Result alias used throughout the core.
pub type Result<T> = std::result::Result<T, DadaError>;

/// Errors raised by the wardrobe core.
#[derive(Debug, Error)]
pub enum DadaError {
    /// A referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: u64 },

    /// The caller passed something the operation cannot work with.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The storage backend failed.
    #[error("storage error: {0}")]
    Storage(String),

    /// A record could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// A snapshot did not have the expected shape.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// Filesystem failure while reading or writing a snapshot.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DadaError {
    /// Shorthand for a `NotFound` error.
    #[must_use]
    pub fn not_found(kind: &'static str, id: u64) -> Self {
        Self::NotFound { kind, id }
    }

    /// Check whether this is a `NotFound` error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<postcard::Error> for DadaError {
    fn from(err: postcard::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for DadaError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<redb::Error> for DadaError {
    fn from(err: redb::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<redb::DatabaseError> for DadaError {
    fn from(err: redb::DatabaseError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<redb::TransactionError> for DadaError {
    fn from(err: redb::TransactionError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<redb::TableError> for DadaError {
    fn from(err: redb::TableError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<redb::StorageError> for DadaError {
    fn from(err: redb::StorageError) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<redb::CommitError> for DadaError {
    fn from(err: redb::CommitError) -> Self {
        Self::Storage(err.to_string())
    }
}
