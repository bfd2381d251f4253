//! Error types for the Database facade.

use recdao_journal::JournalError;
use recdao_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Collection names are non-empty ASCII alphanumerics, `-` or `_`.
    #[error("invalid collection name: {0:?}")]
    InvalidName(String),

    /// Storage error.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Journal error, including failed recovery.
    #[error("journal error: {0}")]
    Journal(#[from] JournalError),

    /// The journal directory could not be created.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for Database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
