//! Error types for the store module.

use recdao_core::{CoreError, RecordId};
use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record with this id exists.
    #[error("record not found: {0}")]
    NotFound(RecordId),

    /// The operation needs a record id and none was given.
    #[error("record has no id")]
    MissingId,

    /// Every integer id has been used, so none can be assigned.
    #[error("integer id sequence exhausted")]
    IdsExhausted,

    /// Malformed record or identity.
    #[error("invalid record: {0}")]
    Core(#[from] CoreError),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Record serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A sink rejected a record or the end of stream.
    #[error("sink error: {0}")]
    Sink(String),

    /// A lock guarding store state was poisoned by a panicking thread.
    #[error("store lock poisoned")]
    Poisoned,

    /// A blocking task failed to complete.
    #[error("background task failed: {0}")]
    Task(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

impl StoreError {
    /// True if this is a `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
