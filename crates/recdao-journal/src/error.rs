//! Error types for the journal module.

use recdao_store::StoreError;
use thiserror::Error;

/// Errors that can occur while journaling or replaying.
#[derive(Debug, Error)]
pub enum JournalError {
    /// The delegate, journal or replay target store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A journal record does not have the entry layout.
    #[error("malformed journal entry: {0}")]
    MalformedEntry(String),

    /// The background append worker has stopped.
    #[error("journal writer closed")]
    WriterClosed,
}

/// Result type for journal operations.
pub type Result<T> = std::result::Result<T, JournalError>;
