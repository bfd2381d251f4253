//! Error types for recdao core.

use thiserror::Error;

/// Errors raised while building records or identities.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("record must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("invalid record id: {0}")]
    InvalidId(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
