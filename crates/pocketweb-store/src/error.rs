//! Error types for pocketweb-store

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StoreErrorCode {
    /// Stored value could not be serialized or deserialized
    Serialization,
    /// Snapshot file could not be read or written
    Io,
}

impl std::fmt::Display for StoreErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreErrorCode::Serialization => write!(f, "SERIALIZATION"),
            StoreErrorCode::Io => write!(f, "IO"),
        }
    }
}

/// Main error type for pocketweb-store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Snapshot IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StoreError {
    /// Get the error code
    pub fn code(&self) -> StoreErrorCode {
        match self {
            StoreError::Serialization(_) => StoreErrorCode::Serialization,
            StoreError::Io(_) => StoreErrorCode::Io,
        }
    }
}
