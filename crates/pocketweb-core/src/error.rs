//! Error types for pocketweb-core

use serde::{Deserialize, Serialize};
use thiserror::Error;

use pocketweb_ingest::IngestError;
use pocketweb_store::StoreError;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CoreErrorCode {
    /// Decoder or mapper aborted the ingestion
    IngestFailed,
    /// Storage backend failure
    StoreFailed,
    /// Record does not exist in the requested scope
    NotFound,
    /// Caller-supplied record failed validation
    InvalidInput,
}

impl std::fmt::Display for CoreErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CoreErrorCode::IngestFailed => write!(f, "INGEST_FAILED"),
            CoreErrorCode::StoreFailed => write!(f, "STORE_FAILED"),
            CoreErrorCode::NotFound => write!(f, "NOT_FOUND"),
            CoreErrorCode::InvalidInput => write!(f, "INVALID_INPUT"),
        }
    }
}

/// Main error type for pocketweb-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error(transparent)]
    Ingest(#[from] IngestError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> CoreErrorCode {
        match self {
            CoreError::Ingest(_) => CoreErrorCode::IngestFailed,
            CoreError::Store(_) => CoreErrorCode::StoreFailed,
            CoreError::NotFound { .. } => CoreErrorCode::NotFound,
            CoreError::InvalidInput { .. } => CoreErrorCode::InvalidInput,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        CoreError::InvalidInput {
            reason: reason.into(),
        }
    }
}
