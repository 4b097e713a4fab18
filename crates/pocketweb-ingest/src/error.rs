//! Error types for pocketweb-ingest
//!
//! Only decoder and mapper failures live here: they are fatal and abort the
//! whole ingestion call. Per-row failures are data, not errors -- they are
//! collected as `RejectedRow` values and returned alongside accepted records.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mapping::SchemaKind;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IngestErrorCode {
    /// No line qualified as a header row
    HeaderNotFound,
    /// A schema-required field has no column
    MappingIncomplete,
}

impl std::fmt::Display for IngestErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IngestErrorCode::HeaderNotFound => write!(f, "HEADER_NOT_FOUND"),
            IngestErrorCode::MappingIncomplete => write!(f, "MAPPING_INCOMPLETE"),
        }
    }
}

/// Fatal ingestion errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestError {
    #[error("Could not auto-detect header row with required columns ({})", schema.required_columns_hint())]
    HeaderNotFound { schema: SchemaKind },

    #[error("Column mapping is incomplete, missing: {}", fields.join(", "))]
    MappingIncomplete { fields: Vec<String> },
}

impl IngestError {
    /// Get the error code
    pub fn code(&self) -> IngestErrorCode {
        match self {
            IngestError::HeaderNotFound { .. } => IngestErrorCode::HeaderNotFound,
            IngestError::MappingIncomplete { .. } => IngestErrorCode::MappingIncomplete,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(IngestErrorCode::HeaderNotFound.to_string(), "HEADER_NOT_FOUND");
        assert_eq!(
            IngestErrorCode::MappingIncomplete.to_string(),
            "MAPPING_INCOMPLETE"
        );
    }

    #[test]
    fn test_mapping_incomplete_names_fields() {
        let err = IngestError::MappingIncomplete {
            fields: vec!["description".to_string(), "amount".to_string()],
        };
        assert_eq!(err.code(), IngestErrorCode::MappingIncomplete);
        assert!(err.to_string().contains("description"));
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn test_header_not_found_names_schema_columns() {
        let err = IngestError::HeaderNotFound {
            schema: SchemaKind::Transaction,
        };
        assert!(err.to_string().contains("Date"));
    }
}
