//! Error types for pocketweb-api
//!
//! Every error converts into a JSON body `{success: false, error, code}`.
//! Fatal ingestion errors surface as 400 so the client can show the message
//! and fall back to a manual column mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use pocketweb_core::{CoreError, CoreErrorCode};

/// Main error type for pocketweb-api
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            message: message.into(),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => match e.code() {
                CoreErrorCode::NotFound => StatusCode::NOT_FOUND,
                CoreErrorCode::StoreFailed => StatusCode::INTERNAL_SERVER_ERROR,
                CoreErrorCode::IngestFailed | CoreErrorCode::InvalidInput => {
                    StatusCode::BAD_REQUEST
                }
            },
            ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> String {
        match self {
            ApiError::BadRequest { .. } => "BAD_REQUEST".to_string(),
            ApiError::Core(e) => e.code().to_string(),
            ApiError::Internal => "INTERNAL".to_string(),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for ApiError {
    fn from(e: axum::extract::multipart::MultipartError) -> Self {
        ApiError::BadRequest {
            message: format!("Malformed multipart request: {}", e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Store failures keep their detail in the log, not the response
        let message = match &self {
            ApiError::Core(CoreError::Store(e)) => {
                log::error!("store failure: {}", e);
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };
        let body = Json(json!({
            "success": false,
            "error": message,
            "code": self.code(),
        }));
        (status, body).into_response()
    }
}
