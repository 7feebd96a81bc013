//! JSON error envelope and the API error type handlers return.
//!
//! Success bodies are serialized as-is by the handlers. Every failure goes
//! through [`ApiError`] and is rendered as:
//!
//! ```json
//! {"status": "Error", "error": "<message>"}
//! ```

use axum::Json;
use axum::extract::rejection::BytesRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

use crate::store::StorageError;
use crate::student::ValidationErrors;

/// Value of the `status` field in error bodies.
pub const STATUS_ERROR: &str = "Error";

/// Error body sent for every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub status: String,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            error: error.into(),
        }
    }
}

/// Small `{"message": ...}` body for update and delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Request failures, each mapped to one HTTP status.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed or missing input: bad path id, empty or undecodable body.
    #[error("{0}")]
    BadRequest(String),

    /// Creation payload failed field constraints.
    #[error("{0}")]
    ValidationFailed(#[from] ValidationErrors),

    /// Request body exceeded the configured limit.
    #[error("request body too large")]
    PayloadTooLarge,

    /// The request did not complete within the server timeout.
    #[error("request timed out")]
    Timeout,

    /// The storage backend failed.
    #[error("{0}")]
    Storage(#[from] StorageError),

    /// Anything else.
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::ValidationFailed(_) => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Timeout => StatusCode::REQUEST_TIMEOUT,
            Self::Storage(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            Self::Storage(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message exposed to the client.
    ///
    /// Storage failures other than not-found are reduced to a generic
    /// message; the underlying error is logged instead.
    fn public_message(&self) -> String {
        match self {
            Self::Storage(e) if e.is_not_found() => e.to_string(),
            Self::Storage(_) => "storage operation failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<BytesRejection> for ApiError {
    fn from(rejection: BytesRejection) -> Self {
        match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => Self::PayloadTooLarge,
            _ => Self::BadRequest(rejection.body_text()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        error_response(status, self.public_message())
    }
}

/// Build an error envelope response with an explicit status.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}
