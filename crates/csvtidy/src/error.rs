//! HTTP error responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use csvtidy_core::{PipelineError, UploadError};
use serde::{Deserialize, Serialize};

/// JSON body of every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

#[derive(Debug)]
pub enum AppError {
    /// The upload or its options cannot be processed; the client may retry.
    BadRequest(ApiError),
    /// The worker failed or the run ended without output.
    Internal(String),
}

impl AppError {
    pub fn bad_request(code: &str, message: impl Into<String>) -> Self {
        AppError::BadRequest(ApiError::new(code, message))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            AppError::BadRequest(error) => (StatusCode::BAD_REQUEST, error),
            AppError::Internal(message) => {
                tracing::error!("request failed: {message}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("INTERNAL_ERROR", message),
                )
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        AppError::bad_request("NOT_CSV", err.to_string())
    }
}

impl From<PipelineError> for AppError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Parse(_) => AppError::BadRequest(
                ApiError::new("PARSE_ERROR", err.to_string()).with_details(err.kind()),
            ),
            other => AppError::Internal(other.to_string()),
        }
    }
}
