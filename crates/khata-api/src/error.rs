//! Error types for khata-api

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use khata_core::error::{ErrorCode, ErrorDetails};
use khata_core::{CoreError, DefaultErrorLogger, ErrorContext, ErrorLogger};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest { message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => match e {
                CoreError::ValidationError { .. } => StatusCode::BAD_REQUEST,
                CoreError::PersonNotFound { .. } => StatusCode::NOT_FOUND,
                CoreError::StorageError { .. } => StatusCode::SERVICE_UNAVAILABLE,
                CoreError::ConfigError { .. } | CoreError::InternalError { .. } => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        match self {
            ApiError::BadRequest { .. } => ErrorDetails::new(ErrorCode::ValidationError, self.to_string()),
            ApiError::Core(e) => e.to_details(),
        }
    }

    /// Log core failures with the operation that hit them
    pub fn logged(self, operation: &str) -> Self {
        self.logged_with(ErrorContext::new(operation))
    }

    pub fn logged_with(self, context: ErrorContext) -> Self {
        if let ApiError::Core(e) = &self {
            DefaultErrorLogger.log_error(e, &context);
        }
        self
    }
}

/// Malformed or incomplete JSON bodies are validation failures
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(rejection.body_text())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        ApiError::Core(CoreError::InternalError { message: error.to_string() })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_details())).into_response()
    }
}
