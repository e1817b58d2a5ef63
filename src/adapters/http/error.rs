//! Conversion of store errors into HTTP responses.
//!
//! Every error body is `{"error": "<message>"}`. Server-side failures are
//! logged with their cause and answered with a generic message.

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::errors::StoreError;

const GENERIC_SERVER_ERROR: &str = "Internal server error";

/// JSON error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// API error that converts a `StoreError` into a response.
#[derive(Debug)]
pub struct ApiError {
    error: StoreError,

    /// Message returned in place of a processing failure.
    server_message: &'static str,
}

impl ApiError {
    /// Use `message` instead of the generic text for 500 responses.
    pub fn context(message: &'static str) -> impl FnOnce(StoreError) -> ApiError {
        move |error| ApiError {
            error,
            server_message: message,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        StoreError::validation(message).into()
    }

    fn status(&self) -> StatusCode {
        match &self.error {
            StoreError::Validation(_) | StoreError::Authentication(_) => StatusCode::BAD_REQUEST,
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::Processing(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        Self {
            error,
            server_message: GENERIC_SERVER_ERROR,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::bad_request(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if self.error.is_client_error() {
            tracing::debug!(error = %self.error, code = %self.error.code(), "Request rejected");
            self.error.to_string()
        } else {
            tracing::error!(error = %self.error, code = %self.error.code(), "Request failed");
            self.server_message.to_string()
        };
        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
