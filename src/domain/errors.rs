//! Store-level error taxonomy returned by application handlers.
//!
//! # HTTP Status Mapping
//!
//! | Error | HTTP Status |
//! |-------|-------------|
//! | Validation | 400 |
//! | Authentication | 400 |
//! | NotFound | 404 |
//! | Processing | 500 |
//!
//! Authentication failures answer 400 rather than 401: they come from
//! webhook signatures, and the provider only needs to know the payload
//! was refused.

use thiserror::Error;

use super::foundation::{DomainError, ErrorCode, ValidationError};
use super::payment::WebhookError;

/// Errors surfaced by store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Bad input, insufficient stock, unknown or inactive product.
    #[error("{0}")]
    Validation(String),

    /// Webhook signature could not be verified.
    #[error("{0}")]
    Authentication(String),

    #[error("{message}")]
    NotFound { code: ErrorCode, message: String },

    /// Datastore or gateway failure. The message is for logs only.
    #[error("{0}")]
    Processing(String),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        StoreError::Authentication(message.into())
    }

    pub fn product_not_found() -> Self {
        StoreError::NotFound {
            code: ErrorCode::ProductNotFound,
            message: "Product not found".to_string(),
        }
    }

    pub fn order_not_found() -> Self {
        StoreError::NotFound {
            code: ErrorCode::OrderNotFound,
            message: "Order not found".to_string(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        StoreError::Processing(message.into())
    }

    /// Returns the error code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            StoreError::Validation(_) => ErrorCode::ValidationFailed,
            StoreError::Authentication(_) => ErrorCode::Unauthorized,
            StoreError::NotFound { code, .. } => *code,
            StoreError::Processing(_) => ErrorCode::InternalError,
        }
    }

    /// True for errors caused by the caller rather than by us.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, StoreError::Processing(_))
    }
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::Validation(err.to_string())
    }
}

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        StoreError::Processing(err.to_string())
    }
}

impl From<WebhookError> for StoreError {
    fn from(err: WebhookError) -> Self {
        if err.is_signature_failure() {
            StoreError::Authentication(err.to_string())
        } else {
            StoreError::Validation(err.to_string())
        }
    }
}
