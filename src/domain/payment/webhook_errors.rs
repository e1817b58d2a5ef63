//! Webhook verification errors.

use thiserror::Error;

/// Errors raised while authenticating or decoding a webhook.
///
/// None of these are retryable on our side: the payload is rejected with
/// a client error and must not be processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// No signature header on the request.
    #[error("No signatures found matching the expected signature for payload")]
    MissingSignature,

    /// Signature header is not in `t=..,v1=..` form.
    #[error("Unable to extract timestamp and signatures from header: {0}")]
    MalformedHeader(String),

    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is older than the tolerance window.
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Signature matched but the payload could not be decoded.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl WebhookError {
    /// True when the request could not be authenticated.
    pub fn is_signature_failure(&self) -> bool {
        !matches!(self, WebhookError::ParseError(_))
    }
}
