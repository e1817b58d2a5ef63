//! Stripe payment gateway adapter.
//!
//! Implements `PaymentGateway` against the Stripe REST API with `reqwest`.
//!
//! # Security
//!
//! - Webhooks are verified with `StripeWebhookVerifier` (HMAC-SHA256,
//!   constant-time comparison, 5-minute timestamp window)
//! - Secrets are held in `secrecy::SecretString`
//!
//! # Configuration
//!
//! ```ignore
//! let config = StripeConfig::new(secret_key, webhook_secret);
//! let gateway = StripeGateway::new(config)?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};

use crate::config::PaymentConfig;
use crate::domain::payment::{StripeWebhookVerifier, WebhookEvent};
use crate::ports::{
    CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentErrorCode, PaymentGateway,
};

use super::api_types::{checkout_form_params, error_from_response, StripeCheckoutSession};

const DEFAULT_API_BASE_URL: &str = "https://api.stripe.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Stripe API configuration.
#[derive(Clone)]
pub struct StripeConfig {
    /// Stripe secret API key (sk_live_... or sk_test_...).
    secret_key: SecretString,

    /// Webhook signing secret (whsec_...).
    webhook_secret: SecretString,

    /// Base URL for Stripe API (default: https://api.stripe.com).
    api_base_url: String,

    request_timeout: Duration,
}

impl StripeConfig {
    pub fn new(secret_key: impl Into<String>, webhook_secret: impl Into<String>) -> Self {
        Self {
            secret_key: SecretString::new(secret_key.into()),
            webhook_secret: SecretString::new(webhook_secret.into()),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Builds the adapter configuration from application config.
    pub fn from_payment_config(config: &PaymentConfig) -> Self {
        Self {
            secret_key: config.stripe_secret_key.clone(),
            webhook_secret: config.stripe_webhook_secret.clone(),
            api_base_url: config.stripe_api_base_url.clone(),
            request_timeout: config.request_timeout(),
        }
    }

    /// Set a custom API base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Stripe implementation of `PaymentGateway`.
pub struct StripeGateway {
    config: StripeConfig,
    verifier: StripeWebhookVerifier,
    http_client: reqwest::Client,
}

impl StripeGateway {
    pub fn new(config: StripeConfig) -> Result<Self, PaymentError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| PaymentError::network(format!("Failed to build HTTP client: {}", e)))?;
        let verifier = StripeWebhookVerifier::new(config.webhook_secret.expose_secret().as_str());

        Ok(Self {
            config,
            verifier,
            http_client,
        })
    }

    fn sessions_url(&self) -> String {
        format!(
            "{}/v1/checkout/sessions",
            self.config.api_base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let params = checkout_form_params(&request);

        let response = self
            .http_client
            .post(self.sessions_url())
            .basic_auth(self.config.secret_key.expose_secret(), Option::<&str>::None)
            .header("Idempotency-Key", format!("checkout-{}", request.order_id))
            .form(&params)
            .send()
            .await
            .map_err(|e| PaymentError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = error_from_response(status.as_u16(), &body);
            tracing::warn!(
                order_id = %request.order_id,
                status = status.as_u16(),
                code = %err.code,
                "Stripe rejected checkout session request"
            );
            return Err(err);
        }

        let session: StripeCheckoutSession = response.json().await.map_err(|e| {
            PaymentError::new(
                PaymentErrorCode::ProviderError,
                format!("Failed to parse Stripe response: {}", e),
            )
        })?;

        let url = session.url.ok_or_else(|| {
            PaymentError::provider(format!("Checkout session {} has no hosted URL", session.id))
        })?;

        tracing::info!(
            order_id = %request.order_id,
            session_id = %session.id,
            "Stripe checkout session created"
        );

        Ok(CheckoutSession {
            id: session.id,
            url,
        })
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError> {
        let stripe_event = self.verifier.verify_and_parse(payload, signature).map_err(|e| {
            tracing::warn!(error = %e, "Stripe webhook verification failed");
            PaymentError::from(e)
        })?;

        let event_type = stripe_event.event_type.clone();
        let event = stripe_event.into_webhook_event().map_err(|e| {
            tracing::warn!(event_type = %event_type, error = %e, "Stripe event body malformed");
            PaymentError::from(e)
        })?;

        tracing::info!(
            event_id = %event.id,
            event_type = %event_type,
            "Webhook signature verified"
        );
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::{compute_test_signature, PaymentEvent, StripeEventBuilder};
    use serde_json::json;

    const WEBHOOK_SECRET: &str = "whsec_test_secret";

    fn gateway() -> StripeGateway {
        StripeGateway::new(StripeConfig::new("sk_test_key", WEBHOOK_SECRET)).unwrap()
    }

    fn signed(payload: &str) -> String {
        let ts = chrono::Utc::now().timestamp();
        format!("t={},v1={}", ts, compute_test_signature(WEBHOOK_SECRET, ts, payload))
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[test]
    fn config_new_sets_defaults() {
        let config = StripeConfig::new("sk_test", "whsec_test");
        assert_eq!(config.api_base_url, "https://api.stripe.com");
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn sessions_url_tolerates_trailing_slash() {
        let gateway = StripeGateway::new(
            StripeConfig::new("sk_test", "whsec_test").with_base_url("http://localhost:12111/"),
        )
        .unwrap();
        assert_eq!(gateway.sessions_url(), "http://localhost:12111/v1/checkout/sessions");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Webhook Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn verify_webhook_parses_completed_session() {
        let payload = StripeEventBuilder::new()
            .id("evt_1")
            .object(json!({
                "id": "cs_1",
                "payment_intent": "pi_1",
                "metadata": { "orderId": "order-1" }
            }))
            .to_payload();

        let event = gateway()
            .verify_webhook(payload.as_bytes(), &signed(&payload))
            .await
            .unwrap();

        assert_eq!(event.id, "evt_1");
        assert_eq!(
            event.event,
            PaymentEvent::SessionCompleted {
                order_id: Some("order-1".to_string()),
                payment_intent: Some("pi_1".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn verify_webhook_rejects_bad_signature() {
        let payload = StripeEventBuilder::new().to_payload();
        let header = format!("t={},v1={}", chrono::Utc::now().timestamp(), "ab".repeat(32));

        let err = gateway()
            .verify_webhook(payload.as_bytes(), &header)
            .await
            .unwrap_err();

        assert_eq!(err.code, PaymentErrorCode::InvalidWebhook);
    }

    #[tokio::test]
    async fn verify_webhook_reports_malformed_body() {
        let payload = StripeEventBuilder::new()
            .object(json!({ "metadata": 7 }))
            .to_payload();

        let err = gateway()
            .verify_webhook(payload.as_bytes(), &signed(&payload))
            .await
            .unwrap_err();

        assert_eq!(err.code, PaymentErrorCode::MalformedEvent);
    }

    #[tokio::test]
    async fn unreachable_api_is_a_network_error() {
        let gateway = StripeGateway::new(
            StripeConfig::new("sk_test", WEBHOOK_SECRET)
                .with_base_url("http://127.0.0.1:9")
                .with_timeout(Duration::from_millis(500)),
        )
        .unwrap();

        let err = gateway
            .create_checkout_session(CheckoutSessionRequest {
                order_id: crate::domain::foundation::OrderId::new(),
                customer_email: "buyer@example.com".to_string(),
                line_items: vec![],
                success_url: "https://shop.example.com/ok".to_string(),
                cancel_url: "https://shop.example.com/cancel".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, PaymentErrorCode::NetworkError);
        assert!(err.retryable);
    }
}
