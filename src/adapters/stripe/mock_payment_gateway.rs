//! Mock payment gateway for testing.
//!
//! Provides a configurable `PaymentGateway` for unit and integration tests:
//! - Pre-configured checkout sessions
//! - Error injection
//! - Call tracking
//! - Webhook acceptance, rejection, or real signature checking

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::payment::{StripeEvent, StripeWebhookVerifier, WebhookEvent};
use crate::ports::{CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentGateway};

/// Mock payment gateway for testing.
///
/// # Example
///
/// ```ignore
/// let mock = MockPaymentGateway::new();
/// mock.set_session(CheckoutSession { id: "cs_1".into(), url: "https://pay/cs_1".into() });
/// mock.set_error(PaymentError::network("down"));
/// ```
#[derive(Default, Clone)]
pub struct MockPaymentGateway {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    /// Next checkout session to return.
    next_session: Option<CheckoutSession>,

    /// Error to return on next `create_checkout_session` call.
    next_error: Option<PaymentError>,

    /// Every checkout request received, in order.
    checkout_requests: Vec<CheckoutSessionRequest>,

    call_log: Vec<MethodCall>,

    webhook_mode: WebhookMode,
}

/// Recorded method call for assertions.
#[derive(Debug, Clone)]
pub struct MethodCall {
    pub method: String,
    pub args: Vec<String>,
}

/// How to handle webhook verification.
#[derive(Default)]
enum WebhookMode {
    /// Any signature is accepted; the payload is decoded as a Stripe event.
    #[default]
    AcceptAll,

    /// Signatures are checked against a real signing secret.
    Verify(StripeWebhookVerifier),

    /// Every webhook fails verification.
    AlwaysFail,
}

impl MockPaymentGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock that fails all webhook verifications.
    pub fn rejecting_webhooks() -> Self {
        let mock = Self::new();
        mock.state().webhook_mode = WebhookMode::AlwaysFail;
        mock
    }

    /// Create a mock that verifies webhook signatures with `secret`.
    pub fn with_webhook_secret(secret: impl Into<String>) -> Self {
        let mock = Self::new();
        mock.state().webhook_mode = WebhookMode::Verify(StripeWebhookVerifier::new(secret));
        mock
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Configuration Methods
    // ════════════════════════════════════════════════════════════════════════════

    /// Set the checkout session to return on the next call.
    pub fn set_session(&self, session: CheckoutSession) {
        self.state().next_session = Some(session);
    }

    /// Fail the next `create_checkout_session` call with `error`.
    pub fn set_error(&self, error: PaymentError) {
        self.state().next_error = Some(error);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Assertions
    // ════════════════════════════════════════════════════════════════════════════

    pub fn calls(&self) -> Vec<MethodCall> {
        self.state().call_log.clone()
    }

    pub fn was_called(&self, method: &str) -> bool {
        self.state().call_log.iter().any(|c| c.method == method)
    }

    pub fn checkout_requests(&self) -> Vec<CheckoutSessionRequest> {
        self.state().checkout_requests.clone()
    }

    fn log_call(state: &mut MockState, method: &str, args: Vec<String>) {
        state.call_log.push(MethodCall {
            method: method.to_string(),
            args,
        });
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn create_checkout_session(
        &self,
        request: CheckoutSessionRequest,
    ) -> Result<CheckoutSession, PaymentError> {
        let mut state = self.state();
        Self::log_call(
            &mut state,
            "create_checkout_session",
            vec![request.order_id.to_string(), request.customer_email.clone()],
        );
        state.checkout_requests.push(request.clone());

        if let Some(err) = state.next_error.take() {
            return Err(err);
        }

        Ok(state.next_session.take().unwrap_or_else(|| {
            let id = format!("cs_test_{}", request.order_id.as_uuid().simple());
            CheckoutSession {
                url: format!("https://checkout.stripe.test/pay/{}", id),
                id,
            }
        }))
    }

    async fn verify_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<WebhookEvent, PaymentError> {
        let mut state = self.state();
        Self::log_call(&mut state, "verify_webhook", vec![signature.to_string()]);

        let stripe_event: StripeEvent = match &state.webhook_mode {
            WebhookMode::AlwaysFail => {
                return Err(PaymentError::invalid_webhook("Invalid signature"));
            }
            WebhookMode::AcceptAll => serde_json::from_slice(payload)
                .map_err(|e| PaymentError::malformed_event(e.to_string()))?,
            WebhookMode::Verify(verifier) => verifier.verify_and_parse(payload, signature)?,
        };

        Ok(stripe_event.into_webhook_event()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::OrderId;
    use crate::domain::payment::{compute_test_signature, PaymentEvent, StripeEventBuilder};
    use crate::ports::PaymentErrorCode;

    fn request() -> CheckoutSessionRequest {
        CheckoutSessionRequest {
            order_id: OrderId::new(),
            customer_email: "buyer@example.com".to_string(),
            line_items: vec![],
            success_url: "https://shop.example.com/ok".to_string(),
            cancel_url: "https://shop.example.com/cancel".to_string(),
        }
    }

    #[tokio::test]
    async fn returns_generated_session_by_default() {
        let mock = MockPaymentGateway::new();
        let req = request();

        let session = mock.create_checkout_session(req.clone()).await.unwrap();

        assert!(session.id.starts_with("cs_test_"));
        assert!(session.url.ends_with(&session.id));
        assert_eq!(mock.checkout_requests(), vec![req]);
    }

    #[tokio::test]
    async fn configured_session_and_error_are_used_once() {
        let mock = MockPaymentGateway::new();
        mock.set_error(PaymentError::network("down"));

        let err = mock.create_checkout_session(request()).await.unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::NetworkError);

        mock.set_session(CheckoutSession {
            id: "cs_fixed".to_string(),
            url: "https://pay/cs_fixed".to_string(),
        });
        let session = mock.create_checkout_session(request()).await.unwrap();
        assert_eq!(session.id, "cs_fixed");
        assert_eq!(mock.calls().len(), 2);
    }

    #[tokio::test]
    async fn accept_all_decodes_payload() {
        let mock = MockPaymentGateway::new();
        let payload = StripeEventBuilder::new()
            .event_type("charge.refunded")
            .object(serde_json::json!({ "payment_intent": "pi_9" }))
            .to_payload();

        let event = mock.verify_webhook(payload.as_bytes(), "anything").await.unwrap();

        assert_eq!(
            event.event,
            PaymentEvent::ChargeRefunded {
                payment_intent: Some("pi_9".to_string())
            }
        );
        assert!(mock.was_called("verify_webhook"));
    }

    #[tokio::test]
    async fn rejecting_mock_fails_verification() {
        let mock = MockPaymentGateway::rejecting_webhooks();
        let err = mock.verify_webhook(b"{}", "t=1,v1=00").await.unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::InvalidWebhook);
    }

    #[tokio::test]
    async fn secret_mode_checks_signatures() {
        let mock = MockPaymentGateway::with_webhook_secret("whsec_mock");
        let payload = StripeEventBuilder::new().event_type("invoice.paid").to_payload();
        let ts = chrono::Utc::now().timestamp();
        let good = format!("t={},v1={}", ts, compute_test_signature("whsec_mock", ts, &payload));
        let bad = format!("t={},v1={}", ts, compute_test_signature("whsec_other", ts, &payload));

        let event = mock.verify_webhook(payload.as_bytes(), &good).await.unwrap();
        assert_eq!(event.event.kind(), "invoice.paid");

        let err = mock.verify_webhook(payload.as_bytes(), &bad).await.unwrap_err();
        assert_eq!(err.code, PaymentErrorCode::InvalidWebhook);
    }
}
