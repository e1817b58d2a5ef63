//! Checkout and payment reconciliation handlers.

mod create_checkout_session;
mod reconcile_payment_webhook;

pub use create_checkout_session::{
    CheckoutRedirects, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    CreateCheckoutSessionResult,
};
pub use reconcile_payment_webhook::{
    ReconcilePaymentWebhookCommand, ReconcilePaymentWebhookHandler,
    ReconcilePaymentWebhookResult, WebhookOutcome,
};
