//! Payment module - inbound payment-provider notifications.
//!
//! Stripe webhooks are verified (`webhook_verifier`), parsed into the
//! provider envelope (`stripe_event`) and then narrowed to the closed set
//! of events the store reacts to (`event`).

mod event;
mod stripe_event;
mod webhook_errors;
mod webhook_verifier;

pub use event::{PaymentEvent, WebhookEvent};
pub use stripe_event::{StripeEvent, StripeEventData, StripeEventType};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{SignatureHeader, StripeWebhookVerifier};

#[cfg(test)]
pub use stripe_event::StripeEventBuilder;
#[cfg(test)]
pub use webhook_verifier::compute_test_signature;
