//! Stripe payment gateway adapter.
//!
//! Implements the `PaymentGateway` port for Stripe Checkout:
//! - Hosted checkout session creation
//! - Webhook signature verification
//!
//! # Security
//!
//! - Webhook signatures use HMAC-SHA256 with constant-time comparison
//! - Timestamps are validated to prevent replay attacks (5-minute window)
//! - All secrets are handled via `secrecy::SecretString`

mod api_types;
mod mock_payment_gateway;
mod stripe_adapter;

pub use api_types::{StripeApiError, StripeCheckoutSession, StripeErrorResponse};
pub use mock_payment_gateway::{MethodCall, MockPaymentGateway};
pub use stripe_adapter::{StripeConfig, StripeGateway};
