//! Payment configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Payment configuration (Stripe Checkout)
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Stripe secret API key (sk_test_... or sk_live_...)
    pub stripe_secret_key: SecretString,

    /// Stripe webhook signing secret (whsec_...)
    pub stripe_webhook_secret: SecretString,

    #[serde(default = "default_api_base_url")]
    pub stripe_api_base_url: String,

    /// Timeout for calls to the Stripe API in seconds
    #[serde(default = "default_stripe_timeout")]
    pub stripe_timeout_secs: u64,

    /// Storefront origin used for checkout success/cancel redirects
    pub frontend_url: String,
}

impl PaymentConfig {
    /// Check if using Stripe test mode
    pub fn is_test_mode(&self) -> bool {
        self.stripe_secret_key.expose_secret().starts_with("sk_test_")
    }

    /// Check if using Stripe live mode
    pub fn is_live_mode(&self) -> bool {
        self.stripe_secret_key.expose_secret().starts_with("sk_live_")
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.stripe_timeout_secs)
    }

    /// Where the provider sends the shopper after paying.
    pub fn success_url(&self) -> String {
        format!(
            "{}/checkout/success?session_id={{CHECKOUT_SESSION_ID}}",
            self.frontend_base()
        )
    }

    /// Where the provider sends the shopper after abandoning checkout.
    pub fn cancel_url(&self) -> String {
        format!("{}/checkout/cancel", self.frontend_base())
    }

    fn frontend_base(&self) -> &str {
        self.frontend_url.trim_end_matches('/')
    }

    /// Validate payment configuration
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        let key = self.stripe_secret_key.expose_secret();
        let secret = self.stripe_webhook_secret.expose_secret();

        if key.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_SECRET_KEY"));
        }
        if secret.is_empty() {
            return Err(ValidationError::MissingRequired("STRIPE_WEBHOOK_SECRET"));
        }
        if self.frontend_url.is_empty() {
            return Err(ValidationError::MissingRequired("FRONTEND_URL"));
        }

        // Verify key prefixes for safety
        if !key.starts_with("sk_") {
            return Err(ValidationError::InvalidStripeKey);
        }
        if !secret.starts_with("whsec_") {
            return Err(ValidationError::InvalidStripeWebhookSecret);
        }

        if !is_http_url(&self.stripe_api_base_url) {
            return Err(ValidationError::InvalidUrl("STRIPE_API_BASE_URL"));
        }
        if !is_http_url(&self.frontend_url) {
            return Err(ValidationError::InvalidUrl("FRONTEND_URL"));
        }
        if environment == Environment::Production && !self.frontend_url.starts_with("https://") {
            return Err(ValidationError::FrontendMustBeHttps);
        }

        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            stripe_secret_key: SecretString::new(String::new()),
            stripe_webhook_secret: SecretString::new(String::new()),
            stripe_api_base_url: default_api_base_url(),
            stripe_timeout_secs: default_stripe_timeout(),
            frontend_url: String::new(),
        }
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

fn default_api_base_url() -> String {
    "https://api.stripe.com".to_string()
}

fn default_stripe_timeout() -> u64 {
    30
}
