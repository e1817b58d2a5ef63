//! Stripe REST API request/response shapes used by the gateway.

use serde::Deserialize;

use crate::ports::{CheckoutSessionRequest, PaymentError, PaymentErrorCode};

/// Checkout Session as returned by `POST /v1/checkout/sessions`.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeCheckoutSession {
    pub id: String,

    /// Hosted page URL. Absent for embedded sessions.
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub payment_status: Option<String>,

    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// Error envelope returned by the Stripe API on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct StripeErrorResponse {
    pub error: StripeApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeApiError {
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,

    #[serde(default)]
    pub code: Option<String>,

    #[serde(default)]
    pub message: Option<String>,
}

/// Maps a failed Stripe response to a `PaymentError`.
pub fn error_from_response(status: u16, body: &str) -> PaymentError {
    let parsed = serde_json::from_str::<StripeErrorResponse>(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|r| r.error.message.clone())
        .unwrap_or_else(|| format!("Stripe API returned status {}", status));

    let code = match status {
        401 | 403 => PaymentErrorCode::AuthenticationError,
        429 => PaymentErrorCode::RateLimitExceeded,
        400..=499 => PaymentErrorCode::InvalidRequest,
        _ => PaymentErrorCode::ProviderError,
    };

    let err = PaymentError::new(code, message);
    match parsed.and_then(|r| r.error.code.or(r.error.error_type)) {
        Some(provider_code) => err.with_provider_code(provider_code),
        None => err,
    }
}

/// Form-encodes a checkout session request the way the Stripe API expects.
pub fn checkout_form_params(request: &CheckoutSessionRequest) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = vec![
        ("mode".into(), "payment".into()),
        ("payment_method_types[0]".into(), "card".into()),
        ("customer_email".into(), request.customer_email.clone()),
        ("success_url".into(), request.success_url.clone()),
        ("cancel_url".into(), request.cancel_url.clone()),
        ("metadata[orderId]".into(), request.order_id.to_string()),
    ];

    for (i, item) in request.line_items.iter().enumerate() {
        let prefix = format!("line_items[{}]", i);
        params.push((format!("{}[quantity]", prefix), item.quantity.to_string()));
        params.push((format!("{}[price_data][currency]", prefix), item.currency.clone()));
        params.push((
            format!("{}[price_data][unit_amount]", prefix),
            item.unit_amount.to_string(),
        ));
        params.push((
            format!("{}[price_data][product_data][name]", prefix),
            item.name.clone(),
        ));
        if let Some(description) = item.description.as_deref().filter(|d| !d.is_empty()) {
            params.push((
                format!("{}[price_data][product_data][description]", prefix),
                description.to_string(),
            ));
        }
        if let Some(image) = &item.image_url {
            params.push((
                format!("{}[price_data][product_data][images][0]", prefix),
                image.clone(),
            ));
        }
    }

    params
}
