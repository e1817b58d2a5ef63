//! Stripe webhook event envelope.
//!
//! Only fields relevant to reconciliation are captured. The data object
//! is kept as raw JSON and narrowed per event type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::event::{PaymentEvent, WebhookEvent};
use super::webhook_errors::WebhookError;

/// Metadata key carrying our order id on checkout sessions.
pub const ORDER_ID_METADATA_KEY: &str = "orderId";

/// Stripe webhook event (simplified).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEvent {
    /// Unique identifier for the event (evt_xxx format).
    pub id: String,

    /// Type of event (e.g., "checkout.session.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Time at which the event was created (Unix timestamp).
    pub created: i64,

    pub data: StripeEventData,

    #[serde(default)]
    pub livemode: bool,

    #[serde(default)]
    pub api_version: Option<String>,
}

/// Container for event-specific data.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StripeEventData {
    /// The object that triggered the event (polymorphic based on event type).
    pub object: serde_json::Value,
}

/// Known Stripe event types that we handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeEventType {
    CheckoutSessionCompleted,
    CheckoutSessionExpired,
    ChargeRefunded,
    Unknown,
}

impl StripeEventType {
    /// Parse event type from string.
    pub fn parse(s: &str) -> Self {
        match s {
            "checkout.session.completed" => Self::CheckoutSessionCompleted,
            "checkout.session.expired" => Self::CheckoutSessionExpired,
            "charge.refunded" => Self::ChargeRefunded,
            _ => Self::Unknown,
        }
    }

    /// Convert to the Stripe event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CheckoutSessionCompleted => "checkout.session.completed",
            Self::CheckoutSessionExpired => "checkout.session.expired",
            Self::ChargeRefunded => "charge.refunded",
            Self::Unknown => "unknown",
        }
    }
}

/// The parts of a Checkout Session object we read.
#[derive(Debug, Deserialize)]
struct CheckoutSessionObject {
    #[serde(default)]
    metadata: HashMap<String, String>,
    #[serde(default)]
    payment_intent: Option<String>,
}

/// The parts of a Charge object we read.
#[derive(Debug, Deserialize)]
struct ChargeObject {
    #[serde(default)]
    payment_intent: Option<String>,
}

impl StripeEvent {
    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> StripeEventType {
        StripeEventType::parse(&self.event_type)
    }

    /// Attempts to deserialize the data object as the specified type.
    pub fn deserialize_object<T: serde::de::DeserializeOwned>(
        &self,
    ) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.data.object.clone())
    }

    /// Narrows the envelope to the store's closed event set.
    pub fn into_webhook_event(self) -> Result<WebhookEvent, WebhookError> {
        let parse_err = |e: serde_json::Error| WebhookError::ParseError(e.to_string());

        let event = match self.parsed_type() {
            StripeEventType::CheckoutSessionCompleted => {
                let mut session: CheckoutSessionObject =
                    self.deserialize_object().map_err(parse_err)?;
                PaymentEvent::SessionCompleted {
                    order_id: session.metadata.remove(ORDER_ID_METADATA_KEY),
                    payment_intent: session.payment_intent,
                }
            }
            StripeEventType::CheckoutSessionExpired => {
                let mut session: CheckoutSessionObject =
                    self.deserialize_object().map_err(parse_err)?;
                PaymentEvent::SessionExpired {
                    order_id: session.metadata.remove(ORDER_ID_METADATA_KEY),
                }
            }
            StripeEventType::ChargeRefunded => {
                let charge: ChargeObject = self.deserialize_object().map_err(parse_err)?;
                PaymentEvent::ChargeRefunded {
                    payment_intent: charge.payment_intent,
                }
            }
            StripeEventType::Unknown => PaymentEvent::Ignored {
                event_type: self.event_type.clone(),
            },
        };

        Ok(WebhookEvent { id: self.id, event })
    }
}

/// Builder for creating test StripeEvent instances.
#[cfg(test)]
pub struct StripeEventBuilder {
    id: String,
    event_type: String,
    created: i64,
    object: serde_json::Value,
}

#[cfg(test)]
impl Default for StripeEventBuilder {
    fn default() -> Self {
        Self {
            id: "evt_test_123".to_string(),
            event_type: "checkout.session.completed".to_string(),
            created: chrono::Utc::now().timestamp(),
            object: serde_json::json!({}),
        }
    }
}

#[cfg(test)]
impl StripeEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn event_type(mut self, event_type: impl Into<String>) -> Self {
        self.event_type = event_type.into();
        self
    }

    pub fn object(mut self, object: serde_json::Value) -> Self {
        self.object = object;
        self
    }

    pub fn build(self) -> StripeEvent {
        StripeEvent {
            id: self.id,
            event_type: self.event_type,
            created: self.created,
            data: StripeEventData {
                object: self.object,
            },
            livemode: false,
            api_version: Some("2023-10-16".to_string()),
        }
    }

    /// Serialized JSON payload, as Stripe would send it.
    pub fn to_payload(self) -> String {
        serde_json::to_string(&self.build()).unwrap()
    }
}
