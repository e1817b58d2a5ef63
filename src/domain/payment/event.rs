//! Payment events the store reacts to.

use serde::{Deserialize, Serialize};

/// A verified provider notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Provider event id (evt_xxx), used for logging.
    pub id: String,
    pub event: PaymentEvent,
}

/// Closed set of payment events, one variant per recognized type.
///
/// Correlation fields stay optional: a notification without them is
/// acknowledged and logged rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PaymentEvent {
    /// Hosted checkout finished and the payment succeeded.
    SessionCompleted {
        order_id: Option<String>,
        payment_intent: Option<String>,
    },

    /// Hosted checkout timed out without payment.
    SessionExpired { order_id: Option<String> },

    /// A charge was refunded.
    ChargeRefunded { payment_intent: Option<String> },

    /// Any other provider event type.
    Ignored { event_type: String },
}

impl PaymentEvent {
    /// Short name used in logs.
    pub fn kind(&self) -> &str {
        match self {
            PaymentEvent::SessionCompleted { .. } => "session_completed",
            PaymentEvent::SessionExpired { .. } => "session_expired",
            PaymentEvent::ChargeRefunded { .. } => "charge_refunded",
            PaymentEvent::Ignored { event_type } => event_type,
        }
    }
}
