//! ReconcilePaymentWebhookHandler - Command handler for payment provider webhooks.
//!
//! Authenticates the delivery, then applies the matching order transition.
//! Every transition is a single atomic repository call guarded on the
//! current status, so a re-delivered event changes nothing.
//!
//! | Event | Transition | Stock |
//! |-------|------------|-------|
//! | session completed | PENDING → PAID | decremented per line |
//! | session expired | PENDING → CANCELLED | unchanged |
//! | charge refunded | PAID → REFUNDED | restored per line |

use std::sync::Arc;

use crate::domain::errors::StoreError;
use crate::domain::foundation::OrderId;
use crate::domain::payment::PaymentEvent;
use crate::ports::{OrderRepository, PaymentGateway, TransitionOutcome};

/// Command to reconcile one webhook delivery.
#[derive(Debug, Clone)]
pub struct ReconcilePaymentWebhookCommand {
    /// Raw request body, exactly as received.
    pub payload: Vec<u8>,
    /// `Stripe-Signature` header value.
    pub signature: String,
}

/// What the delivery did to our data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// An order changed state.
    Applied,
    /// The order was already past this transition, or a refund for this
    /// payment intent was already applied.
    Duplicate,
    /// Nothing to do: unknown event type, missing or unknown order.
    Ignored,
}

/// Result of webhook processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilePaymentWebhookResult {
    pub event_id: String,
    pub outcome: WebhookOutcome,
}

/// Handler for reconciling orders from payment webhooks.
///
/// Only signature failures (`Authentication`) and datastore failures
/// (`Processing`) are errors. Anything else is acknowledged so the
/// provider stops retrying.
pub struct ReconcilePaymentWebhookHandler {
    orders: Arc<dyn OrderRepository>,
    gateway: Arc<dyn PaymentGateway>,
}

impl ReconcilePaymentWebhookHandler {
    pub fn new(orders: Arc<dyn OrderRepository>, gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { orders, gateway }
    }

    pub async fn handle(
        &self,
        cmd: ReconcilePaymentWebhookCommand,
    ) -> Result<ReconcilePaymentWebhookResult, StoreError> {
        // 1. Verify signature and parse; nothing is touched on failure
        let webhook = self
            .gateway
            .verify_webhook(&cmd.payload, &cmd.signature)
            .await?;

        let kind = webhook.event.kind().to_string();
        tracing::info!(event_id = %webhook.id, event_type = %kind, "Processing payment webhook");

        // 2. Dispatch on the event
        let outcome = match webhook.event {
            PaymentEvent::SessionCompleted {
                order_id,
                payment_intent,
            } => match order_ref(order_id.as_deref(), &kind) {
                Some(id) => {
                    let outcome = self
                        .orders
                        .complete_payment(&id, payment_intent.as_deref())
                        .await?;
                    log_transition(&id, &kind, outcome)
                }
                None => WebhookOutcome::Ignored,
            },
            PaymentEvent::SessionExpired { order_id } => {
                match order_ref(order_id.as_deref(), &kind) {
                    Some(id) => {
                        let outcome = self.orders.expire_session(&id).await?;
                        log_transition(&id, &kind, outcome)
                    }
                    None => WebhookOutcome::Ignored,
                }
            }
            PaymentEvent::ChargeRefunded { payment_intent } => match payment_intent {
                Some(intent) => {
                    let outcome = self.orders.refund_by_payment_intent(&intent).await?;
                    for id in &outcome.refunded {
                        tracing::info!(order_id = %id, payment_intent = %intent, "Order refunded");
                    }
                    if !outcome.refunded.is_empty() {
                        WebhookOutcome::Applied
                    } else if outcome.is_unmatched() {
                        tracing::info!(
                            payment_intent = %intent,
                            "No paid order for refunded payment intent"
                        );
                        WebhookOutcome::Ignored
                    } else {
                        tracing::info!(
                            payment_intent = %intent,
                            orders = outcome.already_refunded.len(),
                            "Refund already applied"
                        );
                        WebhookOutcome::Duplicate
                    }
                }
                None => {
                    tracing::warn!(event_type = %kind, "Refund event without payment intent");
                    WebhookOutcome::Ignored
                }
            },
            PaymentEvent::Ignored { event_type } => {
                tracing::debug!(event_type = %event_type, "Unhandled webhook event type");
                WebhookOutcome::Ignored
            }
        };

        Ok(ReconcilePaymentWebhookResult {
            event_id: webhook.id,
            outcome,
        })
    }
}

/// Parses the order reference carried in session metadata.
fn order_ref(raw: Option<&str>, kind: &str) -> Option<OrderId> {
    let Some(raw) = raw else {
        tracing::warn!(event_type = %kind, "Webhook session has no orderId metadata");
        return None;
    };
    match raw.parse::<OrderId>() {
        Ok(id) => Some(id),
        Err(_) => {
            tracing::warn!(event_type = %kind, order_ref = %raw, "Webhook orderId is not a valid id");
            None
        }
    }
}

fn log_transition(id: &OrderId, kind: &str, outcome: TransitionOutcome) -> WebhookOutcome {
    match outcome {
        TransitionOutcome::Applied => {
            tracing::info!(order_id = %id, event_type = %kind, "Order transition applied");
            WebhookOutcome::Applied
        }
        TransitionOutcome::Skipped { current } => {
            tracing::info!(
                order_id = %id,
                event_type = %kind,
                status = %current,
                "Order already past transition, skipping"
            );
            WebhookOutcome::Duplicate
        }
        TransitionOutcome::NotFound => {
            tracing::warn!(order_id = %id, event_type = %kind, "Webhook references unknown order");
            WebhookOutcome::Ignored
        }
    }
}
