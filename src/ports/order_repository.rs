//! Order repository port.
//!
//! Besides plain persistence, this port owns the three reconciliation
//! operations. Each one is a single atomic unit: the order status change
//! and every stock adjustment it implies commit together or not at all.
//! Each is also guarded on the current status, so replaying the same
//! provider event is a no-op.

use crate::domain::foundation::{DomainError, OrderId};
use crate::domain::order::{Order, OrderStatus, OrderView};
use async_trait::async_trait;

/// Result of a status-guarded transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Status changed and stock was adjusted.
    Applied,

    /// Order was not in the required state; nothing changed.
    Skipped { current: OrderStatus },

    /// No order with that ID.
    NotFound,
}

/// Result of refunding every order paid through one payment intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefundOutcome {
    /// Orders moved PAID → REFUNDED by this call.
    pub refunded: Vec<OrderId>,

    /// Orders with this intent that were already REFUNDED before the call.
    pub already_refunded: Vec<OrderId>,
}

impl RefundOutcome {
    /// True when no order carries the intent in a refundable or refunded state.
    pub fn is_unmatched(&self) -> bool {
        self.refunded.is_empty() && self.already_refunded.is_empty()
    }
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Persist a new order together with its items, atomically.
    async fn create(&self, order: &Order) -> Result<(), DomainError>;

    /// Record the hosted checkout session on an order.
    ///
    /// # Errors
    ///
    /// - `OrderNotFound` if the order doesn't exist
    async fn attach_session(&self, id: &OrderId, session_id: &str) -> Result<(), DomainError>;

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError>;

    /// Order with each item joined to its product.
    async fn find_view(&self, id: &OrderId) -> Result<Option<OrderView>, DomainError>;

    /// PENDING → PAID, store the payment intent, decrement stock per line.
    ///
    /// Skipped unless the order is PENDING, which makes redelivery safe.
    async fn complete_payment(
        &self,
        id: &OrderId,
        payment_intent: Option<&str>,
    ) -> Result<TransitionOutcome, DomainError>;

    /// PENDING → CANCELLED. Stock is untouched.
    async fn expire_session(&self, id: &OrderId) -> Result<TransitionOutcome, DomainError>;

    /// For every PAID order carrying `payment_intent`: → REFUNDED and
    /// increment stock per line. Orders in any other state are skipped.
    ///
    /// Reports the orders refunded by this call separately from those a
    /// previous delivery already refunded.
    async fn refund_by_payment_intent(
        &self,
        payment_intent: &str,
    ) -> Result<RefundOutcome, DomainError>;
}
