//! Order status state machine.
//!
//! ```text
//! PENDING ──► PAID ──► REFUNDED
//!    │
//!    └──────► CANCELLED
//! ```
//!
//! Transitions only ever move forward. Reconciliation treats an event
//! whose transition is already behind the order as a no-op.

use crate::domain::foundation::StateMachine;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created at checkout, awaiting payment confirmation.
    #[default]
    Pending,

    /// Payment confirmed; stock has been taken.
    Paid,

    /// Checkout session expired before payment. Terminal.
    Cancelled,

    /// Charge refunded; stock has been returned. Terminal.
    Refunded,
}

impl OrderStatus {
    /// Storage representation (lower case).
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

impl StateMachine for OrderStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        use OrderStatus::*;
        matches!(
            (self, target),
            (Pending, Paid) | (Pending, Cancelled) | (Paid, Refunded)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use OrderStatus::*;
        match self {
            Pending => vec![Paid, Cancelled],
            Paid => vec![Refunded],
            Cancelled | Refunded => vec![],
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Paid => "PAID",
            OrderStatus::Cancelled => "CANCELLED",
            OrderStatus::Refunded => "REFUNDED",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    /// Accepts both the storage and the wire spelling.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "paid" => Ok(OrderStatus::Paid),
            "cancelled" => Ok(OrderStatus::Cancelled),
            "refunded" => Ok(OrderStatus::Refunded),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}
