//! Order aggregate.
//!
//! An order owns its line items. Each line captures the product price at
//! checkout time and is never changed afterwards, so later catalog price
//! edits do not affect what the customer was charged.

use serde::{Deserialize, Serialize};

use crate::domain::catalog::Product;
use crate::domain::foundation::{
    OrderId, OrderItemId, ProductId, StateMachine, Timestamp, ValidationError,
};

use super::{CustomerEmail, OrderStatus};

/// One requested cart line, as received from the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: i32,
}

/// A line item with its price snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub product_id: ProductId,
    pub quantity: i32,

    /// Product price at checkout, minor currency units.
    pub unit_price: i64,
}

impl OrderItem {
    /// `unit_price * quantity`, `None` on overflow.
    pub fn line_total(&self) -> Option<i64> {
        self.unit_price.checked_mul(i64::from(self.quantity))
    }
}

/// Order aggregate.
///
/// # Invariants
///
/// - `total_amount` equals the sum of line totals
/// - `items` is non-empty and every quantity is at least 1
/// - `status` only moves along the `OrderStatus` state machine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_email: CustomerEmail,
    pub status: OrderStatus,
    pub total_amount: i64,
    pub currency: String,

    /// Hosted checkout session, set once the provider returns one.
    pub stripe_session_id: Option<String>,

    /// Set when payment is confirmed; correlates later refunds.
    pub stripe_payment_intent_id: Option<String>,

    pub items: Vec<OrderItem>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Order {
    /// Builds a PENDING order from authoritative product data.
    ///
    /// Prices come from `lines` products only; the total is computed here.
    pub fn pending<'a>(
        customer_email: CustomerEmail,
        currency: impl Into<String>,
        lines: impl IntoIterator<Item = (&'a Product, i32)>,
    ) -> Result<Self, ValidationError> {
        let id = OrderId::new();
        let mut items = Vec::new();
        let mut total_amount: i64 = 0;

        for (product, quantity) in lines {
            if quantity < 1 {
                return Err(ValidationError::out_of_range(
                    "quantity",
                    1,
                    i64::from(i32::MAX),
                    i64::from(quantity),
                ));
            }
            let item = OrderItem {
                id: OrderItemId::new(),
                order_id: id,
                product_id: product.id,
                quantity,
                unit_price: product.price,
            };
            total_amount = item
                .line_total()
                .and_then(|line| total_amount.checked_add(line))
                .ok_or_else(|| {
                    ValidationError::invalid_format("totalAmount", "order total overflows")
                })?;
            items.push(item);
        }

        if items.is_empty() {
            return Err(ValidationError::empty_field("items"));
        }

        let now = Timestamp::now();
        Ok(Self {
            id,
            customer_email,
            status: OrderStatus::Pending,
            total_amount,
            currency: currency.into(),
            stripe_session_id: None,
            stripe_payment_intent_id: None,
            items,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn attach_session(&mut self, session_id: impl Into<String>) {
        self.stripe_session_id = Some(session_id.into());
        self.updated_at = Timestamp::now();
    }

    /// PENDING → PAID, recording the payment intent.
    pub fn mark_paid(&mut self, payment_intent: Option<String>) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(OrderStatus::Paid)?;
        self.stripe_payment_intent_id = payment_intent;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// PENDING → CANCELLED.
    pub fn cancel(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(OrderStatus::Cancelled)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// PAID → REFUNDED.
    pub fn refund(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(OrderStatus::Refunded)?;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}

/// Read projection: one line joined to its product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderItemView {
    pub item: OrderItem,

    /// `None` only if the product row has been removed.
    pub product: Option<Product>,
}

/// Read projection of an order with its lines and products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderView {
    pub order: Order,
    pub items: Vec<OrderItemView>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::NewProduct;
    use proptest::prelude::*;

    fn product(price: i64, stock: i32) -> Product {
        Product::create(NewProduct {
            name: "Mug".to_string(),
            price,
            stock: Some(stock),
            ..Default::default()
        })
        .unwrap()
    }

    fn email() -> CustomerEmail {
        CustomerEmail::parse("buyer@example.com").unwrap()
    }

    #[test]
    fn pending_snapshots_prices_and_computes_total() {
        let p1 = product(500, 10);
        let order = Order::pending(email(), "usd", [(&p1, 2)]).unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, 1000);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].unit_price, 500);
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].order_id, order.id);
        assert!(order.stripe_session_id.is_none());
    }

    #[test]
    fn snapshot_is_independent_of_later_price_changes() {
        let mut p1 = product(500, 10);
        let order = Order::pending(email(), "usd", [(&p1, 1)]).unwrap();

        p1.price = 900;

        assert_eq!(order.items[0].unit_price, 500);
        assert_eq!(order.total_amount, 500);
    }

    #[test]
    fn pending_rejects_zero_quantity() {
        let p1 = product(500, 10);
        let err = Order::pending(email(), "usd", [(&p1, 0)]).unwrap_err();
        assert_eq!(err.field(), "quantity");
    }

    #[test]
    fn pending_rejects_empty_cart() {
        let err = Order::pending(email(), "usd", std::iter::empty()).unwrap_err();
        assert_eq!(err, ValidationError::empty_field("items"));
    }

    #[test]
    fn pending_rejects_overflowing_total() {
        let p1 = product(i64::MAX, 10);
        assert!(Order::pending(email(), "usd", [(&p1, 2)]).is_err());
    }

    #[test]
    fn lifecycle_paid_then_refunded() {
        let p1 = product(500, 10);
        let mut order = Order::pending(email(), "usd", [(&p1, 1)]).unwrap();

        order.mark_paid(Some("pi_123".to_string())).unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert_eq!(order.stripe_payment_intent_id.as_deref(), Some("pi_123"));

        order.refund().unwrap();
        assert_eq!(order.status, OrderStatus::Refunded);
    }

    #[test]
    fn cancelled_order_cannot_be_paid() {
        let p1 = product(500, 10);
        let mut order = Order::pending(email(), "usd", [(&p1, 1)]).unwrap();

        order.cancel().unwrap();

        assert!(order.mark_paid(None).is_err());
        assert_eq!(order.status, OrderStatus::Cancelled);
    }

    #[test]
    fn pending_order_cannot_be_refunded() {
        let p1 = product(500, 10);
        let mut order = Order::pending(email(), "usd", [(&p1, 1)]).unwrap();
        assert!(order.refund().is_err());
    }

    proptest! {
        #[test]
        fn total_equals_sum_of_line_totals(
            lines in prop::collection::vec((1i64..100_000, 1i32..50), 1..6)
        ) {
            let products: Vec<Product> = lines.iter().map(|(price, _)| product(*price, 100)).collect();
            let order = Order::pending(
                email(),
                "usd",
                products.iter().zip(lines.iter()).map(|(p, (_, qty))| (p, *qty)),
            )
            .unwrap();

            let expected: i64 = lines.iter().map(|(price, qty)| price * i64::from(*qty)).sum();
            prop_assert_eq!(order.total_amount, expected);
            prop_assert_eq!(order.items.len(), lines.len());
        }
    }
}
