//! In-memory order repository.

use async_trait::async_trait;

use super::{InMemoryStore, StoreState};
use crate::domain::foundation::{DomainError, ErrorCode, OrderId, Timestamp};
use crate::domain::order::{Order, OrderItemView, OrderStatus, OrderView};
use crate::ports::{OrderRepository, RefundOutcome, TransitionOutcome};

pub struct InMemoryOrderRepository {
    store: InMemoryStore,
}

impl InMemoryOrderRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

/// Moves stock for every line of `order`: `sign` is -1 to take, 1 to return.
fn adjust_stock(state: &mut StoreState, order: &Order, sign: i32) {
    let now = Timestamp::now();
    for item in &order.items {
        if let Some(product) = state.products.get_mut(&item.product_id) {
            product.stock += sign * item.quantity;
            product.updated_at = now;
        }
    }
}

fn invalid_transition(e: impl ToString) -> DomainError {
    DomainError::new(ErrorCode::InvalidStateTransition, e.to_string())
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), DomainError> {
        self.store.check_writable()?;
        self.store
            .state
            .write()
            .await
            .orders
            .insert(order.id, order.clone());
        Ok(())
    }

    async fn attach_session(&self, id: &OrderId, session_id: &str) -> Result<(), DomainError> {
        self.store.check_writable()?;
        let mut state = self.store.state.write().await;
        let order = state.orders.get_mut(id).ok_or_else(|| {
            DomainError::new(ErrorCode::OrderNotFound, format!("Order not found: {}", id))
        })?;
        order.attach_session(session_id);
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.store.state.read().await.orders.get(id).cloned())
    }

    async fn find_view(&self, id: &OrderId) -> Result<Option<OrderView>, DomainError> {
        let state = self.store.state.read().await;
        Ok(state.orders.get(id).map(|order| OrderView {
            items: order
                .items
                .iter()
                .map(|item| OrderItemView {
                    item: item.clone(),
                    product: state.products.get(&item.product_id).cloned(),
                })
                .collect(),
            order: order.clone(),
        }))
    }

    async fn complete_payment(
        &self,
        id: &OrderId,
        payment_intent: Option<&str>,
    ) -> Result<TransitionOutcome, DomainError> {
        self.store.check_writable()?;
        let mut state = self.store.state.write().await;

        let Some(order) = state.orders.get(id) else {
            return Ok(TransitionOutcome::NotFound);
        };
        if order.status != OrderStatus::Pending {
            return Ok(TransitionOutcome::Skipped {
                current: order.status,
            });
        }

        let mut paid = order.clone();
        paid.mark_paid(payment_intent.map(str::to_string))
            .map_err(invalid_transition)?;
        adjust_stock(&mut state, &paid, -1);
        state.orders.insert(paid.id, paid);
        Ok(TransitionOutcome::Applied)
    }

    async fn expire_session(&self, id: &OrderId) -> Result<TransitionOutcome, DomainError> {
        self.store.check_writable()?;
        let mut state = self.store.state.write().await;

        let Some(order) = state.orders.get_mut(id) else {
            return Ok(TransitionOutcome::NotFound);
        };
        if order.status != OrderStatus::Pending {
            return Ok(TransitionOutcome::Skipped {
                current: order.status,
            });
        }
        order.cancel().map_err(invalid_transition)?;
        Ok(TransitionOutcome::Applied)
    }

    async fn refund_by_payment_intent(
        &self,
        payment_intent: &str,
    ) -> Result<RefundOutcome, DomainError> {
        self.store.check_writable()?;
        let mut state = self.store.state.write().await;

        let mut refunded = Vec::new();
        let mut already_refunded = Vec::new();
        for order in state.orders.values() {
            if order.stripe_payment_intent_id.as_deref() != Some(payment_intent) {
                continue;
            }
            match order.status {
                OrderStatus::Paid => {
                    let mut order = order.clone();
                    order.refund().map_err(invalid_transition)?;
                    refunded.push(order);
                }
                OrderStatus::Refunded => already_refunded.push(order.id),
                _ => {}
            }
        }

        let ids = refunded.iter().map(|o| o.id).collect();
        for order in refunded {
            adjust_stock(&mut state, &order, 1);
            state.orders.insert(order.id, order);
        }
        Ok(RefundOutcome {
            refunded: ids,
            already_refunded,
        })
    }
}
