//! GetOrderHandler - Query handler for an order with its products.

use std::sync::Arc;

use crate::domain::errors::StoreError;
use crate::domain::foundation::OrderId;
use crate::domain::order::OrderView;
use crate::ports::OrderRepository;

#[derive(Debug, Clone, Copy)]
pub struct GetOrderQuery {
    pub order_id: OrderId,
}

pub struct GetOrderHandler {
    repository: Arc<dyn OrderRepository>,
}

impl GetOrderHandler {
    pub fn new(repository: Arc<dyn OrderRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetOrderQuery) -> Result<OrderView, StoreError> {
        self.repository
            .find_view(&query.order_id)
            .await?
            .ok_or_else(StoreError::order_not_found)
    }
}
