//! In-memory adapters for the persistence ports.
//!
//! Both repositories share one `InMemoryStore`, so reconciliation can
//! update orders and product stock under a single write lock, the same
//! all-or-nothing unit a database transaction provides.
//!
//! Used by unit and integration tests; the service binary runs on
//! PostgreSQL.

mod catalog_repository;
mod order_repository;

pub use catalog_repository::InMemoryCatalogRepository;
pub use order_repository::InMemoryOrderRepository;

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::catalog::Product;
use crate::domain::foundation::{DomainError, OrderId, ProductId};
use crate::domain::order::Order;

#[derive(Default)]
pub(crate) struct StoreState {
    pub(crate) products: HashMap<ProductId, Product>,
    pub(crate) orders: HashMap<OrderId, Order>,
}

/// Shared backing store for the in-memory repositories.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    pub(crate) state: Arc<RwLock<StoreState>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog repository backed by this store.
    pub fn catalog(&self) -> InMemoryCatalogRepository {
        InMemoryCatalogRepository::new(self.clone())
    }

    /// Order repository backed by this store.
    pub fn orders(&self) -> InMemoryOrderRepository {
        InMemoryOrderRepository::new(self.clone())
    }

    /// Make every subsequent write fail with a database error.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("simulated write failure"));
        }
        Ok(())
    }

    // === Test Helpers ===

    /// Insert or replace a product directly.
    pub async fn put_product(&self, product: Product) {
        self.state.write().await.products.insert(product.id, product);
    }

    pub async fn product(&self, id: &ProductId) -> Option<Product> {
        self.state.read().await.products.get(id).cloned()
    }

    pub async fn order(&self, id: &OrderId) -> Option<Order> {
        self.state.read().await.orders.get(id).cloned()
    }

    pub async fn order_count(&self) -> usize {
        self.state.read().await.orders.len()
    }
}
