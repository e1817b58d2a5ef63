//! In-memory catalog repository.

use async_trait::async_trait;

use super::InMemoryStore;
use crate::domain::catalog::{Product, ProductPatch};
use crate::domain::foundation::{DomainError, ErrorCode, ProductId};
use crate::ports::CatalogRepository;

pub struct InMemoryCatalogRepository {
    store: InMemoryStore,
}

impl InMemoryCatalogRepository {
    pub fn new(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalogRepository {
    async fn list_active(&self) -> Result<Vec<Product>, DomainError> {
        let state = self.store.state.read().await;
        let mut products: Vec<Product> = state
            .products
            .values()
            .filter(|p| p.active)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        Ok(self.store.state.read().await.products.get(id).cloned())
    }

    async fn find_many_by_ids(
        &self,
        ids: &[ProductId],
        active_only: bool,
    ) -> Result<Vec<Product>, DomainError> {
        let state = self.store.state.read().await;
        let mut seen = std::collections::HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| state.products.get(id))
            .filter(|p| !active_only || p.active)
            .cloned()
            .collect())
    }

    async fn save(&self, product: &Product) -> Result<(), DomainError> {
        self.store.check_writable()?;
        self.store
            .state
            .write()
            .await
            .products
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn update(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, DomainError> {
        self.store.check_writable()?;
        let mut state = self.store.state.write().await;
        let Some(product) = state.products.get_mut(id) else {
            return Ok(None);
        };
        let mut updated = product.clone();
        updated
            .apply(patch.clone())
            .map_err(|e| DomainError::new(ErrorCode::ValidationFailed, e.to_string()))?;
        *product = updated.clone();
        Ok(Some(updated))
    }
}
