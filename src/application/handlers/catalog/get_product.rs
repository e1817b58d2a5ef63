//! GetProductHandler - Query handler for a single catalog product.

use std::sync::Arc;

use crate::domain::catalog::Product;
use crate::domain::errors::StoreError;
use crate::domain::foundation::ProductId;
use crate::ports::CatalogRepository;

/// Query for one product.
#[derive(Debug, Clone, Copy)]
pub struct GetProductQuery {
    pub product_id: ProductId,
}

/// Handler for fetching an active product.
///
/// Inactive products are reported as not found.
pub struct GetProductHandler {
    repository: Arc<dyn CatalogRepository>,
}

impl GetProductHandler {
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetProductQuery) -> Result<Product, StoreError> {
        self.repository
            .find_by_id(&query.product_id)
            .await?
            .filter(|p| p.active)
            .ok_or_else(StoreError::product_not_found)
    }
}
