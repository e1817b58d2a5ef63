//! ListProductsHandler - Query handler for the public catalog.

use std::sync::Arc;

use crate::domain::catalog::Product;
use crate::domain::errors::StoreError;
use crate::ports::CatalogRepository;

/// Handler for listing active products, newest first.
pub struct ListProductsHandler {
    repository: Arc<dyn CatalogRepository>,
}

impl ListProductsHandler {
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.repository.list_active().await?)
    }
}
