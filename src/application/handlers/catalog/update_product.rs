//! UpdateProductHandler - Command handler for partial product updates.

use std::sync::Arc;

use crate::domain::catalog::{Product, ProductPatch};
use crate::domain::errors::StoreError;
use crate::domain::foundation::ProductId;
use crate::ports::CatalogRepository;

/// Command to patch a product. Absent fields are left unchanged; an
/// empty patch returns the product without writing.
#[derive(Debug, Clone)]
pub struct UpdateProductCommand {
    pub product_id: ProductId,
    pub patch: ProductPatch,
}

/// Handler for updating products, including inactive ones.
pub struct UpdateProductHandler {
    repository: Arc<dyn CatalogRepository>,
}

impl UpdateProductHandler {
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, cmd: UpdateProductCommand) -> Result<Product, StoreError> {
        let patch = cmd.patch.normalized()?;

        if patch.is_empty() {
            return self
                .repository
                .find_by_id(&cmd.product_id)
                .await?
                .ok_or_else(StoreError::product_not_found);
        }

        let product = self
            .repository
            .update(&cmd.product_id, &patch)
            .await?
            .ok_or_else(StoreError::product_not_found)?;

        tracing::info!(product_id = %product.id, "Product updated");
        Ok(product)
    }
}
