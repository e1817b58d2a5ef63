//! CreateProductHandler - Command handler for adding catalog products.

use std::sync::Arc;

use crate::domain::catalog::{NewProduct, Product};
use crate::domain::errors::StoreError;
use crate::ports::CatalogRepository;

/// Command to create a product. Currency defaults to `usd`, stock to 0.
#[derive(Debug, Clone)]
pub struct CreateProductCommand {
    pub product: NewProduct,
}

pub struct CreateProductHandler {
    repository: Arc<dyn CatalogRepository>,
}

impl CreateProductHandler {
    pub fn new(repository: Arc<dyn CatalogRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, cmd: CreateProductCommand) -> Result<Product, StoreError> {
        let product = Product::create(cmd.product)?;
        self.repository.save(&product).await?;

        tracing::info!(product_id = %product.id, name = %product.name, "Product created");
        Ok(product)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryStore;

    #[tokio::test]
    async fn creates_product_with_defaults() {
        let store = InMemoryStore::new();
        let handler = CreateProductHandler::new(Arc::new(store.catalog()));

        let product = handler
            .handle(CreateProductCommand {
                product: NewProduct {
                    name: "  Notebook ".to_string(),
                    price: 350,
                    ..Default::default()
                },
            })
            .await
            .unwrap();

        assert_eq!(product.name, "Notebook");
        assert_eq!(product.currency, "usd");
        assert_eq!(product.stock, 0);
        assert!(product.active);
        assert_eq!(store.product(&product.id).await, Some(product));
    }

    #[tokio::test]
    async fn rejects_invalid_price() {
        let store = InMemoryStore::new();
        let handler = CreateProductHandler::new(Arc::new(store.catalog()));

        let err = handler
            .handle(CreateProductCommand {
                product: NewProduct {
                    name: "Notebook".to_string(),
                    price: 0,
                    ..Default::default()
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn storage_failure_is_processing_error() {
        let store = InMemoryStore::new();
        store.fail_writes(true);
        let handler = CreateProductHandler::new(Arc::new(store.catalog()));

        let err = handler
            .handle(CreateProductCommand {
                product: NewProduct {
                    name: "Notebook".to_string(),
                    price: 350,
                    ..Default::default()
                },
            })
            .await
            .unwrap_err();

        assert!(matches!(err, StoreError::Processing(_)));
    }
}
