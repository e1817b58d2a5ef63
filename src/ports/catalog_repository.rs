//! Catalog repository port.

use crate::domain::catalog::{Product, ProductPatch};
use crate::domain::foundation::{DomainError, ProductId};
use async_trait::async_trait;

/// Repository port for catalog products.
///
/// Stock adjustments are not part of this port: they only happen inside
/// the order reconciliation transactions of `OrderRepository`.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Active products, newest first.
    async fn list_active(&self) -> Result<Vec<Product>, DomainError>;

    /// Find a product by ID regardless of its active flag.
    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError>;

    /// Fetch several products at once. Unknown IDs are simply absent from
    /// the result; with `active_only` inactive products are absent too.
    async fn find_many_by_ids(
        &self,
        ids: &[ProductId],
        active_only: bool,
    ) -> Result<Vec<Product>, DomainError>;

    /// Save a new product.
    async fn save(&self, product: &Product) -> Result<(), DomainError>;

    /// Apply an already-normalized patch, touching only supplied columns.
    ///
    /// Returns the updated product, or `None` if the ID is unknown.
    async fn update(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn CatalogRepository) {}
    }
}
