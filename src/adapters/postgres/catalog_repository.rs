//! PostgreSQL implementation of CatalogRepository.

use crate::domain::catalog::{Product, ProductPatch};
use crate::domain::foundation::{DomainError, ErrorCode, ProductId, Timestamp};
use crate::ports::CatalogRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const PRODUCT_COLUMNS: &str =
    "id, name, description, price, currency, stock, active, image_url, created_at, updated_at";

/// PostgreSQL implementation of the CatalogRepository port.
pub struct PostgresCatalogRepository {
    pool: PgPool,
}

impl PostgresCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a product.
#[derive(Debug, sqlx::FromRow)]
pub(super) struct ProductRow {
    pub(super) id: Uuid,
    pub(super) name: String,
    pub(super) description: Option<String>,
    pub(super) price: i64,
    pub(super) currency: String,
    pub(super) stock: i32,
    pub(super) active: bool,
    pub(super) image_url: Option<String>,
    pub(super) created_at: DateTime<Utc>,
    pub(super) updated_at: DateTime<Utc>,
}

impl TryFrom<ProductRow> for Product {
    type Error = DomainError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        if row.name.trim().is_empty() {
            return Err(corrupt_row(row.id, "empty name"));
        }
        if row.price < 1 {
            return Err(corrupt_row(row.id, "non-positive price"));
        }
        if row.currency.is_empty() {
            return Err(corrupt_row(row.id, "empty currency"));
        }

        Ok(Product {
            id: ProductId::from_uuid(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            currency: row.currency,
            stock: row.stock,
            active: row.active,
            image_url: row.image_url,
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

fn corrupt_row(id: Uuid, problem: &str) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Invalid product row {}: {}", id, problem),
    )
}

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}

#[async_trait]
impl CatalogRepository for PostgresCatalogRepository {
    async fn list_active(&self) -> Result<Vec<Product>, DomainError> {
        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE active ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("list products", e))?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn find_by_id(&self, id: &ProductId) -> Result<Option<Product>, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE id = $1",
            PRODUCT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch product", e))?;

        row.map(Product::try_from).transpose()
    }

    async fn find_many_by_ids(
        &self,
        ids: &[ProductId],
        active_only: bool,
    ) -> Result<Vec<Product>, DomainError> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<ProductRow> = sqlx::query_as(&format!(
            "SELECT {} FROM products WHERE id = ANY($1) AND (active OR NOT $2)",
            PRODUCT_COLUMNS
        ))
        .bind(&uuids)
        .bind(active_only)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch products", e))?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn save(&self, product: &Product) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, price, currency, stock, active, image_url,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(product.id.as_uuid())
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.currency)
        .bind(product.stock)
        .bind(product.active)
        .bind(&product.image_url)
        .bind(product.created_at.as_datetime())
        .bind(product.updated_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("save product", e))?;

        Ok(())
    }

    async fn update(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Option<Product>, DomainError> {
        let row: Option<ProductRow> = sqlx::query_as(&format!(
            r#"
            UPDATE products SET
                name = COALESCE($2, name),
                description = CASE WHEN $3 THEN $4 ELSE description END,
                price = COALESCE($5, price),
                currency = COALESCE($6, currency),
                stock = COALESCE($7, stock),
                image_url = CASE WHEN $8 THEN $9 ELSE image_url END,
                active = COALESCE($10, active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            PRODUCT_COLUMNS
        ))
        .bind(id.as_uuid())
        .bind(&patch.name)
        .bind(patch.description.is_some())
        .bind(patch.description.clone().flatten())
        .bind(patch.price)
        .bind(&patch.currency)
        .bind(patch.stock)
        .bind(patch.image_url.is_some())
        .bind(patch.image_url.clone().flatten())
        .bind(patch.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("update product", e))?;

        row.map(Product::try_from).transpose()
    }
}
