//! PostgreSQL implementation of OrderRepository.
//!
//! Reconciliation operations run in one transaction each. The status
//! change is a guarded `UPDATE ... WHERE status = <expected>`; stock is
//! only adjusted when that update actually changed a row. A concurrent
//! redelivery of the same event blocks on the row lock and then matches
//! nothing, so stock moves at most once per order.

use crate::domain::catalog::Product;
use crate::domain::foundation::{
    DomainError, ErrorCode, OrderId, OrderItemId, ProductId, Timestamp,
};
use crate::domain::order::{
    CustomerEmail, Order, OrderItem, OrderItemView, OrderStatus, OrderView,
};
use crate::ports::{OrderRepository, RefundOutcome, TransitionOutcome};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::catalog_repository::ProductRow;

/// PostgreSQL implementation of the OrderRepository port.
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn begin(&self) -> Result<Transaction<'static, Postgres>, DomainError> {
        self.pool.begin().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to begin transaction: {}", e),
            )
        })
    }

    async fn fetch_order_row(&self, id: &OrderId) -> Result<Option<OrderRow>, DomainError> {
        sqlx::query_as(
            r#"
            SELECT id, customer_email, status, total_amount, currency,
                   stripe_session_id, stripe_payment_intent_id, created_at, updated_at
            FROM orders
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("fetch order", e))
    }

    async fn fetch_items(&self, order_id: &OrderId) -> Result<Vec<OrderItem>, DomainError> {
        let rows: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT id, order_id, product_id, quantity, unit_price
            FROM order_items
            WHERE order_id = $1
            ORDER BY position
            "#,
        )
        .bind(order_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch order items", e))?;

        Ok(rows.into_iter().map(OrderItem::from).collect())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Row types
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    customer_email: String,
    status: String,
    total_amount: i64,
    currency: String,
    stripe_session_id: Option<String>,
    stripe_payment_intent_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<OrderItem>) -> Result<Order, DomainError> {
        Ok(Order {
            id: OrderId::from_uuid(self.id),
            customer_email: CustomerEmail::parse(&self.customer_email).map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Invalid customer_email: {}", e))
            })?,
            status: parse_status(&self.status)?,
            total_amount: self.total_amount,
            currency: self.currency,
            stripe_session_id: self.stripe_session_id,
            stripe_payment_intent_id: self.stripe_payment_intent_id,
            items,
            created_at: Timestamp::from_datetime(self.created_at),
            updated_at: Timestamp::from_datetime(self.updated_at),
        })
    }

    /// Order items are taken from the joined rows, so one items query serves both.
    fn into_view(self, rows: Vec<OrderItemProductRow>) -> Result<OrderView, DomainError> {
        let items = rows
            .into_iter()
            .map(OrderItemView::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let order = self.into_order(items.iter().map(|view| view.item.clone()).collect())?;
        Ok(OrderView { order, items })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: i64,
}

impl From<OrderItemRow> for OrderItem {
    fn from(row: OrderItemRow) -> Self {
        OrderItem {
            id: OrderItemId::from_uuid(row.id),
            order_id: OrderId::from_uuid(row.order_id),
            product_id: ProductId::from_uuid(row.product_id),
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

/// Item joined to its product. Product columns are NULL if the row is gone.
#[derive(Debug, sqlx::FromRow)]
struct OrderItemProductRow {
    id: Uuid,
    order_id: Uuid,
    product_id: Uuid,
    quantity: i32,
    unit_price: i64,
    p_name: Option<String>,
    p_description: Option<String>,
    p_price: Option<i64>,
    p_currency: Option<String>,
    p_stock: Option<i32>,
    p_active: Option<bool>,
    p_image_url: Option<String>,
    p_created_at: Option<DateTime<Utc>>,
    p_updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderItemProductRow> for OrderItemView {
    type Error = DomainError;

    fn try_from(row: OrderItemProductRow) -> Result<Self, Self::Error> {
        let product = match (
            row.p_name,
            row.p_price,
            row.p_currency,
            row.p_stock,
            row.p_active,
            row.p_created_at,
            row.p_updated_at,
        ) {
            (
                Some(name),
                Some(price),
                Some(currency),
                Some(stock),
                Some(active),
                Some(created_at),
                Some(updated_at),
            ) => Some(Product::try_from(ProductRow {
                id: row.product_id,
                name,
                description: row.p_description,
                price,
                currency,
                stock,
                active,
                image_url: row.p_image_url,
                created_at,
                updated_at,
            })?),
            _ => None,
        };

        Ok(OrderItemView {
            item: OrderItem {
                id: OrderItemId::from_uuid(row.id),
                order_id: OrderId::from_uuid(row.order_id),
                product_id: ProductId::from_uuid(row.product_id),
                quantity: row.quantity,
                unit_price: row.unit_price,
            },
            product,
        })
    }
}

fn parse_status(s: &str) -> Result<OrderStatus, DomainError> {
    s.parse::<OrderStatus>()
        .map_err(|e| DomainError::new(ErrorCode::DatabaseError, format!("Invalid status value: {}", e)))
}

fn db_error(action: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("Failed to {}: {}", action, e))
}

// ════════════════════════════════════════════════════════════════════════════
// Transaction helpers
// ════════════════════════════════════════════════════════════════════════════

async fn insert_item(
    tx: &mut Transaction<'_, Postgres>,
    item: &OrderItem,
    position: i32,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO order_items (id, order_id, product_id, position, quantity, unit_price)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(item.id.as_uuid())
    .bind(item.order_id.as_uuid())
    .bind(item.product_id.as_uuid())
    .bind(position)
    .bind(item.quantity)
    .bind(item.unit_price)
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("insert order item", e))?;
    Ok(())
}

/// Moves stock for every line of the given orders. `sign` is -1 to take
/// stock and 1 to return it.
async fn adjust_stock_for_orders(
    tx: &mut Transaction<'_, Postgres>,
    order_ids: &[Uuid],
    sign: i32,
) -> Result<(), DomainError> {
    let lines: Vec<(Uuid, i32)> = sqlx::query_as(
        "SELECT product_id, quantity FROM order_items WHERE order_id = ANY($1) ORDER BY product_id",
    )
    .bind(order_ids)
    .fetch_all(&mut **tx)
    .await
    .map_err(|e| db_error("load order items", e))?;

    for (product_id, quantity) in lines {
        sqlx::query("UPDATE products SET stock = stock + $2, updated_at = NOW() WHERE id = $1")
            .bind(product_id)
            .bind(sign * quantity)
            .execute(&mut **tx)
            .await
            .map_err(|e| db_error("adjust stock", e))?;
    }
    Ok(())
}

async fn current_status(
    tx: &mut Transaction<'_, Postgres>,
    id: &OrderId,
) -> Result<TransitionOutcome, DomainError> {
    let status: Option<String> = sqlx::query_scalar("SELECT status FROM orders WHERE id = $1")
        .bind(id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| db_error("read order status", e))?;

    match status {
        Some(s) => Ok(TransitionOutcome::Skipped {
            current: parse_status(&s)?,
        }),
        None => Ok(TransitionOutcome::NotFound),
    }
}

async fn commit(tx: Transaction<'_, Postgres>) -> Result<(), DomainError> {
    tx.commit().await.map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to commit transaction: {}", e),
        )
    })
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create(&self, order: &Order) -> Result<(), DomainError> {
        let mut tx = self.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, customer_email, status, total_amount, currency,
                stripe_session_id, stripe_payment_intent_id, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(order.id.as_uuid())
        .bind(order.customer_email.as_str())
        .bind(order.status.as_str())
        .bind(order.total_amount)
        .bind(&order.currency)
        .bind(&order.stripe_session_id)
        .bind(&order.stripe_payment_intent_id)
        .bind(order.created_at.as_datetime())
        .bind(order.updated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("insert order", e))?;

        for (position, item) in order.items.iter().enumerate() {
            let position = i32::try_from(position).map_err(|_| {
                DomainError::new(ErrorCode::ValidationFailed, "Too many order items")
            })?;
            insert_item(&mut tx, item, position).await?;
        }

        commit(tx).await
    }

    async fn attach_session(&self, id: &OrderId, session_id: &str) -> Result<(), DomainError> {
        let result = sqlx::query(
            "UPDATE orders SET stripe_session_id = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(session_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("attach checkout session", e))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::OrderNotFound,
                format!("Order not found: {}", id),
            ));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &OrderId) -> Result<Option<Order>, DomainError> {
        match self.fetch_order_row(id).await? {
            Some(row) => {
                let items = self.fetch_items(id).await?;
                Ok(Some(row.into_order(items)?))
            }
            None => Ok(None),
        }
    }

    async fn find_view(&self, id: &OrderId) -> Result<Option<OrderView>, DomainError> {
        let Some(row) = self.fetch_order_row(id).await? else {
            return Ok(None);
        };

        let rows: Vec<OrderItemProductRow> = sqlx::query_as(
            r#"
            SELECT i.id, i.order_id, i.product_id, i.quantity, i.unit_price,
                   p.name AS p_name, p.description AS p_description, p.price AS p_price,
                   p.currency AS p_currency, p.stock AS p_stock, p.active AS p_active,
                   p.image_url AS p_image_url, p.created_at AS p_created_at,
                   p.updated_at AS p_updated_at
            FROM order_items i
            LEFT JOIN products p ON p.id = i.product_id
            WHERE i.order_id = $1
            ORDER BY i.position
            "#,
        )
        .bind(id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("fetch order items with products", e))?;

        Ok(Some(row.into_view(rows)?))
    }

    async fn complete_payment(
        &self,
        id: &OrderId,
        payment_intent: Option<&str>,
    ) -> Result<TransitionOutcome, DomainError> {
        let mut tx = self.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE orders SET
                status = 'paid',
                stripe_payment_intent_id = $2,
                updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            "#,
        )
        .bind(id.as_uuid())
        .bind(payment_intent)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("mark order paid", e))?;

        if updated.rows_affected() == 0 {
            let outcome = current_status(&mut tx, id).await?;
            commit(tx).await?;
            return Ok(outcome);
        }

        adjust_stock_for_orders(&mut tx, &[*id.as_uuid()], -1).await?;
        commit(tx).await?;
        Ok(TransitionOutcome::Applied)
    }

    async fn expire_session(&self, id: &OrderId) -> Result<TransitionOutcome, DomainError> {
        let mut tx = self.begin().await?;

        let updated = sqlx::query(
            "UPDATE orders SET status = 'cancelled', updated_at = NOW() WHERE id = $1 AND status = 'pending'",
        )
        .bind(id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("cancel order", e))?;

        let outcome = if updated.rows_affected() == 0 {
            current_status(&mut tx, id).await?
        } else {
            TransitionOutcome::Applied
        };
        commit(tx).await?;
        Ok(outcome)
    }

    async fn refund_by_payment_intent(
        &self,
        payment_intent: &str,
    ) -> Result<RefundOutcome, DomainError> {
        let mut tx = self.begin().await?;

        let already_refunded: Vec<Uuid> = sqlx::query_scalar(
            r#"
            SELECT id FROM orders
            WHERE stripe_payment_intent_id = $1 AND status = 'refunded'
            FOR UPDATE
            "#,
        )
        .bind(payment_intent)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| db_error("find refunded orders", e))?;

        let refunded: Vec<Uuid> = sqlx::query_scalar(
            r#"
            UPDATE orders SET status = 'refunded', updated_at = NOW()
            WHERE stripe_payment_intent_id = $1 AND status = 'paid'
            RETURNING id
            "#,
        )
        .bind(payment_intent)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| db_error("mark orders refunded", e))?;

        if !refunded.is_empty() {
            adjust_stock_for_orders(&mut tx, &refunded, 1).await?;
        }
        commit(tx).await?;

        Ok(RefundOutcome {
            refunded: refunded.into_iter().map(OrderId::from_uuid).collect(),
            already_refunded: already_refunded
                .into_iter()
                .map(OrderId::from_uuid)
                .collect(),
        })
    }
}
