//! Request and response bodies for the ecommerce API.
//!
//! Field names are camelCase on the wire. Request fields that carry a
//! validation message of their own are optional here and checked by the
//! handlers, so a missing field gets the same message as an invalid one.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::domain::catalog::{NewProduct, Product, ProductPatch};
use crate::domain::foundation::Timestamp;
use crate::domain::order::{OrderItemView, OrderStatus, OrderView};

use crate::adapters::http::error::ApiError;

// ════════════════════════════════════════════════════════════════════════════════
// Requests
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Value>,
    pub currency: Option<String>,
    pub stock: Option<i32>,
    pub image_url: Option<String>,
}

impl CreateProductRequest {
    pub fn into_new_product(self) -> Result<NewProduct, ApiError> {
        let name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ApiError::bad_request("name is required"))?;
        let price = positive_int(self.price.as_ref())
            .ok_or_else(|| ApiError::bad_request("price must be a positive integer (cents)"))?;

        Ok(NewProduct {
            name,
            description: self.description,
            price,
            currency: self.currency,
            stock: self.stock,
            image_url: self.image_url,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    pub price: Option<Value>,
    pub currency: Option<String>,
    pub stock: Option<i32>,
    #[serde(default, deserialize_with = "nullable")]
    pub image_url: Option<Option<String>>,
    pub active: Option<bool>,
}

impl UpdateProductRequest {
    pub fn into_patch(self) -> Result<ProductPatch, ApiError> {
        let price = match self.price {
            None | Some(Value::Null) => None,
            Some(raw) => Some(positive_int(Some(&raw)).ok_or_else(|| {
                ApiError::bad_request("price must be a positive integer (cents)")
            })?),
        };

        Ok(ProductPatch {
            name: self.name,
            description: self.description,
            price,
            currency: self.currency,
            stock: self.stock,
            image_url: self.image_url,
            active: self.active,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub items: Option<Vec<CheckoutItemRequest>>,
    pub customer_email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutItemRequest {
    pub product_id: Option<String>,
    pub quantity: Option<Value>,
}

/// Absent field is `None`; explicit `null` is `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Accepts JSON integers of at least 1.
pub(super) fn positive_int(value: Option<&Value>) -> Option<i64> {
    value.and_then(Value::as_i64).filter(|n| *n >= 1)
}

// ════════════════════════════════════════════════════════════════════════════════
// Responses
// ════════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDto {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub currency: String,
    pub stock: i32,
    pub active: bool,
    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Product> for ProductDto {
    fn from(p: Product) -> Self {
        Self {
            id: p.id.to_string(),
            name: p.name,
            description: p.description,
            price: p.price,
            currency: p.currency,
            stock: p.stock,
            active: p.active,
            image_url: p.image_url,
            created_at: p.created_at,
            updated_at: p.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub product: ProductDto,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductListResponse {
    pub products: Vec<ProductDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutResponse {
    pub url: String,
    pub session_id: String,
    pub order_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WebhookAck {
    pub received: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemDto {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub product: Option<ProductDto>,
}

impl From<OrderItemView> for OrderItemDto {
    fn from(view: OrderItemView) -> Self {
        Self {
            id: view.item.id.to_string(),
            order_id: view.item.order_id.to_string(),
            product_id: view.item.product_id.to_string(),
            quantity: view.item.quantity,
            unit_price: view.item.unit_price,
            product: view.product.map(ProductDto::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDto {
    pub id: String,
    pub customer_email: String,
    pub status: OrderStatus,
    pub total_amount: i64,
    pub currency: String,
    pub stripe_session_id: Option<String>,
    pub stripe_payment_intent_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub items: Vec<OrderItemDto>,
}

impl From<OrderView> for OrderDto {
    fn from(view: OrderView) -> Self {
        let order = view.order;
        Self {
            id: order.id.to_string(),
            customer_email: order.customer_email.as_str().to_string(),
            status: order.status,
            total_amount: order.total_amount,
            currency: order.currency,
            stripe_session_id: order.stripe_session_id,
            stripe_payment_intent_id: order.stripe_payment_intent_id,
            created_at: order.created_at,
            updated_at: order.updated_at,
            items: view.items.into_iter().map(OrderItemDto::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OrderResponse {
    pub order: OrderDto,
}
