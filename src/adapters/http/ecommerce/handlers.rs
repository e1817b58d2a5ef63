//! HTTP handlers for the ecommerce endpoints.
//!
//! These handlers connect axum routes to application layer handlers.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::application::handlers::{
    CreateCheckoutSessionCommand, CreateProductCommand, GetOrderQuery, GetProductQuery,
    ReconcilePaymentWebhookCommand, UpdateProductCommand,
};
use crate::domain::errors::StoreError;
use crate::domain::foundation::{OrderId, ProductId};
use crate::domain::order::{CartLine, CustomerEmail};

use crate::adapters::http::error::{ApiError, ErrorResponse};
use crate::adapters::http::state::AppState;

use super::dto::{
    positive_int, CheckoutRequest, CheckoutResponse, CreateProductRequest, OrderDto,
    OrderResponse, ProductDto, ProductListResponse, ProductResponse, UpdateProductRequest,
    WebhookAck,
};

const STRIPE_SIGNATURE_HEADER: &str = "stripe-signature";

// ════════════════════════════════════════════════════════════════════════════════
// Products
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/ecommerce/products - List active products
pub async fn list_products(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let products = state
        .list_products_handler()
        .handle()
        .await
        .map_err(ApiError::context("Failed to fetch products"))?;

    Ok(Json(ProductListResponse {
        products: products.into_iter().map(ProductDto::from).collect(),
    }))
}

/// GET /api/ecommerce/products/:id - Get one active product
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product_id = parse_product_id(&id)?;

    let product = state
        .get_product_handler()
        .handle(GetProductQuery { product_id })
        .await
        .map_err(ApiError::context("Failed to fetch product"))?;

    Ok(Json(ProductResponse {
        product: product.into(),
    }))
}

/// POST /api/ecommerce/products - Create a product (admin)
pub async fn create_product(
    State(state): State<AppState>,
    payload: Result<Json<CreateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let product = request.into_new_product()?;

    let product = state
        .create_product_handler()
        .handle(CreateProductCommand { product })
        .await
        .map_err(ApiError::context("Failed to create product"))?;

    Ok((
        StatusCode::CREATED,
        Json(ProductResponse {
            product: product.into(),
        }),
    ))
}

/// PATCH /api/ecommerce/products/:id - Partially update a product (admin)
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateProductRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let product_id = parse_product_id(&id)?;
    let Json(request) = payload?;
    let patch = request.into_patch()?;

    let product = state
        .update_product_handler()
        .handle(UpdateProductCommand { product_id, patch })
        .await
        .map_err(ApiError::context("Failed to update product"))?;

    Ok(Json(ProductResponse {
        product: product.into(),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Checkout and Webhook
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/ecommerce/checkout - Start a hosted checkout for a cart
pub async fn create_checkout(
    State(state): State<AppState>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let cmd = checkout_command(request)?;

    let result = state
        .checkout_handler()
        .handle(cmd)
        .await
        .map_err(ApiError::context("Failed to create checkout session"))?;

    Ok(Json(CheckoutResponse {
        url: result.url,
        session_id: result.session_id,
        order_id: result.order_id.to_string(),
    }))
}

/// POST /api/ecommerce/webhook - Reconcile orders from Stripe events
///
/// The body is taken raw; the signature covers the exact bytes received.
pub async fn handle_stripe_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let signature = headers
        .get(STRIPE_SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let cmd = ReconcilePaymentWebhookCommand {
        payload: body.to_vec(),
        signature: signature.to_string(),
    };

    match state.webhook_handler().handle(cmd).await {
        Ok(_) => Json(WebhookAck { received: true }).into_response(),
        Err(StoreError::Processing(cause)) => {
            tracing::error!(error = %cause, "Webhook processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Webhook processing failed")),
            )
                .into_response()
        }
        Err(rejected) => {
            tracing::warn!(error = %rejected, "Webhook rejected");
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse::new(format!("Webhook Error: {}", rejected))),
            )
                .into_response()
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Orders
// ════════════════════════════════════════════════════════════════════════════════

/// GET /api/ecommerce/orders/:id - Get an order with its items and products
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order_id: OrderId = id
        .parse()
        .map_err(|_| ApiError::from(StoreError::order_not_found()))?;

    let view = state
        .get_order_handler()
        .handle(GetOrderQuery { order_id })
        .await
        .map_err(ApiError::context("Failed to fetch order"))?;

    Ok(Json(OrderResponse {
        order: OrderDto::from(view),
    }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Request Validation
// ════════════════════════════════════════════════════════════════════════════════

/// Ids that are not UUIDs cannot name a product.
fn parse_product_id(raw: &str) -> Result<ProductId, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::from(StoreError::product_not_found()))
}

fn checkout_command(request: CheckoutRequest) -> Result<CreateCheckoutSessionCommand, ApiError> {
    let items = request
        .items
        .filter(|items| !items.is_empty())
        .ok_or_else(|| ApiError::bad_request("items must be a non-empty array"))?;

    let mut raw_lines = Vec::with_capacity(items.len());
    for item in &items {
        let product_id = item
            .product_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ApiError::bad_request("each item must have a productId"))?;
        let quantity = positive_int(item.quantity.as_ref())
            .and_then(|q| i32::try_from(q).ok())
            .ok_or_else(|| ApiError::bad_request("each item quantity must be >= 1"))?;
        raw_lines.push((product_id, quantity));
    }

    let customer_email = request
        .customer_email
        .as_deref()
        .and_then(|email| CustomerEmail::parse(email).ok())
        .ok_or_else(|| ApiError::bad_request("valid customerEmail is required"))?;

    // A malformed id cannot match a product, same as an unknown one
    let lines = raw_lines
        .into_iter()
        .map(|(product_id, quantity)| {
            product_id
                .parse::<ProductId>()
                .map(|product_id| CartLine {
                    product_id,
                    quantity,
                })
                .map_err(|_| ApiError::bad_request("One or more products not found or inactive"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CreateCheckoutSessionCommand {
        items: lines,
        customer_email,
    })
}
