//! Axum router configuration for the ecommerce endpoints.

use axum::{
    middleware,
    routing::{get, patch, post},
    Router,
};

use crate::adapters::http::middleware::{require_admin_key, AdminAccess};
use crate::adapters::http::state::AppState;

use super::handlers::{
    create_checkout, create_product, get_order, get_product, handle_stripe_webhook,
    list_products, update_product,
};

/// Create the ecommerce API router, mounted at `/api/ecommerce`.
///
/// # Routes
///
/// ## Public
/// - `GET /products` - List active products
/// - `GET /products/:id` - Get an active product
/// - `POST /checkout` - Start a hosted checkout
/// - `GET /orders/:id` - Get an order with items and products
///
/// ## Admin (Bearer admin key)
/// - `POST /products` - Create a product
/// - `PATCH /products/:id` - Update a product
///
/// ## Webhook (no auth, signature verified)
/// - `POST /webhook` - Stripe events
pub fn ecommerce_routes(admin: AdminAccess) -> Router<AppState> {
    let admin_only = middleware::from_fn_with_state(admin, require_admin_key);

    Router::new()
        .route(
            "/products",
            get(list_products).merge(post(create_product).route_layer(admin_only.clone())),
        )
        .route(
            "/products/:id",
            get(get_product).merge(patch(update_product).route_layer(admin_only)),
        )
        .route("/checkout", post(create_checkout))
        .route("/webhook", post(handle_stripe_webhook))
        .route("/orders/:id", get(get_order))
}
