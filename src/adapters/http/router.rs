//! Top-level router: API modules, health check, fallback and HTTP layers.

use axum::http::{header, HeaderValue, Method};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

use super::ask_ai::ask_ai_routes;
use super::ecommerce::ecommerce_routes;
use super::error::ErrorResponse;
use super::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

async fn not_found() -> impl IntoResponse {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(ErrorResponse::new("Not found")),
    )
}

/// Routes without HTTP layers. Used directly by tests.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/api/ecommerce", ecommerce_routes(state.admin.clone()))
        .nest("/api/ask-ai", ask_ai_routes())
        .fallback(not_found)
        .with_state(state)
}

/// Complete application router with tracing, request ids, timeout,
/// compression and CORS.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    api_router(state).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(server.request_timeout()))
            .layer(CompressionLayer::new())
            .layer(cors_layer(&server.cors_origins_list())),
    )
}

/// CORS restricted to the configured origins.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::adapters::ai::StubQuestionAnswerer;
    use crate::adapters::http::AdminAccess;
    use crate::adapters::memory::InMemoryStore;
    use crate::adapters::stripe::MockPaymentGateway;
    use crate::application::handlers::CheckoutRedirects;
    use crate::config::{AdminConfig, Environment};
    use crate::domain::catalog::{NewProduct, Product};
    use crate::domain::order::OrderStatus;
    use crate::domain::payment::StripeEventBuilder;

    const ADMIN_KEY: &str = "test-admin-key-0001";

    struct TestApp {
        store: InMemoryStore,
        gateway: Arc<MockPaymentGateway>,
        router: Router,
    }

    fn app_with(admin: AdminConfig, environment: Environment) -> TestApp {
        let store = InMemoryStore::new();
        let gateway = Arc::new(MockPaymentGateway::new());
        let state = AppState {
            catalog: Arc::new(store.catalog()),
            orders: Arc::new(store.orders()),
            payment_gateway: gateway.clone(),
            answerer: Arc::new(StubQuestionAnswerer::new()),
            redirects: CheckoutRedirects {
                success_url: "https://shop.test/checkout/success?session_id={CHECKOUT_SESSION_ID}"
                    .to_string(),
                cancel_url: "https://shop.test/checkout/cancel".to_string(),
            },
            admin: AdminAccess::new(&admin, environment),
        };
        TestApp {
            store,
            gateway,
            router: api_router(state),
        }
    }

    fn app() -> TestApp {
        app_with(AdminConfig::with_key(ADMIN_KEY), Environment::Development)
    }

    async fn seed(store: &InMemoryStore, price: i64, stock: i32) -> Product {
        let product = Product::create(NewProduct {
            name: "Lamp".to_string(),
            price,
            stock: Some(stock),
            ..Default::default()
        })
        .unwrap();
        store.put_product(product.clone()).await;
        product
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn json_request(method: &str, uri: &str, body: Value, auth: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json");
        if let Some(key) = auth {
            builder = builder.header("authorization", format!("Bearer {}", key));
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Health and Fallback
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn health_reports_ok() {
        let (status, body) = send(&app().router, get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[tokio::test]
    async fn unknown_route_is_json_404() {
        let (status, body) = send(&app().router, get("/api/nope")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, json!({ "error": "Not found" }));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Products
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn lists_products_in_camel_case() {
        let app = app();
        let product = seed(&app.store, 500, 10).await;

        let (status, body) = send(&app.router, get("/api/ecommerce/products")).await;

        assert_eq!(status, StatusCode::OK);
        let products = body["products"].as_array().unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0]["id"], product.id.to_string());
        assert_eq!(products[0]["price"], 500);
        assert!(products[0].get("imageUrl").is_some());
    }

    #[tokio::test]
    async fn unknown_or_malformed_product_id_is_404() {
        let app = app();
        let uri = format!("/api/ecommerce/products/{}", crate::domain::foundation::ProductId::new());

        let (status, body) = send(&app.router, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Product not found");

        let (status, _) = send(&app.router, get("/api/ecommerce/products/not-a-uuid")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn create_product_requires_admin_key() {
        let app = app();
        let body = json!({ "name": "Mug", "price": 1200 });

        let (status, response) = send(
            &app.router,
            json_request("POST", "/api/ecommerce/products", body.clone(), None),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(response["error"], "Unauthorized");

        let (status, response) = send(
            &app.router,
            json_request("POST", "/api/ecommerce/products", body, Some(ADMIN_KEY)),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(response["product"]["name"], "Mug");
        assert_eq!(response["product"]["currency"], "usd");
    }

    #[tokio::test]
    async fn create_product_validates_fields() {
        let app = app();

        let (status, body) = send(
            &app.router,
            json_request("POST", "/api/ecommerce/products", json!({ "price": 100 }), Some(ADMIN_KEY)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "name is required");

        let (status, body) = send(
            &app.router,
            json_request(
                "POST",
                "/api/ecommerce/products",
                json!({ "name": "Mug", "price": 9.99 }),
                Some(ADMIN_KEY),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "price must be a positive integer (cents)");
    }

    #[tokio::test]
    async fn production_without_admin_key_refuses_writes() {
        let app = app_with(AdminConfig::default(), Environment::Production);

        let (status, body) = send(
            &app.router,
            json_request("POST", "/api/ecommerce/products", json!({ "name": "Mug", "price": 1 }), None),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Admin access not configured");
    }

    #[tokio::test]
    async fn development_without_admin_key_allows_writes() {
        let app = app_with(AdminConfig::default(), Environment::Development);

        let (status, _) = send(
            &app.router,
            json_request("POST", "/api/ecommerce/products", json!({ "name": "Mug", "price": 1 }), None),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn patch_product_updates_fields() {
        let app = app();
        let product = seed(&app.store, 500, 10).await;
        let uri = format!("/api/ecommerce/products/{}", product.id);

        let (status, body) = send(
            &app.router,
            json_request("PATCH", &uri, json!({ "stock": 3, "active": false }), Some(ADMIN_KEY)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["product"]["stock"], 3);
        assert_eq!(body["product"]["active"], false);

        let (status, _) = send(&app.router, get(&uri)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn patch_with_null_clears_description_and_keeps_image() {
        let app = app();
        let mut product = seed(&app.store, 500, 10).await;
        product.description = Some("Brass desk lamp".to_string());
        product.image_url = Some("https://cdn.test/lamp.png".to_string());
        app.store.put_product(product.clone()).await;
        let uri = format!("/api/ecommerce/products/{}", product.id);

        let (status, body) = send(
            &app.router,
            json_request("PATCH", &uri, json!({ "description": null }), Some(ADMIN_KEY)),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["product"]["description"], Value::Null);
        assert_eq!(body["product"]["imageUrl"], "https://cdn.test/lamp.png");
        let stored = app.store.product(&product.id).await.unwrap();
        assert_eq!(stored.description, None);
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Checkout
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn checkout_returns_session_and_order() {
        let app = app();
        let product = seed(&app.store, 500, 10).await;

        let (status, body) = send(
            &app.router,
            json_request(
                "POST",
                "/api/ecommerce/checkout",
                json!({
                    "items": [{ "productId": product.id.to_string(), "quantity": 2 }],
                    "customerEmail": "buyer@example.com"
                }),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["url"].as_str().unwrap().starts_with("https://"));
        assert!(body["sessionId"].as_str().unwrap().starts_with("cs_test_"));
        let order_id = body["orderId"].as_str().unwrap().parse().unwrap();
        let order = app.store.order(&order_id).await.unwrap();
        assert_eq!(order.total_amount, 1000);
        assert!(app.gateway.was_called("create_checkout_session"));
    }

    #[tokio::test]
    async fn checkout_ignores_client_supplied_prices() {
        let app = app();
        let product = seed(&app.store, 500, 10).await;

        let (status, body) = send(
            &app.router,
            json_request(
                "POST",
                "/api/ecommerce/checkout",
                json!({
                    "items": [{ "productId": product.id.to_string(), "quantity": 2, "price": 1 }],
                    "customerEmail": "buyer@example.com",
                    "totalAmount": 2
                }),
                None,
            ),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let order_id = body["orderId"].as_str().unwrap().parse().unwrap();
        let order = app.store.order(&order_id).await.unwrap();
        assert_eq!(order.total_amount, 1000);
        assert_eq!(order.items[0].unit_price, 500);
    }

    #[tokio::test]
    async fn checkout_validation_messages() {
        let app = app();
        let product = seed(&app.store, 500, 10).await;
        let pid = product.id.to_string();

        let cases = [
            (json!({ "items": [], "customerEmail": "a@b.co" }), "items must be a non-empty array"),
            (
                json!({ "items": [{ "quantity": 1 }], "customerEmail": "a@b.co" }),
                "each item must have a productId",
            ),
            (
                json!({ "items": [{ "productId": pid, "quantity": 0 }], "customerEmail": "a@b.co" }),
                "each item quantity must be >= 1",
            ),
            (
                json!({ "items": [{ "productId": pid, "quantity": 1 }], "customerEmail": "nope" }),
                "valid customerEmail is required",
            ),
            (
                json!({ "items": [{ "productId": "p-unknown", "quantity": 1 }], "customerEmail": "a@b.co" }),
                "One or more products not found or inactive",
            ),
            (
                json!({ "items": [{ "productId": pid, "quantity": 11 }], "customerEmail": "a@b.co" }),
                "Insufficient stock for product: Lamp",
            ),
        ];

        for (request, expected) in cases {
            let (status, body) = send(
                &app.router,
                json_request("POST", "/api/ecommerce/checkout", request, None),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", expected);
            assert_eq!(body["error"], expected);
        }
        assert_eq!(app.store.order_count().await, 0);
    }

    #[tokio::test]
    async fn malformed_json_is_bad_request() {
        let app = app();
        let request = Request::builder()
            .method("POST")
            .uri("/api/ecommerce/checkout")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(&app.router, request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Invalid request body"));
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Webhook and Orders
    // ════════════════════════════════════════════════════════════════════════════

    fn webhook(payload: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/ecommerce/webhook")
            .header("content-type", "application/json")
            .header("stripe-signature", "t=1,v1=mock")
            .body(Body::from(payload))
            .unwrap()
    }

    #[tokio::test]
    async fn webhook_completes_order_and_order_endpoint_shows_it() {
        let app = app();
        let product = seed(&app.store, 500, 10).await;
        let (_, checkout) = send(
            &app.router,
            json_request(
                "POST",
                "/api/ecommerce/checkout",
                json!({
                    "items": [{ "productId": product.id.to_string(), "quantity": 2 }],
                    "customerEmail": "buyer@example.com"
                }),
                None,
            ),
        )
        .await;
        let order_id = checkout["orderId"].as_str().unwrap().to_string();

        let payload = StripeEventBuilder::new()
            .object(json!({ "payment_intent": "pi_1", "metadata": { "orderId": order_id } }))
            .to_payload();
        let (status, body) = send(&app.router, webhook(payload)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "received": true }));

        let (status, body) = send(&app.router, get(&format!("/api/ecommerce/orders/{}", order_id))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"]["status"], "PAID");
        assert_eq!(body["order"]["totalAmount"], 1000);
        assert_eq!(body["order"]["items"][0]["product"]["name"], "Lamp");
        assert_eq!(app.store.product(&product.id).await.unwrap().stock, 8);
        assert_eq!(
            app.store.order(&order_id.parse().unwrap()).await.unwrap().status,
            OrderStatus::Paid
        );
    }

    #[tokio::test]
    async fn webhook_with_bad_signature_is_rejected() {
        let store = InMemoryStore::new();
        let state = AppState {
            catalog: Arc::new(store.catalog()),
            orders: Arc::new(store.orders()),
            payment_gateway: Arc::new(MockPaymentGateway::rejecting_webhooks()),
            answerer: Arc::new(StubQuestionAnswerer::new()),
            redirects: CheckoutRedirects {
                success_url: "https://shop.test/ok".to_string(),
                cancel_url: "https://shop.test/cancel".to_string(),
            },
            admin: AdminAccess::new(&AdminConfig::default(), Environment::Development),
        };

        let (status, body) = send(&api_router(state), webhook("{}".to_string())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("Webhook Error: "));
    }

    #[tokio::test]
    async fn webhook_storage_failure_is_500() {
        let app = app();
        let payload = StripeEventBuilder::new()
            .object(json!({ "metadata": { "orderId": crate::domain::foundation::OrderId::new().to_string() } }))
            .to_payload();
        app.store.fail_writes(true);

        let (status, body) = send(&app.router, webhook(payload)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Webhook processing failed");
    }

    #[tokio::test]
    async fn unknown_order_is_404() {
        let (status, body) = send(&app().router, get("/api/ecommerce/orders/missing")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Order not found");
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Ask AI
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn ask_ai_answers_with_stub() {
        let (status, body) = send(
            &app().router,
            json_request("POST", "/api/ask-ai/ask", json!({ "question": " Hi? " }), None),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "answer": "[stub] Received your question: \"Hi?\"",
                "model": "stub",
                "usage": null
            })
        );
    }

    #[tokio::test]
    async fn ask_ai_requires_question() {
        let (status, body) = send(
            &app().router,
            json_request("POST", "/api/ask-ai/ask", json!({ "question": 42 }), None),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "question is required");
    }

    #[tokio::test]
    async fn ask_ai_health_reports_not_ready() {
        let (status, body) = send(&app().router, get("/api/ask-ai/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "ok", "module": "askAI", "ready": false }));
    }
}
