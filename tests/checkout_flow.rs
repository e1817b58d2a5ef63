//! End-to-end checkout and reconciliation through the HTTP API.
//!
//! Wires the router over the in-memory store and a mock gateway that
//! verifies real Stripe signatures, then walks an order from checkout to
//! payment, expiry and refund.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use tower::ServiceExt;

use storefront_api::adapters::ai::StubQuestionAnswerer;
use storefront_api::adapters::http::{api_router, AdminAccess, AppState};
use storefront_api::adapters::memory::InMemoryStore;
use storefront_api::adapters::stripe::MockPaymentGateway;
use storefront_api::application::handlers::CheckoutRedirects;
use storefront_api::config::{AdminConfig, Environment};

const WEBHOOK_SECRET: &str = "whsec_integration_secret";
const ADMIN_KEY: &str = "integration-admin-key";

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Shop {
    router: Router,
    gateway: Arc<MockPaymentGateway>,
}

impl Shop {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let gateway = Arc::new(MockPaymentGateway::with_webhook_secret(WEBHOOK_SECRET));
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
            admin: AdminAccess::new(&AdminConfig::with_key(ADMIN_KEY), Environment::Production),
        };
        Self {
            router: api_router(state),
            gateway,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn post(&self, uri: &str, body: Value, admin: bool) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json");
        if admin {
            builder = builder.header("authorization", format!("Bearer {}", ADMIN_KEY));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    async fn create_product(&self, name: &str, price: i64, stock: i32) -> String {
        let (status, body) = self
            .post(
                "/api/ecommerce/products",
                json!({ "name": name, "price": price, "stock": stock }),
                true,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["product"]["id"].as_str().unwrap().to_string()
    }

    async fn checkout(&self, product_id: &str, quantity: i64) -> String {
        let (status, body) = self
            .post(
                "/api/ecommerce/checkout",
                json!({
                    "items": [{ "productId": product_id, "quantity": quantity }],
                    "customerEmail": "buyer@example.com"
                }),
                false,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["orderId"].as_str().unwrap().to_string()
    }

    async fn deliver(&self, event_id: &str, event_type: &str, object: Value) -> StatusCode {
        let timestamp = chrono::Utc::now().timestamp();
        let payload = json!({
            "id": event_id,
            "type": event_type,
            "created": timestamp,
            "livemode": false,
            "data": { "object": object }
        })
        .to_string();
        let header = format!("t={},v1={}", timestamp, sign(timestamp, &payload));
        self.deliver_raw(payload, &header).await.0
    }

    async fn deliver_raw(&self, payload: String, signature: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri("/api/ecommerce/webhook")
                .header("content-type", "application/json")
                .header("stripe-signature", signature)
                .body(Body::from(payload))
                .unwrap(),
        )
        .await
    }

    async fn order(&self, order_id: &str) -> Value {
        let (status, body) = self.get(&format!("/api/ecommerce/orders/{}", order_id)).await;
        assert_eq!(status, StatusCode::OK);
        body["order"].clone()
    }

    async fn stock(&self, product_id: &str) -> i64 {
        let (_, body) = self.get(&format!("/api/ecommerce/products/{}", product_id)).await;
        body["product"]["stock"].as_i64().unwrap()
    }
}

fn sign(timestamp: i64, payload: &str) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(format!("{}.{}", timestamp, payload).as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

fn session(order_id: &str, payment_intent: &str) -> Value {
    json!({
        "id": "cs_test_flow",
        "payment_intent": payment_intent,
        "metadata": { "orderId": order_id }
    })
}

// =============================================================================
// Payment Lifecycle
// =============================================================================

#[tokio::test]
async fn paid_order_decrements_stock_once() {
    let shop = Shop::new();
    let product_id = shop.create_product("Desk Lamp", 500, 10).await;
    let order_id = shop.checkout(&product_id, 2).await;

    let order = shop.order(&order_id).await;
    assert_eq!(order["status"], "PENDING");
    assert_eq!(order["totalAmount"], 1000);
    assert_eq!(order["items"][0]["unitPrice"], 500);
    assert!(order["stripeSessionId"].as_str().unwrap().starts_with("cs_test_"));

    let completed = session(&order_id, "pi_flow_1");
    assert_eq!(
        shop.deliver("evt_1", "checkout.session.completed", completed.clone()).await,
        StatusCode::OK
    );
    assert_eq!(shop.order(&order_id).await["status"], "PAID");
    assert_eq!(shop.stock(&product_id).await, 8);

    // Redelivery of the same event changes nothing
    assert_eq!(
        shop.deliver("evt_1", "checkout.session.completed", completed).await,
        StatusCode::OK
    );
    assert_eq!(shop.stock(&product_id).await, 8);

    // A late expiry does not cancel a paid order
    assert_eq!(
        shop.deliver("evt_2", "checkout.session.expired", session(&order_id, "pi_flow_1")).await,
        StatusCode::OK
    );
    assert_eq!(shop.order(&order_id).await["status"], "PAID");
}

#[tokio::test]
async fn refund_restores_stock() {
    let shop = Shop::new();
    let product_id = shop.create_product("Desk Lamp", 500, 10).await;
    let order_id = shop.checkout(&product_id, 2).await;
    shop.deliver("evt_1", "checkout.session.completed", session(&order_id, "pi_refund"))
        .await;

    let status = shop
        .deliver("evt_3", "charge.refunded", json!({ "payment_intent": "pi_refund" }))
        .await;

    assert_eq!(status, StatusCode::OK);
    let order = shop.order(&order_id).await;
    assert_eq!(order["status"], "REFUNDED");
    assert_eq!(order["stripePaymentIntentId"], "pi_refund");
    assert_eq!(shop.stock(&product_id).await, 10);
}

#[tokio::test]
async fn refund_of_shared_payment_intent_restores_every_order_once() {
    let shop = Shop::new();
    let product_id = shop.create_product("Desk Lamp", 500, 10).await;
    let first = shop.checkout(&product_id, 2).await;
    let second = shop.checkout(&product_id, 2).await;
    shop.deliver("evt_1", "checkout.session.completed", session(&first, "pi_shared"))
        .await;
    shop.deliver("evt_2", "checkout.session.completed", session(&second, "pi_shared"))
        .await;
    assert_eq!(shop.stock(&product_id).await, 6);

    for event_id in ["evt_3", "evt_3"] {
        let status = shop
            .deliver(event_id, "charge.refunded", json!({ "payment_intent": "pi_shared" }))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(shop.order(&first).await["status"], "REFUNDED");
    assert_eq!(shop.order(&second).await["status"], "REFUNDED");
    assert_eq!(shop.stock(&product_id).await, 10);
}

#[tokio::test]
async fn expired_session_cancels_pending_order() {
    let shop = Shop::new();
    let product_id = shop.create_product("Mug", 1200, 3).await;
    let order_id = shop.checkout(&product_id, 1).await;

    let status = shop
        .deliver("evt_4", "checkout.session.expired", json!({ "metadata": { "orderId": order_id } }))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(shop.order(&order_id).await["status"], "CANCELLED");
    assert_eq!(shop.stock(&product_id).await, 3);
}

#[tokio::test]
async fn unrelated_events_are_acknowledged() {
    let shop = Shop::new();

    let status = shop
        .deliver("evt_5", "invoice.paid", json!({ "id": "in_1" }))
        .await;

    assert_eq!(status, StatusCode::OK);
}

// =============================================================================
// Rejections
// =============================================================================

#[tokio::test]
async fn tampered_payload_is_rejected() {
    let shop = Shop::new();
    let timestamp = chrono::Utc::now().timestamp();
    let signed = json!({ "id": "evt_6", "type": "invoice.paid", "data": { "object": {} } }).to_string();
    let header = format!("t={},v1={}", timestamp, sign(timestamp, &signed));
    let tampered = signed.replace("invoice.paid", "charge.refunded");

    let (status, body) = shop.deliver_raw(tampered, &header).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Webhook Error: "));
}

#[tokio::test]
async fn missing_signature_is_rejected() {
    let shop = Shop::new();

    let (status, _) = shop.deliver_raw("{}".to_string(), "").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn stale_signature_is_rejected() {
    let shop = Shop::new();
    let timestamp = chrono::Utc::now().timestamp() - 3600;
    let payload = json!({ "id": "evt_7", "type": "invoice.paid", "data": { "object": {} } }).to_string();
    let header = format!("t={},v1={}", timestamp, sign(timestamp, &payload));

    let (status, _) = shop.deliver_raw(payload, &header).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn checkout_records_redirects_and_metadata() {
    let shop = Shop::new();
    let product_id = shop.create_product("Desk Lamp", 500, 10).await;
    let order_id = shop.checkout(&product_id, 1).await;

    let requests = shop.gateway.checkout_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].order_id.to_string(), order_id);
    assert_eq!(requests[0].cancel_url, "https://shop.test/checkout/cancel");
}

#[tokio::test]
async fn production_admin_routes_require_key() {
    let shop = Shop::new();

    let (status, _) = shop
        .post("/api/ecommerce/products", json!({ "name": "Mug", "price": 100 }), false)
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
