//! Shared application state for the HTTP adapter.

use std::sync::Arc;

use crate::application::handlers::{
    AskAiHandler, CheckoutRedirects, CreateCheckoutSessionHandler, CreateProductHandler,
    GetOrderHandler, GetProductHandler, ListProductsHandler, ReconcilePaymentWebhookHandler,
    UpdateProductHandler,
};
use crate::ports::{CatalogRepository, OrderRepository, PaymentGateway, QuestionAnswerer};

use super::middleware::AdminAccess;

/// Dependencies shared by every request.
///
/// Cloned per request; every dependency is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub payment_gateway: Arc<dyn PaymentGateway>,
    pub answerer: Arc<dyn QuestionAnswerer>,
    pub redirects: CheckoutRedirects,
    pub admin: AdminAccess,
}

impl AppState {
    pub fn list_products_handler(&self) -> ListProductsHandler {
        ListProductsHandler::new(self.catalog.clone())
    }

    pub fn get_product_handler(&self) -> GetProductHandler {
        GetProductHandler::new(self.catalog.clone())
    }

    pub fn create_product_handler(&self) -> CreateProductHandler {
        CreateProductHandler::new(self.catalog.clone())
    }

    pub fn update_product_handler(&self) -> UpdateProductHandler {
        UpdateProductHandler::new(self.catalog.clone())
    }

    pub fn checkout_handler(&self) -> CreateCheckoutSessionHandler {
        CreateCheckoutSessionHandler::new(
            self.catalog.clone(),
            self.orders.clone(),
            self.payment_gateway.clone(),
            self.redirects.clone(),
        )
    }

    pub fn webhook_handler(&self) -> ReconcilePaymentWebhookHandler {
        ReconcilePaymentWebhookHandler::new(self.orders.clone(), self.payment_gateway.clone())
    }

    pub fn get_order_handler(&self) -> GetOrderHandler {
        GetOrderHandler::new(self.orders.clone())
    }

    pub fn ask_ai_handler(&self) -> AskAiHandler {
        AskAiHandler::new(self.answerer.clone())
    }
}
