//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;

pub use handlers::{
    // Catalog
    CreateProductCommand, CreateProductHandler, GetProductHandler, GetProductQuery,
    ListProductsHandler, UpdateProductCommand, UpdateProductHandler,
    // Checkout and reconciliation
    CheckoutRedirects, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    CreateCheckoutSessionResult, ReconcilePaymentWebhookCommand, ReconcilePaymentWebhookHandler,
    ReconcilePaymentWebhookResult, WebhookOutcome,
    // Orders
    GetOrderHandler, GetOrderQuery,
    // Ask AI
    AskAiCommand, AskAiHandler,
};
