//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations through
//! the ports. Every handler returns `StoreError`.

pub mod ask_ai;
pub mod catalog;
pub mod checkout;
pub mod order;

pub use ask_ai::{AskAiCommand, AskAiHandler};
pub use catalog::{
    CreateProductCommand, CreateProductHandler, GetProductHandler, GetProductQuery,
    ListProductsHandler, UpdateProductCommand, UpdateProductHandler,
};
pub use checkout::{
    CheckoutRedirects, CreateCheckoutSessionCommand, CreateCheckoutSessionHandler,
    CreateCheckoutSessionResult, ReconcilePaymentWebhookCommand, ReconcilePaymentWebhookHandler,
    ReconcilePaymentWebhookResult, WebhookOutcome,
};
pub use order::{GetOrderHandler, GetOrderQuery};
