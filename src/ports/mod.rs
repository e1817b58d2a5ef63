//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Persistence Ports
//!
//! - `CatalogRepository` - Product reads and admin writes
//! - `OrderRepository` - Order writes, projections and atomic reconciliation
//!
//! ## External Service Ports
//!
//! - `PaymentGateway` - Hosted checkout sessions and webhook verification
//! - `QuestionAnswerer` - Answers free-form customer questions

mod catalog_repository;
mod order_repository;
mod payment_gateway;
mod question_answerer;

pub use catalog_repository::CatalogRepository;
pub use order_repository::{OrderRepository, RefundOutcome, TransitionOutcome};
pub use payment_gateway::{
    CheckoutLineItem, CheckoutSession, CheckoutSessionRequest, PaymentError, PaymentErrorCode,
    PaymentGateway,
};
pub use question_answerer::{Answer, QuestionAnswerer};
