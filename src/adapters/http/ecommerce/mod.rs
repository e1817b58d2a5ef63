//! HTTP adapter for the storefront endpoints.
//!
//! Exposes the catalog, checkout, payment webhook and order lookup under
//! `/api/ecommerce`.

pub mod dto;
pub mod handlers;
pub mod routes;

pub use routes::ecommerce_routes;
