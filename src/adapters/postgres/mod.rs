//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! - `PostgresCatalogRepository` - Product storage
//! - `PostgresOrderRepository` - Orders, items and transactional reconciliation

mod catalog_repository;
mod order_repository;

pub use catalog_repository::PostgresCatalogRepository;
pub use order_repository::PostgresOrderRepository;
