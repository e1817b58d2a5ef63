//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `ai` - Question answering (stub)
//! - `http` - Axum routes, middleware and error mapping
//! - `memory` - In-memory repositories for tests and local runs
//! - `postgres` - PostgreSQL repositories
//! - `stripe` - Stripe Checkout gateway and its test double

pub mod ai;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod stripe;
