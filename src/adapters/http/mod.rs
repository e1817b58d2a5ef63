//! HTTP adapter - REST API on axum.
//!
//! - `ecommerce` - catalog, checkout, webhook and order endpoints
//! - `ask_ai` - stub question answering
//! - `middleware` - admin key guard
//! - `error` - `StoreError` to response mapping

pub mod ask_ai;
pub mod ecommerce;
pub mod error;
pub mod middleware;
mod router;
mod state;

pub use error::{ApiError, ErrorResponse};
pub use middleware::AdminAccess;
pub use router::{api_router, build_router};
pub use state::AppState;
