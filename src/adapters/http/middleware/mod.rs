//! HTTP middleware for axum.
//!
//! - `admin` - Admin API key guard for catalog writes

pub mod admin;

pub use admin::{require_admin_key, AdminAccess};
