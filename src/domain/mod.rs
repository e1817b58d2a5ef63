//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, state machine, errors)
//! - `catalog` - Products and their validation rules
//! - `order` - Order aggregate, status lifecycle, customer email
//! - `payment` - Webhook verification and the closed payment event set
//! - `errors` - Store-level error taxonomy

pub mod catalog;
pub mod errors;
pub mod foundation;
pub mod order;
pub mod payment;
