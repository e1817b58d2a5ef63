//! Order query handlers.

mod get_order;

pub use get_order::{GetOrderHandler, GetOrderQuery};
