//! Order module - customer orders and their lifecycle.
//!
//! - `status` - Order status state machine
//! - `email` - Customer email value object
//! - `aggregate` - Order aggregate, line items and read projection

mod email;
mod aggregate;
mod status;

pub use email::CustomerEmail;
pub use aggregate::{CartLine, Order, OrderItem, OrderItemView, OrderView};
pub use status::OrderStatus;
