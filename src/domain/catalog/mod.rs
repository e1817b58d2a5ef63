//! Catalog module - products offered by the store.

mod product;

pub use product::{NewProduct, Product, ProductPatch, DEFAULT_CURRENCY};
