//! Cache types for catalog API responses.

use crate::types::Product;

/// Cached value types.
///
/// Only catalog reads are cached; cart, order, and profile responses are
/// mutable per-session state and always go to the network.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
}
