//! Server-side cart endpoints.
//!
//! Every mutation returns the full authoritative cart projection (the list of
//! `{product, size, quantity}` lines), which the cart store swaps in
//! wholesale. Never cached.

use std::future::Future;
use std::sync::Arc;

use reqwest::Method;
use serde::Serialize;
use tracing::instrument;

use stride_core::ProductId;

use super::{ApiClient, ApiError};
use crate::types::{CartLine, Size};

/// Transport seam for the authenticated cart.
///
/// The cart store speaks this trait instead of [`ApiClient`] directly so the
/// server-of-record path can be exercised against an in-memory fake.
pub trait CartTransport: Send + Sync {
    /// Fetch the current cart.
    fn fetch_cart(&self) -> impl Future<Output = Result<Vec<CartLine>, ApiError>> + Send;

    /// Add `quantity` of a (product, size) pair; returns the updated cart.
    fn add_cart_item(
        &self,
        product_id: &ProductId,
        size: &Size,
        quantity: u32,
    ) -> impl Future<Output = Result<Vec<CartLine>, ApiError>> + Send;

    /// Set the quantity of a (product, size) pair; returns the updated cart.
    fn update_cart_item(
        &self,
        product_id: &ProductId,
        size: &Size,
        quantity: u32,
    ) -> impl Future<Output = Result<Vec<CartLine>, ApiError>> + Send;

    /// Remove a (product, size) pair; returns the updated cart.
    fn remove_cart_item(
        &self,
        product_id: &ProductId,
        size: &Size,
    ) -> impl Future<Output = Result<Vec<CartLine>, ApiError>> + Send;

    /// Empty the cart; returns the (empty) authoritative cart.
    fn clear_cart(&self) -> impl Future<Output = Result<Vec<CartLine>, ApiError>> + Send;
}

impl<T: CartTransport> CartTransport for Arc<T> {
    async fn fetch_cart(&self) -> Result<Vec<CartLine>, ApiError> {
        (**self).fetch_cart().await
    }

    async fn add_cart_item(
        &self,
        product_id: &ProductId,
        size: &Size,
        quantity: u32,
    ) -> Result<Vec<CartLine>, ApiError> {
        (**self).add_cart_item(product_id, size, quantity).await
    }

    async fn update_cart_item(
        &self,
        product_id: &ProductId,
        size: &Size,
        quantity: u32,
    ) -> Result<Vec<CartLine>, ApiError> {
        (**self).update_cart_item(product_id, size, quantity).await
    }

    async fn remove_cart_item(
        &self,
        product_id: &ProductId,
        size: &Size,
    ) -> Result<Vec<CartLine>, ApiError> {
        (**self).remove_cart_item(product_id, size).await
    }

    async fn clear_cart(&self) -> Result<Vec<CartLine>, ApiError> {
        (**self).clear_cart().await
    }
}

/// Body for `POST /cart/add` and `PUT /cart/update`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartItemBody<'a> {
    product_id: &'a ProductId,
    size: &'a Size,
    quantity: u32,
}

/// Body for `DELETE /cart/remove`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CartKeyBody<'a> {
    product_id: &'a ProductId,
    size: &'a Size,
}

impl CartTransport for ApiClient {
    #[instrument(skip(self))]
    async fn fetch_cart(&self) -> Result<Vec<CartLine>, ApiError> {
        self.get_data("cart").await
    }

    #[instrument(skip(self), fields(product_id = %product_id, size = %size))]
    async fn add_cart_item(
        &self,
        product_id: &ProductId,
        size: &Size,
        quantity: u32,
    ) -> Result<Vec<CartLine>, ApiError> {
        self.send_data(
            Method::POST,
            "cart/add",
            &CartItemBody {
                product_id,
                size,
                quantity,
            },
        )
        .await
    }

    #[instrument(skip(self), fields(product_id = %product_id, size = %size))]
    async fn update_cart_item(
        &self,
        product_id: &ProductId,
        size: &Size,
        quantity: u32,
    ) -> Result<Vec<CartLine>, ApiError> {
        self.send_data(
            Method::PUT,
            "cart/update",
            &CartItemBody {
                product_id,
                size,
                quantity,
            },
        )
        .await
    }

    #[instrument(skip(self), fields(product_id = %product_id, size = %size))]
    async fn remove_cart_item(
        &self,
        product_id: &ProductId,
        size: &Size,
    ) -> Result<Vec<CartLine>, ApiError> {
        self.send_data(
            Method::DELETE,
            "cart/remove",
            &CartKeyBody { product_id, size },
        )
        .await
    }

    #[instrument(skip(self))]
    async fn clear_cart(&self) -> Result<Vec<CartLine>, ApiError> {
        self.request_data(Method::DELETE, "cart/clear").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_item_body_wire_form() {
        let product_id = ProductId::new("66f0a1b2c3d4e5f601234567");
        let size = Size::Numeric(9);
        let body = CartItemBody {
            product_id: &product_id,
            size: &size,
            quantity: 2,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "productId": "66f0a1b2c3d4e5f601234567",
                "size": 9,
                "quantity": 2
            })
        );
    }

    #[test]
    fn test_cart_key_body_wire_form() {
        let product_id = ProductId::new("p1");
        let size = Size::Label("XL".to_owned());
        let body = CartKeyBody {
            product_id: &product_id,
            size: &size,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json, serde_json::json!({"productId": "p1", "size": "XL"}));
    }
}
