//! Payment and order endpoints.
//!
//! Checkout is a three-step dance: create a payment intent here, hand the
//! client secret to the processor's hosted element for tokenization (outside
//! this crate), then create the order with the confirmed intent ID.

use reqwest::Method;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use stride_core::{OrderId, OrderNumber, OrderStatus};

use super::{ApiClient, ApiError};
use crate::types::{CreateOrderRequest, Order, PaymentIntent};

#[derive(Debug, Serialize)]
struct CreateIntentBody {
    #[serde(with = "rust_decimal::serde::float")]
    amount: Decimal,
}

#[derive(Debug, Serialize)]
struct UpdateStatusBody {
    status: OrderStatus,
}

impl ApiClient {
    /// Create a payment intent for the given charge amount.
    ///
    /// The amount is the checkout total (subtotal + shipping + tax); the
    /// backend recomputes and verifies it before talking to the processor.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn create_payment_intent(&self, amount: Decimal) -> Result<PaymentIntent, ApiError> {
        self.send_bare(
            Method::POST,
            "payment/create-payment-intent",
            &CreateIntentBody { amount },
        )
        .await
    }

    /// Create an order after the payment intent has been confirmed.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, request), fields(payment_intent = %request.payment_intent_id))]
    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<Order, ApiError> {
        self.send_data(Method::POST, "payment/create-order", request)
            .await
    }

    /// List the current user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_data("payment/my-orders").await
    }

    /// Look up one of the current user's orders by its order number.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the order does not exist or belongs
    /// to another user.
    #[instrument(skip(self), fields(order_number = %order_number))]
    pub async fn get_order(&self, order_number: &OrderNumber) -> Result<Order, ApiError> {
        self.get_data(&format!("payment/order/{order_number}")).await
    }

    /// Cancel one of the current user's orders.
    ///
    /// Only orders still in `processing` can be cancelled; the backend
    /// rejects anything later.
    ///
    /// # Errors
    ///
    /// Returns an error if the order is past cancellation or the request
    /// fails.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn cancel_order(&self, order_id: &OrderId) -> Result<Order, ApiError> {
        self.send_data(
            Method::PUT,
            &format!("payment/order/{order_id}/cancel"),
            &serde_json::json!({}),
        )
        .await
    }

    // =========================================================================
    // Admin order management
    // =========================================================================

    /// List all orders (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip(self))]
    pub async fn admin_orders(&self) -> Result<Vec<Order>, ApiError> {
        self.get_data("payment/admin/orders").await
    }

    /// Update an order's fulfillment status (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip(self), fields(order_id = %order_id, status = ?status))]
    pub async fn update_order_status(
        &self,
        order_id: &OrderId,
        status: OrderStatus,
    ) -> Result<Order, ApiError> {
        self.send_data(
            Method::PUT,
            &format!("payment/admin/orders/{order_id}/status"),
            &UpdateStatusBody { status },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_intent_body_is_numeric() {
        let body = CreateIntentBody {
            amount: Decimal::new(142945, 3),
        };
        let json = serde_json::to_value(&body).expect("serialize");
        // The processor wants a JSON number, not a decimal string
        assert_eq!(json, serde_json::json!({"amount": 142.945}));
    }

    #[test]
    fn test_payment_intent_decodes() {
        let intent: PaymentIntent =
            serde_json::from_str(r#"{"clientSecret": "pi_123_secret_456"}"#).expect("intent");
        assert_eq!(intent.client_secret, "pi_123_secret_456");
    }

    #[test]
    fn test_update_status_body_wire_form() {
        let body = UpdateStatusBody {
            status: OrderStatus::Shipped,
        };
        let json = serde_json::to_value(&body).expect("serialize");
        assert_eq!(json, serde_json::json!({"status": "shipped"}));
    }
}
