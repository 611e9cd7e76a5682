//! Wire types for the backend REST API.
//!
//! Field names mirror the backend's JSON exactly (camelCase, Mongo-style
//! `_id` keys). Prices travel as plain JSON numbers and are held as
//! `Decimal` so totals stay exact.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stride_core::{
    CurrencyCode, Email, OrderId, OrderNumber, OrderStatus, PaymentStatus, Price, ProductId,
    ReviewId, UserId,
};

// =============================================================================
// Catalog
// =============================================================================

/// A product as returned by the catalog endpoints.
///
/// Cart lines hold an owned copy of this snapshot; it can go stale against
/// the catalog, which is accepted (the backend re-prices at checkout).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<SizeStock>,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub num_reviews: u32,
}

impl Product {
    /// The unit price as a display-ready [`Price`].
    #[must_use]
    pub const fn unit_price(&self) -> Price {
        Price::new(self.price, CurrencyCode::USD)
    }
}

/// Stock level for one size of a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeStock {
    pub size: Size,
    pub stock: u32,
}

/// A product size variant key.
///
/// Shoe sizes are numeric (`9`, `10`) but apparel uses labels (`"M"`, `"XL"`),
/// so the wire form is either a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Size {
    Numeric(u32),
    Label(String),
}

impl core::fmt::Display for Size {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Numeric(n) => write!(f, "{n}"),
            Self::Label(s) => write!(f, "{s}"),
        }
    }
}

impl From<u32> for Size {
    fn from(n: u32) -> Self {
        Self::Numeric(n)
    }
}

impl From<&str> for Size {
    fn from(s: &str) -> Self {
        Self::Label(s.to_owned())
    }
}

/// Input for creating or updating a product (admin).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: String,
    pub brand: String,
    pub category: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub images: Vec<String>,
    pub sizes: Vec<SizeStock>,
    pub featured: bool,
}

/// Filters for the product list endpoint.
///
/// Maps one-to-one onto the endpoint's query parameters; empty filters mean
/// the unfiltered first page, which is the only cacheable variant.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilters {
    pub brand: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub size: Option<Size>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ProductFilters {
    /// Whether no filter is set (the default, cacheable listing).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Render as query parameters for the list endpoint.
    #[must_use]
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(brand) = &self.brand {
            params.push(("brand", brand.clone()));
        }
        if let Some(category) = &self.category {
            params.push(("category", category.to_lowercase()));
        }
        if let Some(min) = &self.min_price {
            params.push(("minPrice", min.to_string()));
        }
        if let Some(max) = &self.max_price {
            params.push(("maxPrice", max.to_string()));
        }
        if let Some(size) = &self.size {
            params.push(("size", size.to_string()));
        }
        if let Some(search) = &self.search {
            params.push(("search", search.clone()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One cart line: a (product, size) pair with a quantity.
///
/// Also the wire form for cart endpoints and the session-storage form of the
/// guest cart - the backend returns the same `{product, size, quantity}`
/// projection everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    /// Owned product snapshot, not a live catalog reference.
    pub product: Product,
    pub size: Size,
    pub quantity: u32,
}

impl CartLine {
    /// `unit price x quantity` for this line.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.product.unit_price().times(self.quantity)
    }

    /// Whether this line is for the given (product, size) pair.
    #[must_use]
    pub fn matches(&self, product_id: &ProductId, size: &Size) -> bool {
        self.product.id == *product_id && self.size == *size
    }
}

// =============================================================================
// Users
// =============================================================================

/// A user profile as returned by the profile and admin endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
    pub email: Email,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
}

/// Editable profile fields.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

// =============================================================================
// Reviews
// =============================================================================

/// A product review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: ReviewId,
    pub product: ProductId,
    pub user: ReviewAuthor,
    pub rating: u8,
    pub title: String,
    pub comment: String,
    #[serde(default)]
    pub helpful_count: u32,
    pub created_at: DateTime<Utc>,
}

/// The subset of user fields embedded in a review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewAuthor {
    #[serde(rename = "_id")]
    pub id: UserId,
    pub name: String,
}

/// Input for submitting a review.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    pub product_id: ProductId,
    /// 1 through 5 stars.
    pub rating: u8,
    pub title: String,
    pub comment: String,
}

/// Whether the current user may review a product (one review per purchase).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanReview {
    pub can_review: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

/// Whether the current user has marked a review helpful.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpfulStatus {
    pub marked_helpful: bool,
}

// =============================================================================
// Orders & checkout
// =============================================================================

/// An order as returned by the payment endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub order_number: OrderNumber,
    pub items: Vec<CartLine>,
    pub shipping_info: ShippingInfo,
    pub pricing: OrderPricing,
    pub order_status: OrderStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

/// Shipping details collected at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

/// The checkout price breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPricing {
    #[serde(with = "rust_decimal::serde::float")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub shipping: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub tax: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
}

impl OrderPricing {
    /// Order value above which shipping is free.
    pub const FREE_SHIPPING_THRESHOLD: Decimal = Decimal::from_parts(100, 0, 0, false, 0);
    /// Flat shipping charge below the threshold.
    pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(10, 0, 0, false, 0);
    /// Sales tax rate applied to the subtotal.
    pub const TAX_RATE: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

    /// Compute the checkout breakdown from a cart subtotal.
    ///
    /// Shipping is free over $100, otherwise a flat $10; tax is 10% of the
    /// subtotal. The backend recomputes this server-side; the client-side copy
    /// exists so checkout can show the charge before the payment intent is
    /// created.
    #[must_use]
    pub fn from_subtotal(subtotal: Decimal) -> Self {
        let shipping = if subtotal > Self::FREE_SHIPPING_THRESHOLD {
            Decimal::ZERO
        } else {
            Self::FLAT_SHIPPING
        };
        let tax = subtotal * Self::TAX_RATE;
        Self {
            subtotal,
            shipping,
            tax,
            total: subtotal + shipping + tax,
        }
    }
}

/// Request body for `POST /payment/create-order`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub items: Vec<CartLine>,
    pub shipping_info: ShippingInfo,
    pub pricing: OrderPricing,
    pub payment_intent_id: String,
}

/// Response from `POST /payment/create-payment-intent`.
///
/// The client secret is handed to the payment processor's hosted element; it
/// never goes through our backend again.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_product() -> Product {
        serde_json::from_value(serde_json::json!({
            "_id": "66f0a1b2c3d4e5f601234567",
            "name": "Air Zoom Pegasus",
            "brand": "Nike",
            "category": "running",
            "price": 129.95,
            "images": ["https://cdn.example.com/pegasus.jpg"],
            "sizes": [{"size": 9, "stock": 4}, {"size": 10, "stock": 0}],
            "featured": true
        }))
        .expect("sample product")
    }

    #[test]
    fn test_product_decodes_backend_shape() {
        let product = sample_product();
        assert_eq!(product.id.as_str(), "66f0a1b2c3d4e5f601234567");
        assert_eq!(product.price, Decimal::new(12995, 2));
        assert_eq!(product.sizes.len(), 2);
        assert_eq!(product.sizes[0].size, Size::Numeric(9));
        assert!(product.description.is_empty());
    }

    #[test]
    fn test_size_untagged_forms() {
        let numeric: Size = serde_json::from_str("9").expect("numeric size");
        assert_eq!(numeric, Size::Numeric(9));

        let label: Size = serde_json::from_str("\"XL\"").expect("label size");
        assert_eq!(label, Size::Label("XL".to_owned()));

        assert_eq!(serde_json::to_string(&numeric).expect("serialize"), "9");
    }

    #[test]
    fn test_cart_line_total() {
        let line = CartLine {
            product: sample_product(),
            size: 9.into(),
            quantity: 3,
        };
        assert_eq!(line.line_total().display(), "$389.85");
    }

    #[test]
    fn test_cart_line_matches() {
        let line = CartLine {
            product: sample_product(),
            size: 9.into(),
            quantity: 1,
        };
        let id = ProductId::new("66f0a1b2c3d4e5f601234567");
        assert!(line.matches(&id, &9.into()));
        assert!(!line.matches(&id, &10.into()));
        assert!(!line.matches(&ProductId::new("other"), &9.into()));
    }

    #[test]
    fn test_filters_to_query() {
        let filters = ProductFilters {
            brand: Some("Nike".to_owned()),
            category: Some("Running".to_owned()),
            max_price: Some(Decimal::new(150, 0)),
            size: Some(9.into()),
            ..ProductFilters::default()
        };
        let query = filters.to_query();
        assert!(query.contains(&("brand", "Nike".to_owned())));
        // Categories are lowercased before hitting the API
        assert!(query.contains(&("category", "running".to_owned())));
        assert!(query.contains(&("maxPrice", "150".to_owned())));
        assert!(query.contains(&("size", "9".to_owned())));
        assert!(!filters.is_empty());
        assert!(ProductFilters::default().is_empty());
    }

    #[test]
    fn test_pricing_flat_shipping_under_threshold() {
        let pricing = OrderPricing::from_subtotal(Decimal::new(80, 0));
        assert_eq!(pricing.shipping, Decimal::new(10, 0));
        assert_eq!(pricing.tax, Decimal::new(8, 0));
        assert_eq!(pricing.total, Decimal::new(98, 0));
    }

    #[test]
    fn test_pricing_free_shipping_over_threshold() {
        let pricing = OrderPricing::from_subtotal(Decimal::new(12995, 2));
        assert_eq!(pricing.shipping, Decimal::ZERO);
        assert_eq!(pricing.tax, Decimal::new(12995, 3));
        assert_eq!(pricing.total, Decimal::new(142945, 3));
    }

    #[test]
    fn test_pricing_threshold_is_exclusive() {
        // Exactly $100 still pays flat shipping
        let pricing = OrderPricing::from_subtotal(Decimal::new(100, 0));
        assert_eq!(pricing.shipping, Decimal::new(10, 0));
    }

    #[test]
    fn test_order_decodes_backend_shape() {
        let order: Order = serde_json::from_value(serde_json::json!({
            "_id": "66f0aaaa0000000000000001",
            "orderNumber": "ORD-20260830-0042",
            "items": [],
            "shippingInfo": {
                "firstName": "Ada", "lastName": "L", "email": "ada@example.com",
                "phone": "555-0100", "address": "1 Main St", "city": "Springfield",
                "state": "IL", "zipCode": "62701"
            },
            "pricing": {"subtotal": 129.95, "shipping": 0.0, "tax": 12.995, "total": 142.945},
            "orderStatus": "processing",
            "paymentStatus": "paid",
            "createdAt": "2026-08-30T12:00:00Z"
        }))
        .expect("order decodes");
        assert_eq!(order.order_number.as_str(), "ORD-20260830-0042");
        assert!(order.order_status.is_cancellable());
    }
}
