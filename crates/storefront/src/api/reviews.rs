//! Product review endpoints.

use reqwest::Method;
use tracing::instrument;

use stride_core::{ProductId, ReviewId};

use super::{ApiClient, ApiError};
use crate::types::{CanReview, HelpfulStatus, NewReview, Review};

impl ApiClient {
    /// List reviews for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product_reviews(&self, product_id: &ProductId) -> Result<Vec<Review>, ApiError> {
        self.get_data(&format!("reviews/product/{product_id}")).await
    }

    /// Check whether the current user may review a product.
    ///
    /// Only verified purchasers can review, and only once per product; the
    /// backend decides, this just asks.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn can_review(&self, product_id: &ProductId) -> Result<CanReview, ApiError> {
        self.get_data(&format!("reviews/can-review/{product_id}"))
            .await
    }

    /// Submit a review.
    ///
    /// # Errors
    ///
    /// Returns an error if the rating is rejected or the request fails.
    #[instrument(skip(self, review), fields(product_id = %review.product_id))]
    pub async fn submit_review(&self, review: &NewReview) -> Result<Review, ApiError> {
        self.send_data(Method::POST, "reviews", review).await
    }

    /// Check whether the current user has marked a review helpful.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(review_id = %review_id))]
    pub async fn helpful_status(&self, review_id: &ReviewId) -> Result<HelpfulStatus, ApiError> {
        self.get_data(&format!("reviews/{review_id}/helpful-status"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_review_wire_form() {
        let review = NewReview {
            product_id: ProductId::new("p1"),
            rating: 5,
            title: "Great shoe".to_owned(),
            comment: "Light and fast.".to_owned(),
        };
        let json = serde_json::to_value(&review).expect("serialize");
        assert_eq!(
            json,
            serde_json::json!({
                "productId": "p1",
                "rating": 5,
                "title": "Great shoe",
                "comment": "Light and fast."
            })
        );
    }

    #[test]
    fn test_review_decodes_backend_shape() {
        let review: Review = serde_json::from_value(serde_json::json!({
            "_id": "66f0bbbb0000000000000001",
            "product": "66f0a1b2c3d4e5f601234567",
            "user": {"_id": "66f0cccc0000000000000001", "name": "Ada"},
            "rating": 4,
            "title": "Solid",
            "comment": "Runs a half size small.",
            "helpfulCount": 3,
            "createdAt": "2026-08-01T09:30:00Z"
        }))
        .expect("review decodes");
        assert_eq!(review.rating, 4);
        assert_eq!(review.helpful_count, 3);
        assert_eq!(review.user.name, "Ada");
    }
}
