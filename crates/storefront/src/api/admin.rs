//! Back-office dashboard endpoints (admin only).

use chrono::{DateTime, Utc};
use reqwest::Method;
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use stride_core::UserId;

use super::{ApiClient, ApiError};
use crate::types::User;

/// Store-wide totals for the dashboard landing page.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: u64,
    pub total_products: u64,
    pub total_orders: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_revenue: Decimal,
}

/// One entry in the recent-activity feed.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityEntry {
    /// Activity kind, e.g. `"order"` or `"user"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub description: String,
    pub time: DateTime<Utc>,
}

/// Per-user purchase totals shown in the user detail drawer.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    pub order_count: u64,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_spent: Decimal,
}

impl ApiClient {
    /// Fetch store-wide dashboard totals.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip(self))]
    pub async fn admin_stats(&self) -> Result<AdminStats, ApiError> {
        self.get_data("admin/stats").await
    }

    /// Fetch the recent-activity feed.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip(self))]
    pub async fn recent_activity(&self) -> Result<Vec<ActivityEntry>, ApiError> {
        self.get_data("admin/recent-activity").await
    }

    /// List all users.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip(self))]
    pub async fn admin_users(&self) -> Result<Vec<User>, ApiError> {
        self.get_data("admin/users").await
    }

    /// Fetch purchase totals for one user.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn admin_user_stats(&self, user_id: &UserId) -> Result<UserStats, ApiError> {
        self.get_data(&format!("admin/users/{user_id}/stats")).await
    }

    /// Delete a user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn admin_delete_user(&self, user_id: &UserId) -> Result<(), ApiError> {
        self.send_unit(Method::DELETE, &format!("admin/users/{user_id}"))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_stats_decodes() {
        let stats: AdminStats = serde_json::from_value(serde_json::json!({
            "totalUsers": 120,
            "totalProducts": 42,
            "totalOrders": 310,
            "totalRevenue": 41875.50
        }))
        .expect("stats decode");
        assert_eq!(stats.total_orders, 310);
        assert_eq!(stats.total_revenue, Decimal::new(4187550, 2));
    }

    #[test]
    fn test_user_stats_decodes() {
        let stats: UserStats =
            serde_json::from_value(serde_json::json!({"orderCount": 3, "totalSpent": 389.85}))
                .expect("user stats decode");
        assert_eq!(stats.order_count, 3);
        assert_eq!(stats.total_spent, Decimal::new(38985, 2));
    }
}
