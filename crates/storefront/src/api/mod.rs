//! HTTP gateway to the backend REST API.
//!
//! # Architecture
//!
//! - One [`ApiClient`] owns the `reqwest::Client`, the base URL, and a handle
//!   to session storage for the bearer token
//! - The backend is source of truth - no local sync, direct API calls
//! - Catalog reads are cached in-memory via `moka` (5 minute TTL); cart and
//!   order endpoints are never cached
//! - JSON throughout; most endpoints wrap their payload in a
//!   `{ "data": ... }` envelope
//!
//! # Example
//!
//! ```rust,ignore
//! use stride_storefront::api::ApiClient;
//!
//! let api = ApiClient::new(&config, storage)?;
//!
//! // Get a product
//! let product = api.get_product(&product_id).await?;
//!
//! // Server-side cart for the authenticated session
//! let cart = api.add_cart_item(&product.id, &size, 1).await?;
//! ```

mod cache;

pub mod admin;
pub mod auth;
pub mod cart;
pub mod payment;
pub mod products;
pub mod reviews;

pub use auth::AuthTransport;
pub use cart::CartTransport;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use reqwest::{Method, StatusCode, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::StorefrontConfig;
use crate::storage::{SharedStorage, keys};

use cache::CacheValue;

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connection, timeout, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Request path could not be joined onto the base URL.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Missing or rejected credentials.
    #[error("Unauthorized")]
    Unauthorized,

    /// Authenticated but not allowed, e.g. a non-admin on an admin endpoint.
    /// Distinct from [`Self::Unauthorized`]: the token is valid, the caller
    /// just lacks the permission, so nothing should throw the token away.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Rate limited by the backend.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success status.
    #[error("Server error ({status}): {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body, if any.
        message: String,
    },
}

impl ApiError {
    /// Map a non-success HTTP status to the matching error variant.
    fn from_status(status: StatusCode, message: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => Self::Unauthorized,
            StatusCode::FORBIDDEN => Self::Forbidden(message),
            StatusCode::NOT_FOUND => Self::NotFound(message),
            _ => Self::Status {
                status: status.as_u16(),
                message,
            },
        }
    }
}

/// The backend's standard response envelope.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: T,
    #[serde(default)]
    #[allow(dead_code)]
    message: Option<String>,
}

/// Error payload the backend returns on non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the backend REST API.
///
/// Attaches `Authorization: Bearer <token>` to every request while the
/// session storage holds a token; the token is read per request, so login and
/// logout take effect immediately without rebuilding the client.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    storage: SharedStorage,
    cache: Cache<String, CacheValue>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &StorefrontConfig, storage: SharedStorage) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        // Paths are joined relative to the base; a missing trailing slash
        // would silently drop the last path segment
        let mut base_url = config.api_base_url.clone();
        if !base_url.path().ends_with('/') {
            base_url.set_path(&format!("{}/", base_url.path()));
        }

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url,
                storage,
                cache,
            }),
        })
    }

    /// Build a request for `path` relative to the base URL, attaching the
    /// bearer token when the session holds one.
    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, ApiError> {
        let url = self.inner.base_url.join(path)?;
        let mut builder = self
            .inner
            .client
            .request(method, url)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = self.inner.storage.get(keys::TOKEN) {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        Ok(builder)
    }

    /// Execute a request and decode the JSON response body.
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response_text = self.execute_raw(builder).await?;

        match serde_json::from_str(&response_text) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %response_text.chars().take(500).collect::<String>(),
                    "Failed to parse backend API response"
                );
                Err(ApiError::Parse(e))
            }
        }
    }

    /// Execute a request, mapping non-success statuses to errors and
    /// returning the raw body text.
    async fn execute_raw(&self, builder: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(ApiError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let response_text = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&response_text)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| response_text.chars().take(200).collect());

            tracing::error!(
                status = %status,
                message = %message,
                "Backend API returned non-success status"
            );

            return Err(ApiError::from_status(status, message));
        }

        Ok(response_text)
    }

    /// Send a bodyless request and unwrap the `{ "data": ... }` envelope.
    pub(crate) async fn request_data<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
    ) -> Result<T, ApiError> {
        let envelope: Envelope<T> = self.execute(self.request(method, path)?).await?;
        Ok(envelope.data)
    }

    /// GET `path` and unwrap the `{ "data": ... }` envelope.
    pub(crate) async fn get_data<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.request_data(Method::GET, path).await
    }

    /// GET `path` with query parameters and unwrap the envelope.
    pub(crate) async fn get_data_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let builder = self.request(Method::GET, path)?.query(query);
        let envelope: Envelope<T> = self.execute(builder).await?;
        Ok(envelope.data)
    }

    /// Send a JSON body and unwrap the `{ "data": ... }` envelope.
    pub(crate) async fn send_data<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, ApiError> {
        let builder = self.request(method, path)?.json(body);
        let envelope: Envelope<T> = self.execute(builder).await?;
        Ok(envelope.data)
    }

    /// Send a JSON body and decode the bare response (no envelope).
    pub(crate) async fn send_bare<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<T, ApiError> {
        let builder = self.request(method, path)?.json(body);
        self.execute(builder).await
    }

    /// Send a bodyless request, ignoring the response payload.
    pub(crate) async fn send_unit(&self, method: Method, path: &str) -> Result<(), ApiError> {
        self.execute_raw(self.request(method, path)?).await?;
        Ok(())
    }

    /// Send a JSON body, ignoring the response payload.
    pub(crate) async fn send_unit_with_body(
        &self,
        method: Method,
        path: &str,
        body: &impl serde::Serialize,
    ) -> Result<(), ApiError> {
        self.execute_raw(self.request(method, path)?.json(body))
            .await?;
        Ok(())
    }

    /// Access the catalog cache (used by the product methods).
    pub(crate) fn cache(&self) -> &Cache<String, CacheValue> {
        &self.inner.cache
    }

    /// Invalidate all cached catalog data.
    pub async fn invalidate_all(&self) {
        self.inner.cache.invalidate_all();
        self.inner.cache.run_pending_tasks().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::NotFound("product 66f0".to_owned());
        assert_eq!(err.to_string(), "Not found: product 66f0");

        let err = ApiError::RateLimited(30);
        assert_eq!(err.to_string(), "Rate limited, retry after 30 seconds");

        let err = ApiError::Status {
            status: 500,
            message: "boom".to_owned(),
        };
        assert_eq!(err.to_string(), "Server error (500): boom");
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            ApiError::from_status(StatusCode::UNAUTHORIZED, "no token".to_owned()),
            ApiError::Unauthorized
        ));
        // A 403 is a permission problem, not a credential problem
        assert!(matches!(
            ApiError::from_status(StatusCode::FORBIDDEN, "admins only".to_owned()),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::NOT_FOUND, "gone".to_owned()),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            ApiError::from_status(StatusCode::IM_A_TEAPOT, "short and stout".to_owned()),
            ApiError::Status { status: 418, .. }
        ));
    }

    #[test]
    fn test_envelope_decodes() {
        let envelope: Envelope<Vec<u32>> =
            serde_json::from_str(r#"{"data": [1, 2, 3], "message": "ok"}"#).expect("envelope");
        assert_eq!(envelope.data, vec![1, 2, 3]);
    }

    #[test]
    fn test_error_body_tolerates_missing_message() {
        let body: ErrorBody = serde_json::from_str("{}").expect("error body");
        assert!(body.message.is_none());
    }
}
