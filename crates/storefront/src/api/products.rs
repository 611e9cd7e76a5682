//! Product catalog endpoints.
//!
//! Read paths are cached (5 minute TTL); the admin mutations invalidate the
//! affected entries so the back-office sees its own writes.

use reqwest::Method;
use tracing::{debug, instrument};

use stride_core::ProductId;

use super::cache::CacheValue;
use super::{ApiClient, ApiError};
use crate::types::{Product, ProductFilters, ProductInput};

const DEFAULT_LIST_KEY: &str = "products:default";
const FEATURED_KEY: &str = "products:featured";

impl ApiClient {
    /// Get a paginated, filtered product listing.
    ///
    /// Only the unfiltered default listing is cached; any filter or search
    /// term goes straight to the network.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, filters))]
    pub async fn list_products(&self, filters: &ProductFilters) -> Result<Vec<Product>, ApiError> {
        if filters.is_empty()
            && let Some(CacheValue::Products(products)) = self.cache().get(DEFAULT_LIST_KEY).await
        {
            debug!("Cache hit for default product listing");
            return Ok(products);
        }

        let products: Vec<Product> = self
            .get_data_with_query("products", &filters.to_query())
            .await?;

        if filters.is_empty() {
            self.cache()
                .insert(
                    DEFAULT_LIST_KEY.to_owned(),
                    CacheValue::Products(products.clone()),
                )
                .await;
        }

        Ok(products)
    }

    /// Get the featured products for the home page.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn featured_products(&self) -> Result<Vec<Product>, ApiError> {
        if let Some(CacheValue::Products(products)) = self.cache().get(FEATURED_KEY).await {
            debug!("Cache hit for featured products");
            return Ok(products);
        }

        let products: Vec<Product> = self.get_data("products/featured").await?;

        self.cache()
            .insert(
                FEATURED_KEY.to_owned(),
                CacheValue::Products(products.clone()),
            )
            .await;

        Ok(products)
    }

    /// Get a single product by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found or the API request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn get_product(&self, product_id: &ProductId) -> Result<Product, ApiError> {
        let cache_key = format!("product:{product_id}");

        if let Some(CacheValue::Product(product)) = self.cache().get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get_data(&format!("products/{product_id}")).await?;

        self.cache()
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Search products by free-text query.
    ///
    /// Not cached: queries are high-cardinality and the debouncer in front of
    /// this already limits call volume.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(query = %query))]
    pub async fn search_products(
        &self,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Product>, ApiError> {
        self.get_data_with_query(
            "products/search",
            &[("q", query.to_owned()), ("limit", limit.to_string())],
        )
        .await
    }

    // =========================================================================
    // Admin catalog mutations
    // =========================================================================

    /// Create a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip(self, input))]
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product, ApiError> {
        let product: Product = self.send_data(Method::POST, "products", input).await?;
        self.invalidate_listings().await;
        Ok(product)
    }

    /// Update a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip(self, input), fields(product_id = %product_id))]
    pub async fn update_product(
        &self,
        product_id: &ProductId,
        input: &ProductInput,
    ) -> Result<Product, ApiError> {
        let product: Product = self
            .send_data(Method::PUT, &format!("products/{product_id}"), input)
            .await?;
        self.invalidate_product(product_id).await;
        Ok(product)
    }

    /// Delete a product (admin only).
    ///
    /// # Errors
    ///
    /// Returns an error if the caller is not an admin or the request fails.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn delete_product(&self, product_id: &ProductId) -> Result<(), ApiError> {
        self.send_unit(Method::DELETE, &format!("products/{product_id}"))
            .await?;
        self.invalidate_product(product_id).await;
        Ok(())
    }

    /// Invalidate a cached product and the listings that may contain it.
    pub async fn invalidate_product(&self, product_id: &ProductId) {
        self.cache().invalidate(&format!("product:{product_id}")).await;
        self.invalidate_listings().await;
    }

    async fn invalidate_listings(&self) {
        self.cache().invalidate(DEFAULT_LIST_KEY).await;
        self.cache().invalidate(FEATURED_KEY).await;
    }
}
