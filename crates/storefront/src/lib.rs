//! Stride headless storefront client.
//!
//! This crate is the browser-side half of the Stride shop without the browser:
//! everything the storefront views talk to - the API gateway, the
//! session/identity provider, and the cart store - as a library that any view
//! layer can sit on top of.
//!
//! # Architecture
//!
//! - [`api::ApiClient`] - single HTTP gateway to the backend REST API; attaches
//!   the bearer token when the session holds one, caches catalog reads via
//!   `moka` (5 minute TTL)
//! - [`session::SessionProvider`] - tracks whether a user is authenticated and
//!   persists the bearer token
//! - [`cart::CartStore`] - the dual-backend cart: server-of-record when
//!   authenticated, session-storage-of-record when anonymous
//! - [`search::DebouncedSearch`] - the 300 ms debounce in front of product
//!   search
//!
//! # Example
//!
//! ```rust,ignore
//! use stride_storefront::api::ApiClient;
//! use stride_storefront::cart::CartStore;
//! use stride_storefront::config::StorefrontConfig;
//! use stride_storefront::session::SessionProvider;
//! use stride_storefront::storage::MemoryStorage;
//! use std::sync::Arc;
//!
//! let config = StorefrontConfig::from_env()?;
//! let storage = Arc::new(MemoryStorage::new());
//! let api = ApiClient::new(&config, Arc::clone(&storage) as _)?;
//!
//! let mut session = SessionProvider::new(api.clone(), Arc::clone(&storage) as _);
//! session.initialize().await;
//!
//! let mut cart = CartStore::new(api.clone(), Arc::clone(&storage) as _);
//! cart.initialize(session.identity()).await;
//!
//! let product = api.get_product(&product_id).await?;
//! cart.add_item(product, 9.into(), 1).await;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod config;
pub mod search;
pub mod session;
pub mod storage;
pub mod types;
