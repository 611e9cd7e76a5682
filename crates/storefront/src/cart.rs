//! The cart store: one cart, two backends.
//!
//! An authenticated session's cart lives on the server; the local copy is a
//! cached projection that gets wholesale-replaced by every server response
//! (write-through, never write-ahead). An anonymous session's cart lives
//! only in session storage and is persisted on every mutation.
//!
//! The mode is selected once per identity transition, not re-checked per
//! call. Switching from anonymous to authenticated *discards* the guest cart
//! and loads the server's - there is no merge. That mirrors the shipped
//! behavior; whether it is intended is an open product question, so do not
//! quietly change it here.
//!
//! # Failure semantics
//!
//! A failed server mutation is logged and swallowed: the store's state is
//! exactly what it was before the call, and the user can retry. Nothing in
//! here is fatal.
//!
//! # Concurrency
//!
//! Mutations are independent async tasks and are not serialized against each
//! other; two rapid increments race, and the last server response to resolve
//! wins. A per-session single-flight queue would close that hole if it ever
//! matters in practice.

use std::sync::Arc;

use tracing::{debug, error, instrument, warn};

use stride_core::{CurrencyCode, Price, ProductId};

use crate::api::CartTransport;
use crate::session::Identity;
use crate::storage::{KeyValueStorage, keys};
use crate::types::{CartLine, Product, Size};

/// Which backend owns the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CartMode {
    /// Server of record; local state is a cached projection.
    Synced,
    /// Session storage of record.
    #[default]
    Guest,
}

/// The cart store.
///
/// Generic over the server transport so the synced path can be tested
/// against an in-memory fake; production code uses
/// [`crate::api::ApiClient`].
pub struct CartStore<T: CartTransport> {
    transport: T,
    storage: Arc<dyn KeyValueStorage>,
    mode: CartMode,
    items: Vec<CartLine>,
    syncing: bool,
}

impl<T: CartTransport> CartStore<T> {
    /// Create an empty guest-mode cart.
    ///
    /// Call [`Self::initialize`] with the session's identity before use.
    #[must_use]
    pub const fn new(transport: T, storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            transport,
            storage,
            mode: CartMode::Guest,
            items: Vec::new(),
            syncing: false,
        }
    }

    /// Select the backend for the given identity and load the cart from it.
    ///
    /// Authenticated: fetch the server cart and replace local state with it,
    /// discarding any guest cart (server-of-record policy, not a sync). If
    /// the fetch fails the current state is left alone.
    ///
    /// Anonymous: restore the guest cart from session storage; absent or
    /// undecodable payloads mean an empty cart.
    #[instrument(skip(self, identity))]
    pub async fn initialize(&mut self, identity: &Identity) {
        if identity.is_authenticated() {
            self.mode = CartMode::Synced;
            self.syncing = true;
            match self.transport.fetch_cart().await {
                Ok(lines) => {
                    debug!(lines = lines.len(), "Loaded server cart");
                    self.items = lines;
                }
                Err(e) => error!("Failed to load cart: {e}"),
            }
            self.syncing = false;
        } else {
            self.mode = CartMode::Guest;
            self.items = self.load_guest_cart();
            debug!(lines = self.items.len(), "Restored guest cart");
        }
    }

    /// The cart lines, in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartLine] {
        &self.items
    }

    /// Which backend currently owns the cart.
    #[must_use]
    pub const fn mode(&self) -> CartMode {
        self.mode
    }

    /// Whether the initial server fetch is still in flight.
    #[must_use]
    pub const fn is_syncing(&self) -> bool {
        self.syncing
    }

    /// Add `quantity` of a (product, size) pair.
    ///
    /// At most one line exists per pair: adding an existing pair increments
    /// its quantity, it never creates a duplicate row.
    #[instrument(skip(self, product), fields(product_id = %product.id, size = %size))]
    pub async fn add_item(&mut self, product: Product, size: Size, quantity: u32) {
        if quantity == 0 {
            warn!("Ignoring add of zero quantity");
            return;
        }

        match self.mode {
            CartMode::Synced => {
                match self.transport.add_cart_item(&product.id, &size, quantity).await {
                    Ok(lines) => self.items = lines,
                    Err(e) => error!("Failed to add item to cart: {e}"),
                }
            }
            CartMode::Guest => {
                if let Some(line) = self
                    .items
                    .iter_mut()
                    .find(|line| line.matches(&product.id, &size))
                {
                    line.quantity += quantity;
                } else {
                    self.items.push(CartLine {
                        product,
                        size,
                        quantity,
                    });
                }
                self.persist_guest_cart();
            }
        }
    }

    /// Remove the line for a (product, size) pair, if present.
    #[instrument(skip(self), fields(product_id = %product_id, size = %size))]
    pub async fn remove_item(&mut self, product_id: &ProductId, size: &Size) {
        match self.mode {
            CartMode::Synced => match self.transport.remove_cart_item(product_id, size).await {
                Ok(lines) => self.items = lines,
                Err(e) => error!("Failed to remove item from cart: {e}"),
            },
            CartMode::Guest => {
                self.items.retain(|line| !line.matches(product_id, size));
                self.persist_guest_cart();
            }
        }
    }

    /// Set the quantity of a (product, size) pair.
    ///
    /// A quantity of zero removes the line instead.
    #[instrument(skip(self), fields(product_id = %product_id, size = %size))]
    pub async fn update_quantity(&mut self, product_id: &ProductId, size: &Size, quantity: u32) {
        if quantity == 0 {
            self.remove_item(product_id, size).await;
            return;
        }

        match self.mode {
            CartMode::Synced => {
                match self.transport.update_cart_item(product_id, size, quantity).await {
                    Ok(lines) => self.items = lines,
                    Err(e) => error!("Failed to update cart: {e}"),
                }
            }
            CartMode::Guest => {
                for line in &mut self.items {
                    if line.matches(product_id, size) {
                        line.quantity = quantity;
                    }
                }
                self.persist_guest_cart();
            }
        }
    }

    /// Empty the cart (explicit user action or successful checkout).
    #[instrument(skip(self))]
    pub async fn clear(&mut self) {
        match self.mode {
            CartMode::Synced => match self.transport.clear_cart().await {
                Ok(lines) => self.items = lines,
                Err(e) => error!("Failed to clear cart: {e}"),
            },
            CartMode::Guest => {
                self.items.clear();
                self.storage.remove(keys::GUEST_CART);
            }
        }
    }

    /// Sum of `unit price x quantity` over all lines.
    ///
    /// A display aid only; the actual charge is computed server-side at
    /// checkout.
    #[must_use]
    pub fn total(&self) -> Price {
        let amount = self
            .items
            .iter()
            .map(|line| line.product.price * rust_decimal::Decimal::from(line.quantity))
            .sum();
        Price::new(amount, CurrencyCode::USD)
    }

    /// Sum of quantities over all lines (the badge number).
    #[must_use]
    pub fn count(&self) -> u32 {
        self.items.iter().map(|line| line.quantity).sum()
    }

    // =========================================================================
    // Guest cart persistence
    // =========================================================================

    fn load_guest_cart(&self) -> Vec<CartLine> {
        self.storage
            .get(keys::GUEST_CART)
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(lines) => Some(lines),
                Err(e) => {
                    // Undecodable carts start over empty rather than erroring
                    warn!("Discarding undecodable guest cart: {e}");
                    None
                }
            })
            .unwrap_or_default()
    }

    fn persist_guest_cart(&self) {
        match serde_json::to_string(&self.items) {
            Ok(raw) => self.storage.set(keys::GUEST_CART, &raw),
            Err(e) => error!("Failed to encode guest cart: {e}"),
        }
    }
}
