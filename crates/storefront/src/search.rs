//! Debounced product search.
//!
//! The search box fires on every keystroke; the debouncer waits a fixed
//! 300 ms and cancels the pending request whenever the input changes inside
//! the window, so only the query the user settled on reaches the network.
//! This is the only explicit timing/cancellation contract in the client.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, instrument};

/// Delay between the last keystroke and the search call.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// Queries shorter than this are dropped without a network call.
pub const MIN_QUERY_LEN: usize = 2;

/// Debouncer for the product search box.
///
/// ```rust,ignore
/// let mut search = DebouncedSearch::new();
/// search.submit("peg", {
///     let api = api.clone();
///     let tx = results_tx.clone();
///     move |query| async move {
///         if let Ok(products) = api.search_products(&query, 8).await {
///             let _ = tx.send(products);
///         }
///     }
/// });
/// ```
pub struct DebouncedSearch {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl DebouncedSearch {
    /// Create a debouncer with the standard 300 ms delay.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_delay(SEARCH_DEBOUNCE)
    }

    /// Create a debouncer with a custom delay.
    #[must_use]
    pub const fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    /// Submit a new query, cancelling any pending one.
    ///
    /// After the debounce window passes undisturbed, `search` runs with the
    /// trimmed query. Queries shorter than [`MIN_QUERY_LEN`] only cancel;
    /// they never reach `search`.
    #[instrument(skip(self, query, search))]
    pub fn submit<F, Fut>(&mut self, query: &str, search: F)
    where
        F: FnOnce(String) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let query = query.trim().to_owned();
        if query.chars().count() < MIN_QUERY_LEN {
            debug!("Query below minimum length, not scheduling search");
            return;
        }

        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            search(query).await;
        }));
    }

    /// Cancel the pending search, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

impl Default for DebouncedSearch {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for DebouncedSearch {
    fn drop(&mut self) {
        self.cancel();
    }
}
