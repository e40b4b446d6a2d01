//! # Product Feed
//!
//! Paged product list for the home screen, published as a
//! `UiState<ProductPage>`.
//!
//! ```text
//! Idle ──refresh()──► Loading ──ok──► Success(page)
//!                        │                 │ load_more(): append next page
//!                        └──err──► Failure(message)
//! ```

use tokio::sync::watch;
use tracing::{debug, warn};

use bazaar_core::{ProductPage, UiState};
use bazaar_remote::ProductCatalog;

use crate::error::{ApiError, ApiResult};

pub struct ProductFeed {
    state: watch::Sender<UiState<ProductPage>>,
    page_size: u64,
}

impl ProductFeed {
    pub fn new(page_size: u64) -> Self {
        ProductFeed {
            state: watch::channel(UiState::Idle).0,
            page_size,
        }
    }

    pub fn current(&self) -> UiState<ProductPage> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState<ProductPage>> {
        self.state.subscribe()
    }

    /// Reloads the first page. Failures end up in the published state.
    pub async fn refresh(&self, catalog: &dyn ProductCatalog) -> UiState<ProductPage> {
        self.state.send_replace(UiState::Loading);

        let result = catalog
            .list_products(self.page_size, 0)
            .await
            .map_err(ApiError::from);
        let next = UiState::from_result(result);

        self.state.send_replace(next.clone());
        next
    }

    /// Appends the next page to a loaded feed.
    ///
    /// Returns `Ok(false)` when there is nothing more to load. On error the
    /// already loaded products stay published.
    pub async fn load_more(&self, catalog: &dyn ProductCatalog) -> ApiResult<bool> {
        let skip = match &*self.state.borrow() {
            UiState::Success(page) if page.has_more() => page.next_skip(),
            _ => return Ok(false),
        };

        let next = catalog
            .list_products(self.page_size, skip)
            .await
            .map_err(|e| {
                warn!(skip, "Failed to load next catalog page");
                ApiError::from(e)
            })?;

        debug!(skip, received = next.products.len(), "Appending catalog page");
        self.state.send_modify(|state| {
            if let UiState::Success(page) = state {
                page.products.extend(next.products);
                page.total = next.total;
            }
        });
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::FakeCatalog;
    use bazaar_remote::TIMEOUT_MESSAGE;

    #[tokio::test]
    async fn test_refresh_and_load_more() {
        let catalog = FakeCatalog::with_products(5);
        let feed = ProductFeed::new(2);
        assert_eq!(feed.current(), UiState::Idle);

        let state = feed.refresh(&catalog).await;
        assert_eq!(state.data().unwrap().products.len(), 2);

        assert!(feed.load_more(&catalog).await.unwrap());
        assert!(feed.load_more(&catalog).await.unwrap());
        assert!(!feed.load_more(&catalog).await.unwrap());

        let ids: Vec<i64> = feed
            .current()
            .data()
            .unwrap()
            .products
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_timeout_becomes_failure_message() {
        let catalog = FakeCatalog::with_products(3);
        catalog.fail_with_timeout();
        let feed = ProductFeed::new(10);

        let state = feed.refresh(&catalog).await;
        assert_eq!(state.error_message(), Some(TIMEOUT_MESSAGE));
        assert_eq!(feed.current(), state);
    }
}
