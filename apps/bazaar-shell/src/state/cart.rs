//! # Cart State
//!
//! Shared holder for the current shopping cart.
//!
//! ## Thread Safety
//! The cart sits behind a `Mutex` held only for one synchronous mutation.
//! Every mutation is mirrored to the cart cache while the lock is held, so
//! the cache sees operations in the same order the cart did.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart State Operations                                │
//! │                                                                         │
//! │  UI Action                Command                 Cache Mirror          │
//! │  ─────────                ───────                 ────────────          │
//! │                                                                         │
//! │  Add to cart ────────────► add_to_cart() ───────► upsert(line)         │
//! │                                                                         │
//! │  Change quantity ────────► update_cart_item() ──► upsert / remove      │
//! │                                                                         │
//! │  Remove ─────────────────► remove_from_cart() ──► remove(id)           │
//! │                                                                         │
//! │  Clear / order placed ───► clear_cart() ────────► clear()              │
//! │                                                                         │
//! │  App start ──────────────► CartState::restore() ◄── cart_items rows    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use bazaar_core::{Cart, CoreResult, Product};
use bazaar_db::{Database, DbResult};

use super::cart_cache::{CartCacheHandle, CartCacheWriter};

/// Thread-safe cart holder with an optional write-behind cache.
pub struct CartState {
    cart: Mutex<Cart>,
    cache: Option<CartCacheHandle>,
}

impl CartState {
    /// Creates an empty, uncached cart.
    pub fn new() -> Self {
        CartState {
            cart: Mutex::new(Cart::new()),
            cache: None,
        }
    }

    /// Wraps an existing cart and mirrors changes through `cache`.
    pub fn with_cache(cart: Cart, cache: CartCacheHandle) -> Self {
        CartState {
            cart: Mutex::new(cart),
            cache: Some(cache),
        }
    }

    /// Rebuilds the cart from the cache table and starts the cache writer.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn restore(db: &Database) -> DbResult<Self> {
        let lines = db.cart().load_all().await?;
        let cart = Cart::from_lines(lines);

        info!(
            lines = cart.line_count(),
            items = cart.item_count(),
            "Cart restored from cache"
        );

        Ok(Self::with_cache(cart, CartCacheWriter::spawn(db.cart())))
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Executes a function with read access to the cart.
    pub fn with_cart<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Cart) -> R,
    {
        f(&self.lock())
    }

    /// Adds `quantity` of `product`, merging into an existing line.
    pub fn add(
        &self,
        product: &Product,
        quantity: i64,
        selected_size: Option<String>,
        selected_color: Option<String>,
    ) -> CoreResult<()> {
        let mut cart = self.lock();
        cart.add(product, quantity, selected_size, selected_color)?;

        if let (Some(cache), Some(line)) = (&self.cache, cart.line(product.id)) {
            cache.upsert(line.clone());
        }
        debug!(product_id = product.id, quantity, "Added to cart");
        Ok(())
    }

    /// Removes a line. Absent ids are ignored.
    pub fn remove(&self, product_id: i64) -> bool {
        let mut cart = self.lock();
        let removed = cart.remove(product_id);

        if removed {
            if let Some(cache) = &self.cache {
                cache.remove(product_id);
            }
        }
        removed
    }

    /// Sets a line's quantity; zero or less removes it.
    pub fn update_quantity(&self, product_id: i64, quantity: i64) -> CoreResult<()> {
        let mut cart = self.lock();
        let existed = cart.contains(product_id);
        cart.update_quantity(product_id, quantity)?;

        if let Some(cache) = &self.cache {
            match cart.line(product_id) {
                Some(line) => cache.upsert(line.clone()),
                None if existed => cache.remove(product_id),
                None => {}
            }
        }
        Ok(())
    }

    pub fn clear(&self) {
        let mut cart = self.lock();
        cart.clear();

        if let Some(cache) = &self.cache {
            cache.clear();
        }
    }

    /// Waits for queued cache writes to land.
    pub async fn flush(&self) {
        if let Some(cache) = &self.cache {
            cache.flush().await;
        }
    }
}

impl Default for CartState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{memory_db, product};
    use bazaar_core::Money;

    #[test]
    fn test_uncached_cart() {
        let state = CartState::new();
        state.add(&product(1, 999), 2, None, None).unwrap();
        state.add(&product(1, 999), 3, None, None).unwrap();

        assert_eq!(state.with_cart(|c| c.line_count()), 1);
        assert_eq!(state.with_cart(|c| c.item_count()), 5);
        assert_eq!(state.with_cart(|c| c.total()), Money::from_cents(4995));

        assert!(!state.remove(42));
        state.update_quantity(1, 0).unwrap();
        assert!(state.with_cart(|c| c.is_empty()));
    }

    #[tokio::test]
    async fn test_mutations_survive_restore() {
        let db = memory_db().await;

        let state = CartState::restore(&db).await.unwrap();
        state
            .add(&product(1, 1000), 1, Some("M".into()), None)
            .unwrap();
        state.add(&product(2, 250), 4, None, None).unwrap();
        state.add(&product(3, 100), 1, None, None).unwrap();
        state.update_quantity(2, 2).unwrap();
        state.remove(3);
        state.flush().await;

        let restored = CartState::restore(&db).await.unwrap();
        restored.with_cart(|c| {
            assert_eq!(c.line_count(), 2);
            assert_eq!(c.line(1).unwrap().selected_size.as_deref(), Some("M"));
            assert_eq!(c.line(2).unwrap().quantity, 2);
            assert!(!c.contains(3));
            assert_eq!(c.total(), Money::from_cents(1500));
        });

        restored.clear();
        restored.flush().await;
        assert!(db.cart().load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_add_leaves_cache_untouched() {
        let db = memory_db().await;
        let state = CartState::restore(&db).await.unwrap();

        assert!(state.add(&product(1, 1000), 0, None, None).is_err());
        state.flush().await;
        assert!(db.cart().load_all().await.unwrap().is_empty());
    }
}
