//! # Wishlist State
//!
//! Session-scoped favorites. Not persisted.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use bazaar_core::{Product, Wishlist};

#[derive(Default)]
pub struct WishlistState {
    wishlist: Mutex<Wishlist>,
}

impl WishlistState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Wishlist> {
        self.wishlist.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn with_wishlist<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Wishlist) -> R,
    {
        f(&self.lock())
    }

    pub fn add(&self, product: &Product) -> bool {
        self.lock().add(product)
    }

    pub fn remove(&self, product_id: i64) -> bool {
        self.lock().remove(product_id)
    }

    /// Returns whether the product is favorited afterwards.
    pub fn toggle(&self, product: &Product) -> bool {
        let favorited = self.lock().toggle(product);
        debug!(product_id = product.id, favorited, "Wishlist toggled");
        favorited
    }

    pub fn contains(&self, product_id: i64) -> bool {
        self.lock().contains(product_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::product;

    #[test]
    fn test_toggle_twice_restores_state() {
        let state = WishlistState::new();
        let p = product(7, 100);

        assert!(state.toggle(&p));
        assert!(state.contains(7));
        assert!(!state.toggle(&p));
        assert!(!state.contains(7));
        assert_eq!(state.with_wishlist(|w| w.len()), 0);
    }
}
