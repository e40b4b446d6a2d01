//! # Checkout State
//!
//! Holds the checkout set chosen just before navigating to the checkout
//! screen. The most recent selection wins; nothing is validated against
//! the catalog or stock.
//!
//! ```text
//! product screen ── "Buy now" ──────► CheckoutSelection::BuyNow { line }
//! cart screen ───── "Place order" ──► CheckoutSelection::PlaceOrder { lines }
//!                                              │
//!                                              ▼
//!                                    checkout screen reads current()
//! ```

use std::sync::{Mutex, MutexGuard, PoisonError};

use tracing::debug;

use bazaar_core::CheckoutSelection;

#[derive(Default)]
pub struct CheckoutState {
    selection: Mutex<Option<CheckoutSelection>>,
}

impl CheckoutState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Option<CheckoutSelection>> {
        self.selection.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces any previous selection.
    pub fn set(&self, selection: CheckoutSelection) {
        debug!(mode = ?selection.mode(), lines = selection.lines().len(), "Checkout set");
        *self.lock() = Some(selection);
    }

    pub fn current(&self) -> Option<CheckoutSelection> {
        self.lock().clone()
    }

    /// Removes and returns the selection.
    pub fn take(&self) -> Option<CheckoutSelection> {
        self.lock().take()
    }

    pub fn clear(&self) {
        self.lock().take();
    }
}
