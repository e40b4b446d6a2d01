//! # Wishlist
//!
//! Favorited products. At most one entry per product id.
//!
//! Toggling a product off and straight back on restores the same entry:
//! its original `added_at` and its position in the list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::Product;

/// A favorited product with the time it was favorited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistEntry {
    pub product: Product,
    pub added_at: DateTime<Utc>,
}

/// Ordered set of favorited products, newest last.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Wishlist {
    entries: Vec<WishlistEntry>,
    /// Entry most recently toggled off, with its former index.
    #[serde(skip)]
    toggled_off: Option<(usize, WishlistEntry)>,
}

impl Wishlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a product. Returns false if it was already present.
    pub fn add(&mut self, product: &Product) -> bool {
        self.toggled_off = None;
        self.push(product)
    }

    fn push(&mut self, product: &Product) -> bool {
        if self.contains(product.id) {
            return false;
        }
        self.entries.push(WishlistEntry {
            product: product.clone(),
            added_at: Utc::now(),
        });
        true
    }

    /// Removes a product. Returns false if it was not present.
    pub fn remove(&mut self, product_id: i64) -> bool {
        self.toggled_off = None;
        self.take(product_id).is_some()
    }

    fn take(&mut self, product_id: i64) -> Option<(usize, WishlistEntry)> {
        let index = self
            .entries
            .iter()
            .position(|e| e.product.id == product_id)?;
        Some((index, self.entries.remove(index)))
    }

    /// Adds the product if absent, removes it if present.
    ///
    /// Returns whether the product is favorited afterwards.
    pub fn toggle(&mut self, product: &Product) -> bool {
        if let Some(removed) = self.take(product.id) {
            self.toggled_off = Some(removed);
            return false;
        }

        match self.toggled_off.take() {
            Some((index, entry)) if entry.product.id == product.id => {
                let index = index.min(self.entries.len());
                self.entries.insert(index, entry);
                true
            }
            _ => self.push(product),
        }
    }

    pub fn contains(&self, product_id: i64) -> bool {
        self.entries.iter().any(|e| e.product.id == product_id)
    }

    pub fn entries(&self) -> &[WishlistEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.toggled_off = None;
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::product;

    #[test]
    fn test_add_is_unique_by_product_id() {
        let mut wishlist = Wishlist::new();
        assert!(wishlist.add(&product(1, 100)));
        assert!(!wishlist.add(&product(1, 100)));
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_double_toggle_restores_original_state() {
        let mut wishlist = Wishlist::new();
        wishlist.add(&product(1, 100));
        let original = wishlist.clone();

        // Present → absent → present
        assert!(!wishlist.toggle(&product(1, 100)));
        assert!(wishlist.toggle(&product(1, 100)));
        assert_eq!(wishlist, original);

        // Absent → present → absent
        assert!(wishlist.toggle(&product(2, 100)));
        assert!(!wishlist.toggle(&product(2, 100)));
        assert!(!wishlist.contains(2));
        assert_eq!(wishlist.len(), 1);
    }

    #[test]
    fn test_toggle_back_keeps_entry_and_position() {
        let mut wishlist = Wishlist::new();
        for id in 1..=3 {
            wishlist.add(&product(id, 100));
        }
        let original = wishlist.clone();

        assert!(!wishlist.toggle(&product(2, 100)));
        assert_eq!(wishlist.len(), 2);
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(wishlist.toggle(&product(2, 100)));

        assert_eq!(wishlist.entries(), original.entries());

        // An explicit remove forgets the entry; adding back appends it fresh
        wishlist.remove(1);
        assert!(wishlist.toggle(&product(1, 100)));
        let ids: Vec<i64> = wishlist.entries().iter().map(|e| e.product.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!(wishlist.entries()[2].added_at > original.entries()[0].added_at);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut wishlist = Wishlist::new();
        assert!(!wishlist.remove(7));
        assert!(wishlist.is_empty());
    }
}
