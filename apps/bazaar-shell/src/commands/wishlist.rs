//! # Wishlist Commands

use serde::Serialize;
use tracing::debug;

use bazaar_core::{Product, WishlistEntry};

use crate::state::WishlistState;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistResponse {
    /// Whether the product acted on is favorited afterwards
    pub favorited: bool,
    pub entries: Vec<WishlistEntry>,
}

pub fn get_wishlist(wishlist: &WishlistState) -> Vec<WishlistEntry> {
    wishlist.with_wishlist(|w| w.entries().to_vec())
}

/// Flips the favorite flag for a product (the heart icon).
pub fn toggle_wishlist(wishlist: &WishlistState, product: &Product) -> WishlistResponse {
    debug!(product_id = product.id, "toggle_wishlist command");
    WishlistResponse {
        favorited: wishlist.toggle(product),
        entries: get_wishlist(wishlist),
    }
}

/// Adds a product. Adding a favorited product changes nothing.
pub fn add_to_wishlist(wishlist: &WishlistState, product: &Product) -> WishlistResponse {
    wishlist.add(product);
    WishlistResponse {
        favorited: true,
        entries: get_wishlist(wishlist),
    }
}

pub fn remove_from_wishlist(wishlist: &WishlistState, product_id: i64) -> WishlistResponse {
    wishlist.remove(product_id);
    WishlistResponse {
        favorited: false,
        entries: get_wishlist(wishlist),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::product;

    #[test]
    fn test_toggle_and_membership() {
        let wishlist = WishlistState::new();

        let response = toggle_wishlist(&wishlist, &product(1, 100));
        assert!(response.favorited);
        assert_eq!(response.entries.len(), 1);

        add_to_wishlist(&wishlist, &product(2, 100));
        let response = add_to_wishlist(&wishlist, &product(2, 100));
        assert_eq!(response.entries.len(), 2);

        let response = toggle_wishlist(&wishlist, &product(1, 100));
        assert!(!response.favorited);
        let ids: Vec<i64> = response.entries.iter().map(|e| e.product.id).collect();
        assert_eq!(ids, vec![2]);

        let response = remove_from_wishlist(&wishlist, 42);
        assert_eq!(response.entries.len(), 1);
    }
}
