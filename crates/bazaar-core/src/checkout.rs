//! # Checkout Selection
//!
//! The *checkout set*: the lines a single checkout flow will pay for.
//!
//! ## Entry Modes
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Product detail ── "Buy now" ──► BuyNow { line }       (cart untouched) │
//! │                                                                         │
//! │  Cart screen ── "Place order" ──► PlaceOrder { lines } (cart snapshot)  │
//! │                                                                         │
//! │                      │                                                  │
//! │                      ▼                                                  │
//! │              CheckoutSummary { subtotal, discounted_total, savings }    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No stock or existence check is made: the selection is whatever was set
//! last, and the checkout screen trusts it.

use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartLine};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;

/// Which entry mode produced a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutMode {
    BuyNow,
    PlaceOrder,
}

/// Lines chosen for one checkout flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CheckoutSelection {
    /// One product, quantity 1, bypassing the cart.
    BuyNow { line: CartLine },
    /// Snapshot of every cart line at the time the order was placed.
    PlaceOrder { lines: Vec<CartLine> },
}

impl CheckoutSelection {
    /// "Buy now" for a single product with the chosen variant.
    pub fn buy_now(
        product: &Product,
        selected_size: Option<String>,
        selected_color: Option<String>,
    ) -> Self {
        CheckoutSelection::BuyNow {
            line: CartLine::new(product, 1, selected_size, selected_color),
        }
    }

    /// "Place order" for the whole cart.
    ///
    /// ## Errors
    /// `CoreError::EmptyCheckout` if the cart has no lines.
    pub fn place_order(cart: &Cart) -> CoreResult<Self> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCheckout);
        }
        Ok(CheckoutSelection::PlaceOrder {
            lines: cart.lines().to_vec(),
        })
    }

    pub fn mode(&self) -> CheckoutMode {
        match self {
            CheckoutSelection::BuyNow { .. } => CheckoutMode::BuyNow,
            CheckoutSelection::PlaceOrder { .. } => CheckoutMode::PlaceOrder,
        }
    }

    pub fn lines(&self) -> &[CartLine] {
        match self {
            CheckoutSelection::BuyNow { line } => std::slice::from_ref(line),
            CheckoutSelection::PlaceOrder { lines } => lines,
        }
    }

    pub fn summary(&self) -> CheckoutSummary {
        CheckoutSummary::from(self)
    }
}

/// Totals shown on the checkout screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckoutSummary {
    pub mode: CheckoutMode,
    pub lines: Vec<CartLine>,
    pub item_count: i64,
    pub subtotal: Money,
    pub discounted_total: Money,
    pub savings: Money,
}

impl From<&CheckoutSelection> for CheckoutSummary {
    fn from(selection: &CheckoutSelection) -> Self {
        let lines = selection.lines();
        let subtotal: Money = lines.iter().map(CartLine::line_total).sum();
        let discounted_total: Money = lines.iter().map(CartLine::discounted_line_total).sum();

        CheckoutSummary {
            mode: selection.mode(),
            lines: lines.to_vec(),
            item_count: lines.iter().map(|l| l.quantity).sum(),
            subtotal,
            discounted_total,
            savings: subtotal - discounted_total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::fixtures::product;

    #[test]
    fn test_buy_now_is_single_line_of_one() {
        let selection = CheckoutSelection::buy_now(&product(3, 1500), Some("XL".into()), None);

        assert_eq!(selection.mode(), CheckoutMode::BuyNow);
        assert_eq!(selection.lines().len(), 1);

        let summary = selection.summary();
        assert_eq!(summary.item_count, 1);
        assert_eq!(summary.subtotal.cents(), 1500);
        assert_eq!(summary.lines[0].selected_size.as_deref(), Some("XL"));
    }

    #[test]
    fn test_place_order_snapshots_cart() {
        let mut cart = Cart::new();
        cart.add(&product(1, 100), 2, None, None).unwrap();
        cart.add(&product(2, 250), 1, None, None).unwrap();

        let selection = CheckoutSelection::place_order(&cart).unwrap();

        // Later cart edits do not leak into the checkout set
        cart.clear();

        let summary = selection.summary();
        assert_eq!(summary.mode, CheckoutMode::PlaceOrder);
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.subtotal.cents(), 450);
    }

    #[test]
    fn test_place_order_rejects_empty_cart() {
        let err = CheckoutSelection::place_order(&Cart::new()).unwrap_err();
        assert!(matches!(err, CoreError::EmptyCheckout));
    }

    #[test]
    fn test_summary_savings() {
        let mut p = product(1, 2000);
        p.discount_bps = 2500;
        let summary = CheckoutSelection::buy_now(&p, None, None).summary();

        assert_eq!(summary.discounted_total.cents(), 1500);
        assert_eq!(summary.savings.cents(), 500);
    }
}
