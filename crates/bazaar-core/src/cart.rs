//! # Cart
//!
//! The in-memory shopping cart: line aggregation and totals.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Operations                                      │
//! │                                                                         │
//! │  add(product, qty, size, color)                                        │
//! │     ├── product already in cart ──► line.quantity += qty               │
//! │     └── new product ──────────────► lines.push(CartLine)               │
//! │                                                                         │
//! │  update_quantity(id, n)                                                │
//! │     ├── n <= 0 ──────────────────► remove(id)                          │
//! │     └── n > 0  ──────────────────► line.quantity = n                   │
//! │                                                                         │
//! │  remove(id) ──► retain(line.id != id)   (absent id: no-op)             │
//! │  clear()    ──► lines.clear()                                          │
//! │                                                                         │
//! │  total      = Σ line.unit_price × line.quantity                        │
//! │  item_count = Σ line.quantity                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per product id (re-adding increments quantity)
//! - Every line has quantity >= 1
//! - At most [`MAX_CART_LINES`] lines, each at most [`MAX_ITEM_QUANTITY`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::Product;
use crate::validation::validate_quantity;
use crate::{MAX_CART_LINES, MAX_ITEM_QUANTITY};

// =============================================================================
// Cart Line
// =============================================================================

/// One aggregated product entry in the cart.
///
/// ## Snapshot
/// `product` is a frozen copy taken when the line was created, so the cart
/// keeps rendering the same title and price even if the catalog changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product: Product,

    /// Always >= 1.
    pub quantity: i64,

    pub selected_size: Option<String>,

    pub selected_color: Option<String>,

    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a line from a product snapshot.
    pub fn new(
        product: &Product,
        quantity: i64,
        selected_size: Option<String>,
        selected_color: Option<String>,
    ) -> Self {
        CartLine {
            product: product.clone(),
            quantity,
            selected_size,
            selected_color,
            added_at: Utc::now(),
        }
    }

    #[inline]
    pub fn product_id(&self) -> i64 {
        self.product.id
    }

    #[inline]
    pub fn unit_price(&self) -> Money {
        self.product.price()
    }

    /// `unit_price × quantity`
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Line total after the product's catalog discount.
    pub fn discounted_line_total(&self) -> Money {
        self.product.discounted_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Cart
// =============================================================================

/// The shopping cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Rebuilds a cart from previously persisted lines.
    ///
    /// Duplicate product ids are merged and non-positive quantities dropped,
    /// so a damaged cache can never break the one-line-per-product rule.
    pub fn from_lines(lines: impl IntoIterator<Item = CartLine>) -> Self {
        let mut cart = Cart::new();
        for line in lines {
            if line.quantity <= 0 {
                continue;
            }
            match cart
                .lines
                .iter_mut()
                .find(|l| l.product_id() == line.product_id())
            {
                Some(existing) => {
                    existing.quantity = existing
                        .quantity
                        .saturating_add(line.quantity)
                        .min(MAX_ITEM_QUANTITY)
                }
                None => cart.lines.push(line),
            }
        }
        cart
    }

    /// Adds a product, or increases its quantity if already present.
    ///
    /// ## Behavior
    /// - Existing line: quantity += `quantity`; its size/color stay as chosen
    ///   the first time
    /// - New product: appended as a new line
    ///
    /// ## Errors
    /// - `quantity <= 0` → `CoreError::Validation`
    /// - summed quantity above [`MAX_ITEM_QUANTITY`] → `QuantityTooLarge`
    /// - a new line beyond [`MAX_CART_LINES`] → `CartTooLarge`
    pub fn add(
        &mut self,
        product: &Product,
        quantity: i64,
        selected_size: Option<String>,
        selected_color: Option<String>,
    ) -> CoreResult<()> {
        validate_quantity(quantity)?;

        if let Some(line) = self.line_mut(product.id) {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_ITEM_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_ITEM_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine::new(
            product,
            quantity,
            selected_size,
            selected_color,
        ));
        Ok(())
    }

    /// Removes the line for `product_id`.
    ///
    /// Returns whether a line was removed; an absent id is a no-op.
    pub fn remove(&mut self, product_id: i64) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id() != product_id);
        self.lines.len() != before
    }

    /// Replaces the quantity of a line.
    ///
    /// ## Behavior
    /// - `quantity <= 0`: removes the line
    /// - absent id: no-op
    /// - `quantity > MAX_ITEM_QUANTITY`: error, cart unchanged
    pub fn update_quantity(&mut self, product_id: i64, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            self.remove(product_id);
            return Ok(());
        }

        if quantity > MAX_ITEM_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_ITEM_QUANTITY,
            });
        }

        if let Some(line) = self.line_mut(product_id) {
            line.quantity = quantity;
        }
        Ok(())
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, product_id: i64) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product_id() == product_id)
    }

    fn line_mut(&mut self, product_id: i64) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id() == product_id)
    }

    pub fn contains(&self, product_id: i64) -> bool {
        self.line(product_id).is_some()
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Σ line.quantity
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Σ line.unit_price × line.quantity
    pub fn total(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total after each product's catalog discount.
    pub fn discounted_total(&self) -> Money {
        self.lines.iter().map(CartLine::discounted_line_total).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Cart totals summary for screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub line_count: usize,
    pub item_count: i64,
    pub total_cents: i64,
    pub discounted_total_cents: i64,
    pub savings_cents: i64,
}

impl From<&Cart> for CartTotals {
    fn from(cart: &Cart) -> Self {
        let total = cart.total();
        let discounted = cart.discounted_total();
        CartTotals {
            line_count: cart.line_count(),
            item_count: cart.item_count(),
            total_cents: total.cents(),
            discounted_total_cents: discounted.cents(),
            savings_cents: (total - discounted).cents(),
        }
    }
}
