//! # Checkout Commands
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  buy_now(product)        place_order()                                  │
//! │        │                       │  (error if the cart is empty)          │
//! │        └───────────┬───────────┘                                        │
//! │                    ▼                                                    │
//! │          CheckoutState::set(selection)                                  │
//! │                    │                                                    │
//! │                    ▼                                                    │
//! │          get_checkout() ──► CheckoutSummary                             │
//! │                    │                                                    │
//! │        ┌───────────┴───────────┐                                        │
//! │        ▼                       ▼                                        │
//! │  complete_checkout()     cancel_checkout()                              │
//! │  PlaceOrder: cart cleared                                               │
//! │  BuyNow: cart untouched                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::{debug, info};

use bazaar_core::{CheckoutMode, CheckoutSelection, CheckoutSummary, Product};

use crate::error::{ApiError, ApiResult};
use crate::state::{CartState, CheckoutState};

/// Selects a single product for immediate purchase, quantity 1.
pub fn buy_now(
    checkout: &CheckoutState,
    product: &Product,
    selected_size: Option<String>,
    selected_color: Option<String>,
) -> CheckoutSummary {
    debug!(product_id = product.id, "buy_now command");

    let selection = CheckoutSelection::buy_now(product, selected_size, selected_color);
    let summary = selection.summary();
    checkout.set(selection);
    summary
}

/// Selects every cart line for checkout.
pub fn place_order(checkout: &CheckoutState, cart: &CartState) -> ApiResult<CheckoutSummary> {
    debug!("place_order command");

    let selection = cart.with_cart(CheckoutSelection::place_order)?;
    let summary = selection.summary();
    checkout.set(selection);
    Ok(summary)
}

/// Gets the summary for the checkout screen, if a selection was made.
pub fn get_checkout(checkout: &CheckoutState) -> Option<CheckoutSummary> {
    checkout.current().map(|s| s.summary())
}

/// Confirms the current selection.
///
/// A confirmed cart order empties the cart; a buy-now order leaves it as
/// it was.
pub async fn complete_checkout(
    checkout: &CheckoutState,
    cart: &CartState,
) -> ApiResult<CheckoutSummary> {
    let selection = checkout
        .take()
        .ok_or_else(|| ApiError::validation("Nothing selected for checkout"))?;
    let summary = selection.summary();

    if summary.mode == CheckoutMode::PlaceOrder {
        cart.clear();
        cart.flush().await;
    }

    info!(
        mode = ?summary.mode,
        items = summary.item_count,
        total_cents = summary.discounted_total.cents(),
        "Checkout completed"
    );
    Ok(summary)
}

pub fn cancel_checkout(checkout: &CheckoutState) {
    debug!("cancel_checkout command");
    checkout.clear();
}
