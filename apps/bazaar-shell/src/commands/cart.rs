//! # Cart Commands
//!
//! Commands for cart manipulation.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│  Order   │       │
//! │  │  Cart    │     │          │     │  screen  │     │  placed  │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                 │                              │
//! │                   add_to_cart       complete_checkout                  │
//! │                   update_item       (checkout.rs)                      │
//! │                   remove_item                                           │
//! │                        │                                                │
//! │                        ▼                                                │
//! │                   clear_cart ──────────────────────►                   │
//! │                                                      (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use tracing::debug;

use bazaar_core::{Cart, CartLine, CartTotals, Product};

use crate::error::ApiResult;
use crate::state::CartState;

/// Cart response including lines and totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLine>,
    pub totals: CartTotals,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        CartResponse {
            lines: cart.lines().to_vec(),
            totals: CartTotals::from(cart),
        }
    }
}

/// Gets the current cart contents.
pub fn get_cart(cart: &CartState) -> CartResponse {
    debug!("get_cart command");
    cart.with_cart(|c| CartResponse::from(c))
}

/// Adds a product to the cart.
///
/// ## Behavior
/// - Product already in cart: quantity increases, its size/color stay
/// - Product not in cart: appended as a new line
/// - The product snapshot is frozen at the time of adding
///
/// ## Arguments
/// * `quantity` - Quantity to add (default: 1)
pub fn add_to_cart(
    cart: &CartState,
    product: &Product,
    quantity: Option<i64>,
    selected_size: Option<String>,
    selected_color: Option<String>,
) -> ApiResult<CartResponse> {
    let quantity = quantity.unwrap_or(1);
    debug!(product_id = product.id, quantity, "add_to_cart command");

    cart.add(product, quantity, selected_size, selected_color)?;
    Ok(get_cart(cart))
}

/// Updates the quantity of a line.
///
/// ## Behavior
/// - Quantity 0 or less: removes the line
/// - Product not in cart: nothing happens
pub fn update_cart_item(
    cart: &CartState,
    product_id: i64,
    quantity: i64,
) -> ApiResult<CartResponse> {
    debug!(product_id, quantity, "update_cart_item command");

    cart.update_quantity(product_id, quantity)?;
    Ok(get_cart(cart))
}

/// Removes a line. Removing a product that is not in the cart is a no-op.
pub fn remove_from_cart(cart: &CartState, product_id: i64) -> CartResponse {
    debug!(product_id, "remove_from_cart command");

    cart.remove(product_id);
    get_cart(cart)
}

/// Clears all lines from the cart.
pub fn clear_cart(cart: &CartState) -> CartResponse {
    debug!("clear_cart command");

    cart.clear();
    get_cart(cart)
}
