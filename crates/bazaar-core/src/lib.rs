//! # bazaar-core: Pure Shopping Logic for Bazaar
//!
//! This crate is the **heart** of Bazaar. It holds the cart, wishlist,
//! checkout and navigation rules as plain data structures with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    UI (screens, not in this repo)               │   │
//! │  │    Splash ──► Login/Onboarding ──► Home ──► Cart ──► Checkout   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ commands                               │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bazaar-shell (state holders)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bazaar-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌──────────┐ ┌──────────┐ ┌────────┐ │   │
//! │  │   │  types  │ │  cart   │ │ checkout │ │navigation│ │ money  │ │   │
//! │  │   │ Product │ │  Cart   │ │ BuyNow   │ │ Loading  │ │ cents  │ │   │
//! │  │   │ Profile │ │CartLine │ │PlaceOrder│ │ Ready .. │ │        │ │   │
//! │  │   └─────────┘ └─────────┘ └──────────┘ └──────────┘ └────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Profile, PreferenceState, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Cart aggregation and totals
//! - [`wishlist`] - Favorited products
//! - [`checkout`] - "Buy now" vs "place order" checkout sets
//! - [`navigation`] - Splash bootstrap state machine
//! - [`ui_state`] - Tagged result surfaced to screens
//! - [`error`] - Domain error types
//! - [`validation`] - Input validation
//!
//! ## Example Usage
//!
//! ```rust
//! use bazaar_core::money::Money;
//! use bazaar_core::types::DiscountRate;
//!
//! let price = Money::from_cents(1099); // $10.99
//! let sale = price.apply_discount(DiscountRate::from_bps(1000)); // 10% off
//! assert_eq!(sale.cents(), 989);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod navigation;
pub mod types;
pub mod ui_state;
pub mod validation;
pub mod wishlist;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartLine, CartTotals};
pub use checkout::{CheckoutMode, CheckoutSelection, CheckoutSummary};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use navigation::{BootstrapState, Route};
pub use types::*;
pub use ui_state::UiState;
pub use wishlist::{Wishlist, WishlistEntry};

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct lines allowed in a single cart.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line.
///
/// Guards against a fat-fingered quantity field (1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Splash screen duration before the bootstrap leaves `Loading`.
pub const DEFAULT_SPLASH_DELAY_MS: u64 = 2_000;

/// Name of the durable key-value file holding the preference flags.
pub const PREFERENCE_FILE_NAME: &str = "bazaar_preferences";
