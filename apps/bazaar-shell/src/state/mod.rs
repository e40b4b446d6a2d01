//! # State Module
//!
//! Shared state holders the commands operate on.
//!
//! ## Why Multiple State Types?
//! Each holder owns one concern and one lock. A command takes only the
//! holders it needs, so cart updates never wait on a sign-in and tests can
//! build exactly the pieces they exercise.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐  ┌─────────────┐ │
//! │  │  CartState   │  │WishlistState │  │CheckoutState │  │ ProductFeed │ │
//! │  │  Mutex<Cart> │  │Mutex<Wish..> │  │Mutex<Option> │  │ watch<Ui..> │ │
//! │  │  + cache     │  │              │  │              │  │             │ │
//! │  │    writer    │  │              │  │              │  │             │ │
//! │  └──────────────┘  └──────────────┘  └──────────────┘  └─────────────┘ │
//! │                                                                         │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌──────────────────────┐  │
//! │  │ PreferenceStore  │  │ NavigationState  │  │   SessionState       │  │
//! │  │ watch<bool> × 4  │  │ watch<Bootstrap> │  │ RwLock<AuthSession>  │  │
//! │  │ + writer task    │  │                  │  │                      │  │
//! │  └──────────────────┘  └──────────────────┘  └──────────────────────┘  │
//! │                                                                         │
//! │  ShellConfig: read-only after startup                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cart;
mod cart_cache;
mod catalog;
mod checkout;
mod config;
mod navigation;
mod preferences;
mod session;
mod wishlist;

#[cfg(test)]
pub(crate) mod test_support;

pub use cart::CartState;
pub use cart_cache::{CartCacheHandle, CartCacheWriter};
pub use catalog::ProductFeed;
pub use checkout::CheckoutState;
pub use config::{
    AppSettings, CatalogSettings, IdentitySettings, ShellConfig, CONFIG_FILE_NAME,
    DATABASE_FILE_NAME,
};
pub use navigation::NavigationState;
pub use preferences::PreferenceStore;
pub use session::SessionState;
pub use wishlist::WishlistState;
