//! # Commands Module
//!
//! Every operation a screen can invoke.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs       ◄─── You are here (exports)
//! ├── catalog.rs   ◄─── Listing, detail, search, categories
//! ├── cart.rs      ◄─── Cart manipulation
//! ├── wishlist.rs  ◄─── Favorites
//! ├── checkout.rs  ◄─── Buy now / place order
//! ├── auth.rs      ◄─── Sign-in, sign-up, phone, sign-out
//! ├── profile.rs   ◄─── Profile, bank details, profile image
//! └── settings.rs  ◄─── Dark mode, onboarding
//! ```
//!
//! ## State Injection
//! Each command declares only the state it needs:
//! ```rust,ignore
//! // Only needs the catalog
//! async fn load_products(catalog: &dyn ProductCatalog, ...)
//!
//! // Only needs cart
//! fn get_cart(cart: &CartState)
//!
//! // Needs several
//! async fn sign_in_with_email(session: &SessionState, prefs: &PreferenceStore, db: &Database, ...)
//! ```
//!
//! Every fallible command returns `ApiResult<T>`; the `ApiError` carries a
//! code plus a message fit for display.

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod profile;
pub mod settings;
pub mod wishlist;
