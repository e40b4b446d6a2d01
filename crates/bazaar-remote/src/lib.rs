//! # bazaar-remote: Remote Services for Bazaar
//!
//! HTTP clients for the two services Bazaar depends on: the public product
//! catalog and the cloud identity provider.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Remote Layer                                     │
//! │                                                                         │
//! │  ┌──────────────────────────────┐   ┌──────────────────────────────┐   │
//! │  │   ProductCatalog (trait)     │   │   IdentityProvider (trait)   │   │
//! │  │                              │   │                              │   │
//! │  │   CatalogClient              │   │   IdentityClient             │   │
//! │  │   ├── dummyjson host (paged) │   │   ├── password / sign-up     │   │
//! │  │   └── fakestore host (flat)  │   │   ├── Google credential      │   │
//! │  │                              │   │   ├── phone + SMS code       │   │
//! │  │   dto.rs: lenient JSON →     │   │   └── token refresh          │   │
//! │  │   bazaar_core::Product       │   │                              │   │
//! │  └──────────────────────────────┘   └──────────────────────────────┘   │
//! │                                                                         │
//! │  Every request: reqwest client with a fixed timeout, no retries.       │
//! │  Failures: RemoteError, with user_message() for screens.               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`catalog`] - Product listing, search, categories
//! - [`dto`] - Wire shapes and their conversion to core types
//! - [`identity`] - Sign-in flows and session tokens
//! - [`error`] - Remote error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod dto;
pub mod error;
pub mod identity;

// =============================================================================
// Re-exports
// =============================================================================

pub use catalog::{
    CatalogClient, CatalogConfig, ProductCatalog, DEFAULT_CATALOG_URL, DEFAULT_HTTP_TIMEOUT,
    DEFAULT_STORE_URL,
};
pub use error::{AuthFailure, RemoteError, RemoteResult, TIMEOUT_MESSAGE};
pub use identity::{
    AuthSession, IdentityClient, IdentityConfig, IdentityProvider, PhoneVerification,
    DEFAULT_IDENTITY_URL, DEFAULT_TOKEN_URL,
};
