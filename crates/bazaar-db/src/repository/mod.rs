//! # Repository Module
//!
//! Database repository implementations for the Bazaar cache.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Shell holder / command                                                │
//! │       │                                                                 │
//! │       │  db.profiles().get("uid-123")                                  │
//! │       ▼                                                                 │
//! │  ProfileRepository                                                     │
//! │  ├── get(&self, user_id)                                               │
//! │  ├── upsert(&self, profile)                                            │
//! │  └── delete(&self, user_id)                                            │
//! │       │                                                                 │
//! │       │  SQL Query (query_as + FromRow row struct)                     │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Row structs stay private; callers only see bazaar-core types.         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CartCacheRepository`](cart::CartCacheRepository) - Cart lines cached across restarts
//! - [`ProfileRepository`](profile::ProfileRepository) - User profiles
//! - [`ProfileImageRepository`](image::ProfileImageRepository) - Cached profile picture path

pub mod cart;
pub mod image;
pub mod profile;
