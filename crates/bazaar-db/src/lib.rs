//! # bazaar-db: Local Storage Layer for Bazaar
//!
//! This crate provides on-device storage for Bazaar: a SQLite cache
//! (sqlx) and the durable key-value file that holds preference flags.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bazaar Data Flow                                 │
//! │                                                                         │
//! │  Shell holder (CartState, PreferenceStore, profile commands)           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bazaar-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Preferences │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (prefs.rs)  │  │   │
//! │  │   │               │    │ CartCacheRepo │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProfileRepo   │    │ TOML file    │  │   │
//! │  │   │ Migrations    │    │ ImageRepo     │    │ Memory map   │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                             │                   │
//! │       ▼                                             ▼                   │
//! │   bazaar.db (SQLite, WAL)               bazaar_preferences.toml         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Storage error types
//! - [`repository`] - Cart cache, profile and profile image repositories
//! - [`prefs`] - Key-value preference backends
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bazaar_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/bazaar.db")).await?;
//!
//! let lines = db.cart().load_all().await?;
//! let profile = db.profiles().get("uid-123").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod prefs;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use prefs::{KeyValueStore, MemoryKeyValueStore, TomlPreferenceFile};

// Repository re-exports for convenience
pub use repository::cart::CartCacheRepository;
pub use repository::image::ProfileImageRepository;
pub use repository::profile::ProfileRepository;
