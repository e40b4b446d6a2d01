//! # Database Handle
//!
//! Opens the on-device SQLite cache and hands out repositories.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbConfig::File(<data_dir>/bazaar.db)     DbConfig::InMemory            │
//! │            │                                      │                     │
//! │            └──────────► Database::new ◄───────────┘                     │
//! │                           │  open pool, apply migrations                │
//! │                           ▼                                             │
//! │         db.cart()      db.profiles()      db.images()                   │
//! │     (cache writer)    (profile commands)  (profile image)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! File databases use WAL so the background cart writer and a profile read
//! never wait on each other.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::cart::CartCacheRepository;
use crate::repository::image::ProfileImageRepository;
use crate::repository::profile::ProfileRepository;

/// Connections for a file database: one cache writer plus command reads.
const FILE_POOL_SIZE: u32 = 4;

/// Where the cache lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbConfig {
    /// SQLite file, created on first open.
    File(PathBuf),
    /// Private in-memory database that lives as long as the handle.
    InMemory,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig::File(path.into())
    }

    pub fn in_memory() -> Self {
        DbConfig::InMemory
    }
}

/// Shared handle to the cache. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the database and applies pending migrations.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        let pool = match &config {
            DbConfig::File(path) => {
                info!(path = %path.display(), "Opening cache database");
                let options = SqliteConnectOptions::new()
                    .filename(path)
                    .create_if_missing(true)
                    .journal_mode(SqliteJournalMode::Wal)
                    .synchronous(SqliteSynchronous::Normal)
                    .foreign_keys(true);
                SqlitePoolOptions::new()
                    .max_connections(FILE_POOL_SIZE)
                    .connect_with(options)
                    .await
            }
            DbConfig::InMemory => {
                let options = SqliteConnectOptions::from_str("sqlite::memory:")
                    .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
                    .foreign_keys(true);
                // Every connection would get its own empty database, so keep
                // exactly one and never recycle it.
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await
            }
        }
        .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_migrations(&pool).await?;
        Ok(Database { pool })
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn cart(&self) -> CartCacheRepository {
        CartCacheRepository::new(self.pool.clone())
    }

    pub fn profiles(&self) -> ProfileRepository {
        ProfileRepository::new(self.pool.clone())
    }

    pub fn images(&self) -> ProfileImageRepository {
        ProfileImageRepository::new(self.pool.clone())
    }

    /// Closes the pool. Repository calls fail afterwards.
    pub async fn close(&self) {
        info!("Closing cache database");
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::Profile;

    #[tokio::test]
    async fn test_in_memory_databases_are_isolated() {
        let first = Database::new(DbConfig::in_memory()).await.unwrap();
        let second = Database::new(DbConfig::in_memory()).await.unwrap();

        first.profiles().upsert(&Profile::new("u1")).await.unwrap();
        assert!(first.profiles().get("u1").await.unwrap().is_some());
        assert!(second.profiles().get("u1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_file_database_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bazaar.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        db.images().set("u1", "/tmp/a.png").await.unwrap();
        db.close().await;
        assert!(path.exists());

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert_eq!(db.images().get("u1").await.unwrap().as_deref(), Some("/tmp/a.png"));
        db.close().await;

        assert!(db.profiles().get("u1").await.is_err());
    }
}
