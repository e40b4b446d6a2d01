//! # Profile Image Repository
//!
//! Remembers where the user's profile picture was cached on disk.

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::DbResult;

#[derive(Debug, Clone)]
pub struct ProfileImageRepository {
    pool: SqlitePool,
}

impl ProfileImageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProfileImageRepository { pool }
    }

    /// Cached image path for a user, if any.
    pub async fn get(&self, user_id: &str) -> DbResult<Option<String>> {
        let path: Option<String> =
            sqlx::query_scalar("SELECT path FROM profile_images WHERE user_id = ?1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(path)
    }

    /// Sets or replaces the cached image path.
    pub async fn set(&self, user_id: &str, path: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO profile_images (user_id, path, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (user_id) DO UPDATE SET
                path = excluded.path,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(user_id)
        .bind(path)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_set_get_replace() {
        let images = Database::new(DbConfig::in_memory()).await.unwrap().images();

        assert_eq!(images.get("uid-1").await.unwrap(), None);

        images.set("uid-1", "/cache/a.jpg").await.unwrap();
        images.set("uid-1", "/cache/b.jpg").await.unwrap();
        assert_eq!(
            images.get("uid-1").await.unwrap().as_deref(),
            Some("/cache/b.jpg")
        );
        assert_eq!(images.get("uid-2").await.unwrap(), None);
    }
}
