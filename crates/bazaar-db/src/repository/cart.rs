//! # Cart Cache Repository
//!
//! Mirrors the in-memory cart into `cart_items` so it survives a restart.
//!
//! ## Write Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart::add / update_quantity      ──► upsert(line)                      │
//! │  Cart::remove / qty <= 0          ──► remove(product_id)                │
//! │  Cart::clear / order placed       ──► clear()                           │
//! │                                                                         │
//! │  Startup: load_all() ──► Cart::from_lines(..)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The product snapshot is stored as JSON in `product_json`; a row whose
//! JSON no longer decodes is skipped with a warning instead of failing the
//! whole restore.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::DbResult;
use bazaar_core::{CartLine, Product};

/// Raw `cart_items` row.
#[derive(Debug, sqlx::FromRow)]
struct CartItemRow {
    product_id: i64,
    product_json: String,
    quantity: i64,
    selected_size: Option<String>,
    selected_color: Option<String>,
    added_at: DateTime<Utc>,
}

/// Repository for cached cart lines.
#[derive(Debug, Clone)]
pub struct CartCacheRepository {
    pool: SqlitePool,
}

impl CartCacheRepository {
    /// Creates a new CartCacheRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartCacheRepository { pool }
    }

    /// Loads every cached line in the order it was first added.
    pub async fn load_all(&self) -> DbResult<Vec<CartLine>> {
        let rows = sqlx::query_as::<_, CartItemRow>(
            r#"
            SELECT product_id, product_json, quantity,
                   selected_size, selected_color, added_at
            FROM cart_items
            ORDER BY position ASC, added_at ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            match serde_json::from_str::<Product>(&row.product_json) {
                Ok(product) => lines.push(CartLine {
                    product,
                    quantity: row.quantity,
                    selected_size: row.selected_size,
                    selected_color: row.selected_color,
                    added_at: row.added_at,
                }),
                Err(e) => warn!(
                    product_id = row.product_id,
                    error = %e,
                    "Skipping cart row with unreadable product snapshot"
                ),
            }
        }

        debug!(count = lines.len(), "Loaded cached cart");
        Ok(lines)
    }

    /// Inserts a line or replaces its quantity and variant.
    ///
    /// New rows are appended after the current last position, so
    /// `load_all` returns lines in cart order.
    pub async fn upsert(&self, line: &CartLine) -> DbResult<()> {
        let product_json = serde_json::to_string(&line.product)?;

        sqlx::query(
            r#"
            INSERT INTO cart_items (
                product_id, product_json, quantity,
                selected_size, selected_color, added_at, position
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                (SELECT COALESCE(MAX(position), 0) + 1 FROM cart_items)
            )
            ON CONFLICT (product_id) DO UPDATE SET
                quantity = excluded.quantity,
                selected_size = excluded.selected_size,
                selected_color = excluded.selected_color
            "#,
        )
        .bind(line.product.id)
        .bind(&product_json)
        .bind(line.quantity)
        .bind(&line.selected_size)
        .bind(&line.selected_color)
        .bind(line.added_at)
        .execute(&self.pool)
        .await?;

        debug!(
            product_id = line.product.id,
            quantity = line.quantity,
            "Cached cart line"
        );
        Ok(())
    }

    /// Removes a line. Returns whether a row existed.
    pub async fn remove(&self, product_id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM cart_items WHERE product_id = ?1")
            .bind(product_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Empties the cached cart.
    pub async fn clear(&self) -> DbResult<()> {
        sqlx::query("DELETE FROM cart_items")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
