//! # Cart Cache Writer
//!
//! Mirrors cart mutations into the `cart_items` table without making the
//! caller wait.
//!
//! ## Write Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Cache Writer                                    │
//! │                                                                         │
//! │  CartState (holds cart mutex)                                           │
//! │       │  upsert(line) / remove(id) / clear()                            │
//! │       ▼                                                                 │
//! │  ┌──────────────────────┐     unbounded mpsc      ┌──────────────────┐ │
//! │  │  CartCacheHandle     │ ──────────────────────► │ CartCacheWriter  │ │
//! │  │  (cheap to clone)    │                         │ (one tokio task) │ │
//! │  └──────────────────────┘                         └────────┬─────────┘ │
//! │                                                            │           │
//! │                                       CartCacheRepository ▼           │
//! │                                                     cart_items table   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Operations are applied in the order they were sent. Failures are logged
//! and dropped; the in-memory cart stays authoritative for the session.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

use bazaar_core::CartLine;
use bazaar_db::CartCacheRepository;

enum CacheOp {
    Upsert(CartLine),
    Remove(i64),
    Clear,
    Flush(oneshot::Sender<()>),
}

/// Background task applying cache operations one at a time.
pub struct CartCacheWriter {
    repo: CartCacheRepository,
    rx: mpsc::UnboundedReceiver<CacheOp>,
}

/// Handle for queueing cache operations.
#[derive(Clone)]
pub struct CartCacheHandle {
    tx: mpsc::UnboundedSender<CacheOp>,
}

impl CartCacheWriter {
    /// Creates a writer and returns its handle.
    pub fn new(repo: CartCacheRepository) -> (Self, CartCacheHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        (CartCacheWriter { repo, rx }, CartCacheHandle { tx })
    }

    /// Spawns the writer on the current runtime.
    pub fn spawn(repo: CartCacheRepository) -> CartCacheHandle {
        let (writer, handle) = Self::new(repo);
        tokio::spawn(writer.run());
        handle
    }

    /// Runs until every handle is dropped.
    pub async fn run(mut self) {
        debug!("Cart cache writer starting");

        while let Some(op) = self.rx.recv().await {
            let result = match op {
                CacheOp::Upsert(line) => self.repo.upsert(&line).await,
                CacheOp::Remove(product_id) => self.repo.remove(product_id).await.map(|_| ()),
                CacheOp::Clear => self.repo.clear().await,
                CacheOp::Flush(done) => {
                    let _ = done.send(());
                    Ok(())
                }
            };

            if let Err(e) = result {
                error!(?e, "Failed to write cart cache");
            }
        }

        debug!("Cart cache writer stopped");
    }
}

impl CartCacheHandle {
    pub fn upsert(&self, line: CartLine) {
        self.send(CacheOp::Upsert(line));
    }

    pub fn remove(&self, product_id: i64) {
        self.send(CacheOp::Remove(product_id));
    }

    pub fn clear(&self) {
        self.send(CacheOp::Clear);
    }

    /// Resolves once every operation queued before this call was applied.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(CacheOp::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }

    fn send(&self, op: CacheOp) {
        if self.tx.send(op).is_err() {
            warn!("Cart cache writer is gone; dropping write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{memory_db, product};

    #[tokio::test]
    async fn test_operations_apply_in_order() {
        let db = memory_db().await;
        let cache = CartCacheWriter::spawn(db.cart());

        cache.upsert(CartLine::new(&product(1, 1000), 1, None, None));
        cache.upsert(CartLine::new(&product(2, 500), 2, None, None));
        cache.upsert(CartLine::new(&product(1, 1000), 4, None, None));
        cache.remove(2);
        cache.flush().await;

        let lines = db.cart().load_all().await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id(), 1);
        assert_eq!(lines[0].quantity, 4);

        cache.clear();
        cache.flush().await;
        assert!(db.cart().load_all().await.unwrap().is_empty());
    }
}
