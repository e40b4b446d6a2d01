//! # Preference Store
//!
//! The three persisted flags (`is_first_login`, `is_logged_in`,
//! `is_dark_mode`) plus the one-shot `is_loading` flag, each observable as a
//! `tokio::sync::watch` stream.
//!
//! ## Read / Write Paths
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Preference Store                                     │
//! │                                                                         │
//! │  load() ──── KeyValueStore::load_all() ───► publish all three flags    │
//! │                                              then is_loading = false    │
//! │                                              (exactly once)             │
//! │                                                                         │
//! │  set(key, v)                                                            │
//! │     │                                                                   │
//! │     ├──► watch::Sender::send_replace(v)     subscribers see v now       │
//! │     │                                                                   │
//! │     └──► mpsc ───► PreferenceWriter task ───► KeyValueStore::set_bool  │
//! │                    (single writer, FIFO)       failures: logged only    │
//! │                                                                         │
//! │  flush() ── barrier through the same queue ── returns after prior sets  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use bazaar_core::{PreferenceKey, PreferenceState};
use bazaar_db::KeyValueStore;

enum WriteOp {
    Set(PreferenceKey, bool),
    Flush(oneshot::Sender<()>),
}

/// Observable preference flags backed by a durable key-value store.
pub struct PreferenceStore {
    first_login: watch::Sender<bool>,
    logged_in: watch::Sender<bool>,
    dark_mode: watch::Sender<bool>,
    loading: watch::Sender<bool>,
    store: Arc<dyn KeyValueStore>,
    writer: mpsc::UnboundedSender<WriteOp>,
}

impl PreferenceStore {
    /// Creates the store with default flags and `is_loading = true`, and
    /// starts its writer task. Call [`load`](Self::load) next.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        let (writer, rx) = mpsc::unbounded_channel();
        tokio::spawn(PreferenceWriter {
            store: Arc::clone(&store),
            rx,
        }
        .run());

        PreferenceStore {
            first_login: watch::channel(PreferenceKey::FirstLogin.default_value()).0,
            logged_in: watch::channel(PreferenceKey::LoggedIn.default_value()).0,
            dark_mode: watch::channel(PreferenceKey::DarkMode.default_value()).0,
            loading: watch::channel(true).0,
            store,
            writer,
        }
    }

    fn sender(&self, key: PreferenceKey) -> &watch::Sender<bool> {
        match key {
            PreferenceKey::FirstLogin => &self.first_login,
            PreferenceKey::LoggedIn => &self.logged_in,
            PreferenceKey::DarkMode => &self.dark_mode,
        }
    }

    /// Reads the durable store and publishes its values.
    ///
    /// Read failures fall back to defaults. Either way `is_loading` turns
    /// false; later calls do nothing.
    pub async fn load(&self) {
        if !*self.loading.borrow() {
            return;
        }

        match self.store.load_all().await {
            Ok(values) => {
                for key in PreferenceKey::ALL {
                    let value = values
                        .get(key.as_str())
                        .copied()
                        .unwrap_or_else(|| key.default_value());
                    self.sender(key).send_replace(value);
                }
            }
            Err(e) => {
                error!(?e, "Failed to read preferences; using defaults");
            }
        }

        let flipped = self.loading.send_if_modified(|loading| {
            let was_loading = *loading;
            *loading = false;
            was_loading
        });
        if flipped {
            info!(state = ?self.state(), "Preferences loaded");
        }
    }

    /// Current value of one flag.
    pub fn get(&self, key: PreferenceKey) -> bool {
        *self.sender(key).borrow()
    }

    /// Snapshot of every flag.
    pub fn state(&self) -> PreferenceState {
        PreferenceState {
            is_first_login: self.get(PreferenceKey::FirstLogin),
            is_logged_in: self.get(PreferenceKey::LoggedIn),
            is_dark_mode: self.get(PreferenceKey::DarkMode),
            is_loading: self.is_loading(),
        }
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    /// Stream of one flag's values.
    pub fn subscribe(&self, key: PreferenceKey) -> watch::Receiver<bool> {
        self.sender(key).subscribe()
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    /// Resolves once `is_loading` is false and returns the loaded flags.
    pub async fn wait_until_loaded(&self) -> PreferenceState {
        let mut rx = self.loading.subscribe();
        // The sender lives in self, so this cannot observe a closed channel
        let _ = rx.wait_for(|loading| !*loading).await;
        self.state()
    }

    /// Publishes `value` now and queues the durable write.
    pub fn set(&self, key: PreferenceKey, value: bool) {
        self.sender(key).send_replace(value);
        if self.writer.send(WriteOp::Set(key, value)).is_err() {
            warn!(key = %key, "Preference writer is gone; value not persisted");
        }
    }

    pub fn set_first_login(&self, value: bool) {
        self.set(PreferenceKey::FirstLogin, value);
    }

    pub fn set_logged_in(&self, value: bool) {
        self.set(PreferenceKey::LoggedIn, value);
    }

    pub fn set_dark_mode(&self, value: bool) {
        self.set(PreferenceKey::DarkMode, value);
    }

    /// Waits until every write queued before this call has been attempted.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.writer.send(WriteOp::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

/// Applies queued writes one at a time.
struct PreferenceWriter {
    store: Arc<dyn KeyValueStore>,
    rx: mpsc::UnboundedReceiver<WriteOp>,
}

impl PreferenceWriter {
    async fn run(mut self) {
        while let Some(op) = self.rx.recv().await {
            match op {
                WriteOp::Set(key, value) => {
                    if let Err(e) = self.store.set_bool(key.as_str(), value).await {
                        error!(?e, key = %key, value, "Failed to persist preference");
                    } else {
                        debug!(key = %key, value, "Preference persisted");
                    }
                }
                WriteOp::Flush(done) => {
                    let _ = done.send(());
                }
            }
        }
    }
}
