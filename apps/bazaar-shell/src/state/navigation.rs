//! # Navigation Bootstrap Runner
//!
//! Decides the first screen after the splash.
//!
//! ```text
//!   t=0                                   t=splash_delay
//!    │  publish Loading                    │
//!    │  (splash route)                     │
//!    ├─────────── sleep ───────────────────┤
//!                                          │ wait for is_loading == false
//!                                          │ BootstrapState::resolve(prefs)
//!                                          ▼
//!                         NeedsLogin | NeedsOnboarding | Ready
//!                         published exactly once
//! ```

use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use bazaar_core::{BootstrapState, Route};

use super::preferences::PreferenceStore;

/// Publishes the bootstrap state to whoever renders the root route.
pub struct NavigationState {
    state: watch::Sender<BootstrapState>,
    splash_delay: Duration,
}

impl NavigationState {
    pub fn new(splash_delay: Duration) -> Self {
        NavigationState {
            state: watch::channel(BootstrapState::Loading).0,
            splash_delay,
        }
    }

    pub fn current(&self) -> BootstrapState {
        *self.state.borrow()
    }

    pub fn route(&self) -> Route {
        self.current().route()
    }

    pub fn subscribe(&self) -> watch::Receiver<BootstrapState> {
        self.state.subscribe()
    }

    /// Waits out the splash, then resolves the destination from the loaded
    /// preferences and publishes it.
    ///
    /// Running it again after a terminal state returns that state unchanged.
    pub async fn run(&self, preferences: &PreferenceStore) -> BootstrapState {
        let current = self.current();
        if current.is_terminal() {
            return current;
        }

        tokio::time::sleep(self.splash_delay).await;
        let prefs = preferences.wait_until_loaded().await;
        let resolved = BootstrapState::resolve(&prefs);

        self.state.send_if_modified(|state| {
            if state.is_terminal() {
                return false;
            }
            *state = resolved;
            true
        });

        let published = self.current();
        info!(state = ?published, route = %published.route(), "Bootstrap finished");
        published
    }
}
