//! # Navigation Bootstrap
//!
//! Decides the first real screen after the splash.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │                    ┌──────────┐                                         │
//! │                    │ Loading  │  (splash; preferences still loading)    │
//! │                    └────┬─────┘                                         │
//! │                         │ preferences loaded + splash delay elapsed     │
//! │        ┌────────────────┼────────────────────┐                          │
//! │        ▼                ▼                    ▼                          │
//! │  ┌────────────┐  ┌─────────────────┐  ┌───────────┐                     │
//! │  │ NeedsLogin │  │ NeedsOnboarding │  │   Ready   │                     │
//! │  │ ¬logged_in │  │ logged_in ∧     │  │ logged_in │                     │
//! │  │            │  │ first_login     │  │ ∧ ¬first  │                     │
//! │  └────────────┘  └─────────────────┘  └───────────┘                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The three terminal states are final for one launch.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::PreferenceState;

/// Bootstrap progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BootstrapState {
    Loading,
    NeedsLogin,
    NeedsOnboarding,
    Ready,
}

impl BootstrapState {
    /// Applies the transition rule to loaded preferences.
    ///
    /// Returns `Loading` while `prefs.is_loading` is still true.
    pub fn resolve(prefs: &PreferenceState) -> Self {
        if prefs.is_loading {
            return BootstrapState::Loading;
        }
        match (prefs.is_logged_in, prefs.is_first_login) {
            (true, false) => BootstrapState::Ready,
            (true, true) => BootstrapState::NeedsOnboarding,
            (false, _) => BootstrapState::NeedsLogin,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, BootstrapState::Loading)
    }

    /// Screen shown for this state.
    pub fn route(&self) -> Route {
        match self {
            BootstrapState::Loading => Route::Splash,
            BootstrapState::NeedsLogin => Route::Login,
            BootstrapState::NeedsOnboarding => Route::Onboarding,
            BootstrapState::Ready => Route::Home,
        }
    }
}

/// Top-level destinations reachable from the bootstrap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Splash,
    Login,
    Onboarding,
    Home,
}

impl Route {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Route::Splash => "splash",
            Route::Login => "login",
            Route::Onboarding => "onboarding",
            Route::Home => "home",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
