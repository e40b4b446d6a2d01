//! # Settings Commands
//!
//! Theme and onboarding flags. Values are published immediately and written
//! to the preference file in the background.

use tracing::debug;

use bazaar_core::{PreferenceState, Route};

use crate::state::PreferenceStore;

pub fn get_preferences(prefs: &PreferenceStore) -> PreferenceState {
    prefs.state()
}

/// Switches between the light and dark theme.
pub fn set_dark_mode(prefs: &PreferenceStore, enabled: bool) -> PreferenceState {
    debug!(enabled, "set_dark_mode command");
    prefs.set_dark_mode(enabled);
    prefs.state()
}

/// Marks onboarding as seen. Returns the home route.
pub fn complete_onboarding(prefs: &PreferenceStore) -> Route {
    debug!("complete_onboarding command");
    prefs.set_first_login(false);
    Route::Home
}
