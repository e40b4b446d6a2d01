//! # Session State
//!
//! The signed-in user and their identity tokens.
//!
//! ## Token Storage
//! Tokens are kept in memory only. `id_token()` refreshes 5 minutes before
//! expiry; a rejected refresh signs the user out locally.

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use bazaar_core::AuthUser;
use bazaar_remote::{
    AuthFailure, AuthSession, IdentityProvider, PhoneVerification, RemoteError, RemoteResult,
};

pub struct SessionState {
    provider: Option<Arc<dyn IdentityProvider>>,
    session: RwLock<Option<AuthSession>>,
    /// Phone sign-in waiting for its SMS code.
    pending_phone: Mutex<Option<PhoneVerification>>,
}

impl SessionState {
    /// `provider` is `None` when no identity API key is configured.
    pub fn new(provider: Option<Arc<dyn IdentityProvider>>) -> Self {
        SessionState {
            provider,
            session: RwLock::new(None),
            pending_phone: Mutex::new(None),
        }
    }

    pub fn provider(&self) -> RemoteResult<&dyn IdentityProvider> {
        self.provider
            .as_deref()
            .ok_or_else(|| RemoteError::InvalidConfig("sign-in is not configured".into()))
    }

    pub async fn set(&self, session: AuthSession) {
        info!(uid = %session.user.uid, provider = ?session.user.provider, "Session started");
        *self.session.write().await = Some(session);
    }

    pub async fn user(&self) -> Option<AuthUser> {
        self.session.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn require_user(&self) -> RemoteResult<AuthUser> {
        self.user().await.ok_or(RemoteError::NotSignedIn)
    }

    pub async fn is_signed_in(&self) -> bool {
        self.session.read().await.is_some()
    }

    /// Replaces the cached user record, e.g. after a display name change.
    pub async fn update_user(&self, f: impl FnOnce(&mut AuthUser)) {
        if let Some(session) = self.session.write().await.as_mut() {
            f(&mut session.user);
        }
    }

    /// Returns a valid id token, refreshing it if needed.
    pub async fn id_token(&self) -> RemoteResult<String> {
        {
            let guard = self.session.read().await;
            match guard.as_ref() {
                None => return Err(RemoteError::NotSignedIn),
                Some(session) if !session.needs_refresh() => {
                    debug!(remaining_secs = session.remaining_secs(), "Using cached id token");
                    return Ok(session.id_token.clone());
                }
                Some(_) => {}
            }
        }

        let mut guard = self.session.write().await;

        // Double-check after acquiring write lock
        let current = match guard.as_ref() {
            None => return Err(RemoteError::NotSignedIn),
            Some(session) if !session.needs_refresh() => return Ok(session.id_token.clone()),
            Some(session) => session.clone(),
        };

        match self.provider()?.refresh(&current).await {
            Ok(refreshed) => {
                debug!(remaining_secs = refreshed.remaining_secs(), "Id token refreshed");
                let token = refreshed.id_token.clone();
                *guard = Some(refreshed);
                Ok(token)
            }
            Err(RemoteError::Auth(AuthFailure::SessionExpired)) => {
                warn!(uid = %current.user.uid, "Refresh token rejected; signing out");
                *guard = None;
                Err(RemoteError::Auth(AuthFailure::SessionExpired))
            }
            Err(e) => Err(e),
        }
    }

    pub async fn clear(&self) {
        if let Some(session) = self.session.write().await.take() {
            info!(uid = %session.user.uid, "Session cleared");
        }
        self.take_pending_phone();
    }

    pub fn set_pending_phone(&self, verification: PhoneVerification) {
        *self
            .pending_phone
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(verification);
    }

    pub fn take_pending_phone(&self) -> Option<PhoneVerification> {
        self.pending_phone
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::{session_for, FakeIdentity};
    use std::time::{Duration, Instant};

    #[tokio::test]
    async fn test_not_configured_and_not_signed_in() {
        let state = SessionState::new(None);
        assert!(matches!(
            state.provider(),
            Err(ref e) if e.is_config_error()
        ));
        assert!(matches!(
            state.id_token().await,
            Err(RemoteError::NotSignedIn)
        ));
    }

    #[tokio::test]
    async fn test_fresh_token_is_reused() {
        let fake = Arc::new(FakeIdentity::default());
        let state = SessionState::new(Some(fake.clone()));
        state.set(session_for("uid-1", Duration::from_secs(3600))).await;

        assert_eq!(state.id_token().await.unwrap(), "id-uid-1");
        assert_eq!(fake.refresh_count(), 0);
    }

    #[tokio::test]
    async fn test_expiring_token_is_refreshed() {
        let fake = Arc::new(FakeIdentity::default());
        let state = SessionState::new(Some(fake.clone()));
        state.set(session_for("uid-1", Duration::from_secs(60))).await;

        assert_eq!(state.id_token().await.unwrap(), "refreshed-uid-1");
        assert_eq!(state.id_token().await.unwrap(), "refreshed-uid-1");
        assert_eq!(fake.refresh_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_refresh_signs_out() {
        let fake = Arc::new(FakeIdentity::default());
        fake.reject_refresh();
        let state = SessionState::new(Some(fake));
        let mut session = session_for("uid-1", Duration::from_secs(0));
        session.expires_at = Instant::now();
        state.set(session).await;

        assert!(state.id_token().await.is_err());
        assert!(!state.is_signed_in().await);
    }
}
