//! # Auth Commands
//!
//! Sign-in, sign-up and sign-out.
//!
//! ## Successful Sign-in
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate input ──► IdentityProvider ──► AuthSession                    │
//! │                                              │                          │
//! │           ┌──────────────────────────────────┼───────────────────┐      │
//! │           ▼                                  ▼                   ▼      │
//! │   SessionState::set            is_logged_in = true     profiles.ensure  │
//! │                                is_first_login = true   (seed from the   │
//! │                                (new accounts only)      identity user)  │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                              AuthResponse { user, route }               │
//! │                              route: Onboarding or Home                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every failure leaves the session and the preference flags untouched.

use serde::Serialize;
use tracing::{debug, info};

use bazaar_core::validation::{
    validate_email, validate_password, validate_phone, validate_verification_code,
};
use bazaar_core::{AuthUser, BootstrapState, PreferenceState, Profile, Route};
use bazaar_db::Database;
use bazaar_remote::AuthSession;

use crate::error::{ApiError, ApiResult};
use crate::state::{PreferenceStore, SessionState};

/// Result of a successful sign-in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: AuthUser,
    /// Screen to show next
    pub route: Route,
}

/// Records a fresh session and decides where to go next.
async fn complete_sign_in(
    session: &SessionState,
    prefs: &PreferenceStore,
    db: &Database,
    auth: AuthSession,
) -> ApiResult<AuthResponse> {
    let user = auth.user.clone();

    db.profiles().ensure(&Profile::from_auth_user(&user)).await?;

    session.set(auth).await;
    prefs.set_logged_in(true);
    if user.is_new_user {
        prefs.set_first_login(true);
    }

    let flags = PreferenceState {
        is_loading: false,
        ..prefs.state()
    };
    let route = BootstrapState::resolve(&flags).route();
    info!(uid = %user.uid, route = %route, "Signed in");

    Ok(AuthResponse { user, route })
}

/// Signs in with email and password.
pub async fn sign_in_with_email(
    session: &SessionState,
    prefs: &PreferenceStore,
    db: &Database,
    email: &str,
    password: &str,
) -> ApiResult<AuthResponse> {
    let email = validate_email(email)?;
    validate_password(password)?;
    debug!(email = %email, "sign_in_with_email command");

    let auth = session
        .provider()?
        .sign_in_with_password(&email, password)
        .await?;
    complete_sign_in(session, prefs, db, auth).await
}

/// Creates an account and signs in. New accounts always go to onboarding.
pub async fn sign_up_with_email(
    session: &SessionState,
    prefs: &PreferenceStore,
    db: &Database,
    email: &str,
    password: &str,
) -> ApiResult<AuthResponse> {
    let email = validate_email(email)?;
    validate_password(password)?;
    debug!(email = %email, "sign_up_with_email command");

    let mut auth = session.provider()?.sign_up(&email, password).await?;
    auth.user.is_new_user = true;
    complete_sign_in(session, prefs, db, auth).await
}

/// Signs in with an id token from Google Sign-In.
pub async fn sign_in_with_google(
    session: &SessionState,
    prefs: &PreferenceStore,
    db: &Database,
    google_id_token: &str,
) -> ApiResult<AuthResponse> {
    if google_id_token.trim().is_empty() {
        return Err(ApiError::validation("Google sign-in was cancelled"));
    }
    debug!("sign_in_with_google command");

    let auth = session
        .provider()?
        .sign_in_with_google(google_id_token)
        .await?;
    complete_sign_in(session, prefs, db, auth).await
}

/// Sends an SMS code. The verification is kept until
/// [`verify_phone_code`] consumes it.
///
/// ## Returns
/// The normalized phone number the code was sent to.
pub async fn send_phone_code(
    session: &SessionState,
    phone: &str,
    recaptcha_token: &str,
) -> ApiResult<String> {
    let phone = validate_phone(phone)?;
    debug!(phone = %phone, "send_phone_code command");

    let verification = session
        .provider()?
        .send_phone_code(&phone, recaptcha_token)
        .await?;
    session.set_pending_phone(verification);
    Ok(phone)
}

/// Completes phone sign-in with the SMS code.
///
/// A wrong code keeps the pending verification so the user can retry.
pub async fn verify_phone_code(
    session: &SessionState,
    prefs: &PreferenceStore,
    db: &Database,
    code: &str,
) -> ApiResult<AuthResponse> {
    validate_verification_code(code)?;
    let provider = session.provider()?;

    let verification = session
        .take_pending_phone()
        .ok_or_else(|| ApiError::validation("Request a verification code first"))?;

    match provider.sign_in_with_phone(&verification, code.trim()).await {
        Ok(auth) => complete_sign_in(session, prefs, db, auth).await,
        Err(e) => {
            session.set_pending_phone(verification);
            Err(e.into())
        }
    }
}

pub async fn send_password_reset(session: &SessionState, email: &str) -> ApiResult<()> {
    let email = validate_email(email)?;
    debug!(email = %email, "send_password_reset command");

    session.provider()?.send_password_reset(&email).await?;
    Ok(())
}

/// Signs out locally. Returns the login route.
pub async fn sign_out(session: &SessionState, prefs: &PreferenceStore) -> Route {
    session.clear().await;
    prefs.set_logged_in(false);
    Route::Login
}
