//! # Identity Client
//!
//! Email/password, Google-credential and phone-credential sign-in against an
//! Identity Toolkit compatible REST API.
//!
//! ## Sign-In Flows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Identity Flows                                     │
//! │                                                                         │
//! │  ┌──────────────┐                         ┌────────────────────────┐   │
//! │  │ bazaar-shell │                         │  Identity REST API     │   │
//! │  └──────┬───────┘                         └───────────┬────────────┘   │
//! │         │  email + password                           │                │
//! │         │  POST accounts:signInWithPassword / signUp  │                │
//! │         │────────────────────────────────────────────►│                │
//! │         │                                             │                │
//! │         │  Google id token                            │                │
//! │         │  POST accounts:signInWithIdp                │                │
//! │         │────────────────────────────────────────────►│                │
//! │         │                                             │                │
//! │         │  phone: POST accounts:sendVerificationCode  │                │
//! │         │────────────────────────────────────────────►│                │
//! │         │◄──────────────── sessionInfo ───────────────│                │
//! │         │  POST accounts:signInWithPhoneNumber        │                │
//! │         │      (sessionInfo + SMS code)               │                │
//! │         │────────────────────────────────────────────►│                │
//! │         │                                             │                │
//! │         │◄──── idToken + refreshToken + expiresIn ────│                │
//! │         │                                             │                │
//! │         │  [Later: token near expiry]                 │                │
//! │         │  POST token (grant_type=refresh_token)      │                │
//! │         │────────────────────────────────────────────►│ (token host)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Provider error codes (`EMAIL_NOT_FOUND`, `WEAK_PASSWORD`, ...) become
//! [`RemoteError::Auth`].

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

use crate::catalog::parse_base_url;
use crate::error::{AuthFailure, RemoteError, RemoteResult};
use bazaar_core::{AuthProvider, AuthUser};

/// Default Identity Toolkit endpoint.
pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com/v1/";

/// Default token refresh endpoint.
pub const DEFAULT_TOKEN_URL: &str = "https://securetoken.googleapis.com/v1/";

/// Margin before token expiration to trigger refresh (5 minutes)
const REFRESH_MARGIN_SECS: u64 = 300;

/// Used when the provider omits or garbles `expiresIn`.
const DEFAULT_EXPIRES_IN_SECS: u64 = 3600;

// =============================================================================
// Session
// =============================================================================

/// A signed-in user plus the tokens that prove it.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: AuthUser,
    /// Short-lived bearer token
    pub id_token: String,
    pub refresh_token: String,
    /// When `id_token` expires (local time)
    pub expires_at: Instant,
}

impl AuthSession {
    /// Check if the token is expired or about to expire
    pub fn needs_refresh(&self) -> bool {
        Instant::now() + Duration::from_secs(REFRESH_MARGIN_SECS) >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    pub fn remaining_secs(&self) -> u64 {
        self.expires_at
            .saturating_duration_since(Instant::now())
            .as_secs()
    }
}

/// Pending phone sign-in, returned after the SMS code was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneVerification {
    pub phone: String,
    /// Opaque value echoed back with the code.
    pub session_info: String,
}

// =============================================================================
// Provider Trait
// =============================================================================

/// Cloud identity operations used by the shell.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> RemoteResult<AuthSession>;

    async fn sign_up(&self, email: &str, password: &str) -> RemoteResult<AuthSession>;

    /// Exchanges a Google id token obtained by the platform sign-in UI.
    async fn sign_in_with_google(&self, google_id_token: &str) -> RemoteResult<AuthSession>;

    /// Sends an SMS code. `recaptcha_token` comes from the platform verifier.
    async fn send_phone_code(
        &self,
        phone: &str,
        recaptcha_token: &str,
    ) -> RemoteResult<PhoneVerification>;

    async fn sign_in_with_phone(
        &self,
        verification: &PhoneVerification,
        code: &str,
    ) -> RemoteResult<AuthSession>;

    /// Mirrors display name / photo onto the identity record.
    async fn update_profile(
        &self,
        id_token: &str,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> RemoteResult<()>;

    async fn send_password_reset(&self, email: &str) -> RemoteResult<()>;

    /// Trades the refresh token for a fresh id token.
    async fn refresh(&self, session: &AuthSession) -> RemoteResult<AuthSession>;
}

// =============================================================================
// Configuration
// =============================================================================

#[derive(Debug, Clone)]
pub struct IdentityConfig {
    pub api_key: String,
    pub identity_url: Url,
    pub token_url: Url,
    pub timeout: Duration,
}

impl IdentityConfig {
    pub fn new(
        api_key: impl Into<String>,
        identity_url: &str,
        token_url: &str,
        timeout: Duration,
    ) -> RemoteResult<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RemoteError::InvalidConfig(
                "identity API key is empty".to_string(),
            ));
        }
        Ok(IdentityConfig {
            api_key,
            identity_url: parse_base_url(identity_url)?,
            token_url: parse_base_url(token_url)?,
            timeout,
        })
    }
}

// =============================================================================
// Wire Types
// =============================================================================

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct IdpRequest {
    post_body: String,
    request_uri: &'static str,
    return_idp_credential: bool,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendCodeRequest<'a> {
    phone_number: &'a str,
    recaptcha_token: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PhoneSignInRequest<'a> {
    session_info: &'a str,
    code: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRequest<'a> {
    id_token: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    display_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    photo_url: Option<&'a str>,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct OobRequest<'a> {
    request_type: &'static str,
    email: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    refresh_token: &'a str,
}

/// Union of the sign-in response shapes; every field optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    photo_url: Option<String>,
    phone_number: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
    is_new_user: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SendCodeResponse {
    session_info: String,
}

/// Token endpoint responds in snake_case.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

fn expires_at(expires_in: Option<&str>) -> Instant {
    let secs = expires_in
        .and_then(|s| s.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    let now = Instant::now();
    now.checked_add(Duration::from_secs(secs))
        .unwrap_or_else(|| now + Duration::from_secs(DEFAULT_EXPIRES_IN_SECS))
}

impl SignInResponse {
    fn into_session(self, provider: AuthProvider) -> RemoteResult<AuthSession> {
        if self.local_id.is_empty() || self.id_token.is_empty() {
            return Err(RemoteError::Parse(
                "sign-in response is missing localId or idToken".to_string(),
            ));
        }
        Ok(AuthSession {
            expires_at: expires_at(self.expires_in.as_deref()),
            user: AuthUser {
                uid: self.local_id,
                email: self.email.filter(|e| !e.is_empty()),
                phone: self.phone_number,
                display_name: self.display_name.filter(|n| !n.is_empty()),
                photo_url: self.photo_url,
                provider,
                is_new_user: self.is_new_user.unwrap_or(false),
            },
            id_token: self.id_token,
            refresh_token: self.refresh_token,
        })
    }
}

// =============================================================================
// HTTP Client
// =============================================================================

/// reqwest-backed identity client.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: Client,
    config: IdentityConfig,
}

impl IdentityClient {
    pub fn new(config: IdentityConfig) -> RemoteResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteError::InvalidConfig(e.to_string()))?;
        Ok(IdentityClient { http, config })
    }

    /// POSTs JSON to `base + path?key=<api key>`.
    async fn post<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        base: &Url,
        path: &str,
        body: &B,
    ) -> RemoteResult<R> {
        // "./" keeps "accounts:signUp" from parsing as a URL scheme
        let mut url = base.join(&format!("./{}", path))?;
        url.query_pairs_mut().append_pair("key", &self.config.api_key);

        debug!(endpoint = %path, "Identity request");

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_transport(e))?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.map_transport(e))?;

        if !status.is_success() {
            return Err(match serde_json::from_slice::<ErrorEnvelope>(&bytes) {
                Ok(envelope) => {
                    let failure = AuthFailure::from_code(&envelope.error.message);
                    warn!(endpoint = %path, code = %failure, "Identity provider rejected request");
                    RemoteError::Auth(failure)
                }
                Err(_) => RemoteError::Api {
                    status: status.as_u16(),
                    message: String::from_utf8_lossy(&bytes).into_owned(),
                },
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| RemoteError::Parse(e.to_string()))
    }

    fn map_transport(&self, err: reqwest::Error) -> RemoteError {
        match RemoteError::from(err) {
            RemoteError::Timeout { .. } => RemoteError::Timeout {
                secs: self.config.timeout.as_secs(),
            },
            other => other,
        }
    }

    async fn password_flow(
        &self,
        path: &str,
        email: &str,
        password: &str,
    ) -> RemoteResult<AuthSession> {
        let response: SignInResponse = self
            .post(
                &self.config.identity_url,
                path,
                &PasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        response.into_session(AuthProvider::Password)
    }
}

#[async_trait]
impl IdentityProvider for IdentityClient {
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> RemoteResult<AuthSession> {
        let session = self
            .password_flow("accounts:signInWithPassword", email, password)
            .await?;
        info!(uid = %session.user.uid, "Signed in with password");
        Ok(session)
    }

    async fn sign_up(&self, email: &str, password: &str) -> RemoteResult<AuthSession> {
        let mut session = self.password_flow("accounts:signUp", email, password).await?;
        session.user.is_new_user = true;
        info!(uid = %session.user.uid, "Account created");
        Ok(session)
    }

    async fn sign_in_with_google(&self, google_id_token: &str) -> RemoteResult<AuthSession> {
        let response: SignInResponse = self
            .post(
                &self.config.identity_url,
                "accounts:signInWithIdp",
                &IdpRequest {
                    post_body: format!("id_token={}&providerId=google.com", google_id_token),
                    request_uri: "http://localhost",
                    return_idp_credential: true,
                    return_secure_token: true,
                },
            )
            .await?;
        let session = response.into_session(AuthProvider::Google)?;
        info!(uid = %session.user.uid, new_user = session.user.is_new_user, "Signed in with Google");
        Ok(session)
    }

    async fn send_phone_code(
        &self,
        phone: &str,
        recaptcha_token: &str,
    ) -> RemoteResult<PhoneVerification> {
        let response: SendCodeResponse = self
            .post(
                &self.config.identity_url,
                "accounts:sendVerificationCode",
                &SendCodeRequest {
                    phone_number: phone,
                    recaptcha_token,
                },
            )
            .await?;

        if response.session_info.is_empty() {
            return Err(RemoteError::Parse(
                "verification response is missing sessionInfo".to_string(),
            ));
        }
        debug!("Verification code sent");
        Ok(PhoneVerification {
            phone: phone.to_string(),
            session_info: response.session_info,
        })
    }

    async fn sign_in_with_phone(
        &self,
        verification: &PhoneVerification,
        code: &str,
    ) -> RemoteResult<AuthSession> {
        let response: SignInResponse = self
            .post(
                &self.config.identity_url,
                "accounts:signInWithPhoneNumber",
                &PhoneSignInRequest {
                    session_info: &verification.session_info,
                    code,
                },
            )
            .await?;
        let mut session = response.into_session(AuthProvider::Phone)?;
        if session.user.phone.is_none() {
            session.user.phone = Some(verification.phone.clone());
        }
        info!(uid = %session.user.uid, "Signed in with phone");
        Ok(session)
    }

    async fn update_profile(
        &self,
        id_token: &str,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> RemoteResult<()> {
        let _: serde_json::Value = self
            .post(
                &self.config.identity_url,
                "accounts:update",
                &UpdateRequest {
                    id_token,
                    display_name,
                    photo_url,
                    return_secure_token: false,
                },
            )
            .await?;
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> RemoteResult<()> {
        let _: serde_json::Value = self
            .post(
                &self.config.identity_url,
                "accounts:sendOobCode",
                &OobRequest {
                    request_type: "PASSWORD_RESET",
                    email,
                },
            )
            .await?;
        Ok(())
    }

    async fn refresh(&self, session: &AuthSession) -> RemoteResult<AuthSession> {
        let response: RefreshResponse = self
            .post(
                &self.config.token_url,
                "token",
                &RefreshRequest {
                    grant_type: "refresh_token",
                    refresh_token: &session.refresh_token,
                },
            )
            .await?;

        if response.id_token.is_empty() {
            return Err(RemoteError::Parse(
                "refresh response is missing id_token".to_string(),
            ));
        }

        let refresh_token = if response.refresh_token.is_empty() {
            session.refresh_token.clone()
        } else {
            response.refresh_token
        };

        Ok(AuthSession {
            user: session.user.clone(),
            id_token: response.id_token,
            refresh_token,
            expires_at: expires_at(response.expires_in.as_deref()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use std::collections::HashMap;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    fn client(base: &str) -> IdentityClient {
        let config =
            IdentityConfig::new("test-key", base, &format!("{}v1/", base), Duration::from_secs(5))
                .unwrap();
        IdentityClient::new(config).unwrap()
    }

    fn error(code: &str) -> axum::response::Response {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"error": {"code": 400, "message": code}})),
        )
            .into_response()
    }

    fn identity_router() -> Router {
        Router::new()
            .route(
                "/accounts:signInWithPassword",
                post(
                    |Query(q): Query<HashMap<String, String>>, Json(body): Json<Value>| async move {
                        if q.get("key").map(String::as_str) != Some("test-key") {
                            return error("API_KEY_INVALID");
                        }
                        if body["password"] != "secret1" {
                            return error("INVALID_LOGIN_CREDENTIALS");
                        }
                        Json(json!({
                            "localId": "uid-1", "email": body["email"], "displayName": "",
                            "idToken": "id-1", "refreshToken": "refresh-1",
                            "expiresIn": "3600", "registered": true
                        }))
                        .into_response()
                    },
                ),
            )
            .route(
                "/accounts:signUp",
                post(|| async { error("WEAK_PASSWORD : Password should be at least 6 characters") }),
            )
            .route(
                "/accounts:signInWithIdp",
                post(|Json(body): Json<Value>| async move {
                    assert!(body["postBody"]
                        .as_str()
                        .unwrap()
                        .contains("providerId=google.com"));
                    Json(json!({
                        "localId": "uid-g", "email": "g@example.com", "displayName": "Grace",
                        "photoUrl": "https://img/g.png", "idToken": "id-g",
                        "refreshToken": "refresh-g", "expiresIn": "3600", "isNewUser": true
                    }))
                }),
            )
            .route(
                "/accounts:sendVerificationCode",
                post(|| async { Json(json!({"sessionInfo": "session-xyz"})) }),
            )
            .route(
                "/accounts:signInWithPhoneNumber",
                post(|Json(body): Json<Value>| async move {
                    if body["code"] != "123456" || body["sessionInfo"] != "session-xyz" {
                        return error("INVALID_CODE");
                    }
                    Json(json!({"localId": "uid-p", "idToken": "id-p",
                                "refreshToken": "refresh-p", "expiresIn": "3600"}))
                    .into_response()
                }),
            )
            .route(
                "/accounts:update",
                post(|Json(body): Json<Value>| async move {
                    assert!(body.get("photoUrl").is_none());
                    Json(json!({"displayName": body["displayName"]}))
                }),
            )
            .route(
                "/accounts:sendOobCode",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["requestType"], "PASSWORD_RESET");
                    Json(json!({"email": body["email"]}))
                }),
            )
            .route(
                "/v1/token",
                post(|Json(body): Json<Value>| async move {
                    assert_eq!(body["grant_type"], "refresh_token");
                    Json(json!({"id_token": "id-2", "refresh_token": "refresh-2",
                                "expires_in": "3600", "user_id": "uid-1"}))
                }),
            )
    }

    #[tokio::test]
    async fn test_password_sign_in() {
        let client = client(&serve(identity_router()).await);

        let session = client
            .sign_in_with_password("ada@example.com", "secret1")
            .await
            .unwrap();
        assert_eq!(session.user.uid, "uid-1");
        assert_eq!(session.user.email.as_deref(), Some("ada@example.com"));
        assert_eq!(session.user.display_name, None);
        assert_eq!(session.user.provider, AuthProvider::Password);
        assert!(!session.needs_refresh());

        let err = client
            .sign_in_with_password("ada@example.com", "wrong")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RemoteError::Auth(AuthFailure::InvalidCredentials)
        ));
        assert_eq!(err.user_message(), "Incorrect email or password.");
    }

    #[tokio::test]
    async fn test_sign_up_error_code_is_decoded() {
        let client = client(&serve(identity_router()).await);
        let err = client.sign_up("a@b.co", "123").await.unwrap_err();
        assert!(matches!(err, RemoteError::Auth(AuthFailure::WeakPassword)));
    }

    #[tokio::test]
    async fn test_google_sign_in() {
        let client = client(&serve(identity_router()).await);
        let session = client.sign_in_with_google("google-token").await.unwrap();

        assert_eq!(session.user.provider, AuthProvider::Google);
        assert!(session.user.is_new_user);
        assert_eq!(session.user.display_name.as_deref(), Some("Grace"));
    }

    #[tokio::test]
    async fn test_phone_flow() {
        let client = client(&serve(identity_router()).await);

        let verification = client
            .send_phone_code("+15551234567", "recaptcha")
            .await
            .unwrap();
        assert_eq!(verification.session_info, "session-xyz");

        let err = client
            .sign_in_with_phone(&verification, "000000")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RemoteError::Auth(AuthFailure::InvalidVerificationCode)
        ));

        let session = client
            .sign_in_with_phone(&verification, "123456")
            .await
            .unwrap();
        assert_eq!(session.user.phone.as_deref(), Some("+15551234567"));
        assert_eq!(session.user.provider, AuthProvider::Phone);
    }

    #[tokio::test]
    async fn test_update_reset_and_refresh() {
        let client = client(&serve(identity_router()).await);

        client
            .update_profile("id-1", Some("Ada"), None)
            .await
            .unwrap();
        client.send_password_reset("ada@example.com").await.unwrap();

        let session = client
            .sign_in_with_password("ada@example.com", "secret1")
            .await
            .unwrap();
        let refreshed = client.refresh(&session).await.unwrap();
        assert_eq!(refreshed.id_token, "id-2");
        assert_eq!(refreshed.refresh_token, "refresh-2");
        assert_eq!(refreshed.user.uid, "uid-1");
    }

    #[test]
    fn test_empty_api_key_rejected() {
        let err = IdentityConfig::new(
            " ",
            DEFAULT_IDENTITY_URL,
            DEFAULT_TOKEN_URL,
            Duration::from_secs(15),
        )
        .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_session_expiry() {
        let session = AuthSession {
            user: AuthUser {
                uid: "u".into(),
                email: None,
                phone: None,
                display_name: None,
                photo_url: None,
                provider: AuthProvider::Password,
                is_new_user: false,
            },
            id_token: "t".into(),
            refresh_token: "r".into(),
            expires_at: Instant::now() + Duration::from_secs(60),
        };
        assert!(session.needs_refresh());
        assert!(!session.is_expired());
        assert!(session.remaining_secs() <= 60);
    }

    #[test]
    fn test_oversized_expires_in_falls_back() {
        let before = Instant::now();
        let at = expires_at(Some("18446744073709551615"));
        assert!(at > before);
        assert!(at <= Instant::now() + Duration::from_secs(DEFAULT_EXPIRES_IN_SECS));

        let at = expires_at(Some("not a number"));
        assert!(at > before + Duration::from_secs(DEFAULT_EXPIRES_IN_SECS - 5));
    }
}
