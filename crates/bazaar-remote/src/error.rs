//! # Remote Error Types
//!
//! Error types for catalog and identity calls.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Remote Error Categories                            │
//! │                                                                         │
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │  Configuration  │  │   Transport     │  │     Response            │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  InvalidConfig  │  │  Timeout        │  │  Api {status, message}  │ │
//! │  │  InvalidUrl     │  │  Connection     │  │  Parse                  │ │
//! │  │                 │  │  Http           │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! │                                                                         │
//! │  ┌─────────────────────────────────────┐                               │
//! │  │  Identity                           │                               │
//! │  │  Auth(AuthFailure)  NotSignedIn     │                               │
//! │  └─────────────────────────────────────┘                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here is retried. `user_message()` gives the text a screen shows.

use thiserror::Error;

/// Result type alias for remote operations.
pub type RemoteResult<T> = Result<T, RemoteError>;

/// Text shown for any request that hit the HTTP timeout.
pub const TIMEOUT_MESSAGE: &str = "Request timed out. Please check your connection.";

/// Remote call failures.
#[derive(Debug, Error)]
pub enum RemoteError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Invalid client configuration.
    #[error("Invalid remote configuration: {0}")]
    InvalidConfig(String),

    /// A base URL or path could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    // =========================================================================
    // Transport Errors
    // =========================================================================
    /// The request exceeded the configured ceiling.
    #[error("Request timed out after {secs} seconds")]
    Timeout { secs: u64 },

    /// Could not connect to the host.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Any other HTTP client failure.
    #[error("HTTP error: {0}")]
    Http(String),

    // =========================================================================
    // Response Errors
    // =========================================================================
    /// Non-success status from the server.
    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    /// Body was not the JSON shape expected even with lenient parsing.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    // =========================================================================
    // Identity Errors
    // =========================================================================
    /// The identity provider rejected the request.
    #[error("Authentication failed: {0}")]
    Auth(AuthFailure),

    /// An operation needs a signed-in user and there is none.
    #[error("Not signed in")]
    NotSignedIn,
}

/// Identity provider rejection reasons, decoded from its error codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    InvalidCredentials,
    EmailExists,
    WeakPassword,
    UserDisabled,
    TooManyAttempts,
    InvalidVerificationCode,
    SessionExpired,
    InvalidIdpToken,
    /// Any code not listed above, kept verbatim.
    Other(String),
}

impl AuthFailure {
    /// Decodes a provider error message such as `"WEAK_PASSWORD : Password
    /// should be at least 6 characters"`.
    pub fn from_code(message: &str) -> Self {
        let code = message.split(" : ").next().unwrap_or(message).trim();
        match code {
            "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS"
            | "INVALID_EMAIL" => AuthFailure::InvalidCredentials,
            "EMAIL_EXISTS" => AuthFailure::EmailExists,
            "WEAK_PASSWORD" => AuthFailure::WeakPassword,
            "USER_DISABLED" => AuthFailure::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => AuthFailure::TooManyAttempts,
            "INVALID_CODE" | "INVALID_VERIFICATION_CODE" => AuthFailure::InvalidVerificationCode,
            "SESSION_EXPIRED" | "TOKEN_EXPIRED" | "INVALID_ID_TOKEN" | "INVALID_REFRESH_TOKEN" => {
                AuthFailure::SessionExpired
            }
            "INVALID_IDP_RESPONSE" => AuthFailure::InvalidIdpToken,
            other => AuthFailure::Other(other.to_string()),
        }
    }

    pub fn user_message(&self) -> &str {
        match self {
            AuthFailure::InvalidCredentials => "Incorrect email or password.",
            AuthFailure::EmailExists => "An account with this email already exists.",
            AuthFailure::WeakPassword => "Password should be at least 6 characters.",
            AuthFailure::UserDisabled => "This account has been disabled.",
            AuthFailure::TooManyAttempts => "Too many attempts. Please try again later.",
            AuthFailure::InvalidVerificationCode => "The verification code is invalid.",
            AuthFailure::SessionExpired => "Your session has expired. Please sign in again.",
            AuthFailure::InvalidIdpToken => "Google sign-in failed. Please try again.",
            AuthFailure::Other(_) => "Authentication failed. Please try again.",
        }
    }
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthFailure::Other(code) => f.write_str(code),
            known => write!(f, "{:?}", known),
        }
    }
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<url::ParseError> for RemoteError {
    fn from(err: url::ParseError) -> Self {
        RemoteError::InvalidUrl(err.to_string())
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        RemoteError::Parse(err.to_string())
    }
}

/// Convert reqwest errors to RemoteError.
///
/// ## Error Mapping
/// ```text
/// is_timeout()  → Timeout   (secs filled in by the client)
/// is_connect()  → Connection
/// is_decode()   → Parse
/// is_status()   → Api
/// Other         → Http
/// ```
impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RemoteError::Timeout { secs: 0 }
        } else if err.is_connect() {
            RemoteError::Connection(err.to_string())
        } else if err.is_decode() {
            RemoteError::Parse(err.to_string())
        } else if let Some(status) = err.status() {
            RemoteError::Api {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            RemoteError::Http(err.to_string())
        }
    }
}

// =============================================================================
// Error Categorization
// =============================================================================

impl RemoteError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, RemoteError::Timeout { .. })
    }

    /// Returns true if the host could not be reached at all.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            RemoteError::Timeout { .. } | RemoteError::Connection(_) | RemoteError::Http(_)
        )
    }

    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            RemoteError::InvalidConfig(_) | RemoteError::InvalidUrl(_)
        )
    }

    /// Text a screen can show as-is.
    pub fn user_message(&self) -> String {
        match self {
            RemoteError::Timeout { .. } => TIMEOUT_MESSAGE.to_string(),
            RemoteError::Connection(_) | RemoteError::Http(_) => {
                "Unable to reach the server. Please check your connection.".to_string()
            }
            RemoteError::Api { status: 404, .. } => "Not found.".to_string(),
            RemoteError::Api { .. } => "The server could not complete the request.".to_string(),
            RemoteError::Parse(_) => "Received an unexpected response from the server.".to_string(),
            RemoteError::Auth(failure) => failure.user_message().to_string(),
            RemoteError::NotSignedIn => "Please sign in to continue.".to_string(),
            RemoteError::InvalidConfig(_) | RemoteError::InvalidUrl(_) => {
                "The app is misconfigured.".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_message() {
        let err = RemoteError::Timeout { secs: 15 };
        assert!(err.is_timeout());
        assert!(err.is_network());
        assert_eq!(err.user_message(), TIMEOUT_MESSAGE);
        assert_eq!(err.to_string(), "Request timed out after 15 seconds");
    }

    #[test]
    fn test_auth_failure_from_code() {
        assert_eq!(
            AuthFailure::from_code("EMAIL_NOT_FOUND"),
            AuthFailure::InvalidCredentials
        );
        assert_eq!(
            AuthFailure::from_code("WEAK_PASSWORD : Password should be at least 6 characters"),
            AuthFailure::WeakPassword
        );
        assert_eq!(
            AuthFailure::from_code("SOMETHING_NEW"),
            AuthFailure::Other("SOMETHING_NEW".into())
        );
    }

    #[test]
    fn test_categories() {
        assert!(RemoteError::InvalidUrl("x".into()).is_config_error());
        assert!(!RemoteError::Parse("x".into()).is_network());
        assert_eq!(
            RemoteError::Auth(AuthFailure::EmailExists).user_message(),
            "An account with this email already exists."
        );
    }
}
