//! # API Error Type
//!
//! Unified error type for shell commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Bazaar                                 │
//! │                                                                         │
//! │  UI                          Rust Shell                                 │
//! │  ──                          ──────────                                 │
//! │                                                                         │
//! │  load_products()                                                        │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Remote Error? ─── RemoteError::Timeout ──────────┐             │  │
//! │  │         │                                          │             │  │
//! │  │         ▼                                          ▼             │  │
//! │  │  Database Error? ─── DbError::QueryFailed ───── ApiError ──────►│  │
//! │  │         │                                          ▲             │  │
//! │  │         ▼                                          │             │  │
//! │  │  Validation Error? ─── CoreError::Validation ──────┘             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  UiState::from_result(result)                                           │
//! │    Failure("Request timed out. Please check your connection.")          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Internal details (SQL errors, raw HTTP bodies) are logged here and never
//! reach the message a screen shows.

use serde::Serialize;
use thiserror::Error;

use bazaar_core::{CoreError, ValidationError};
use bazaar_db::DbError;
use bazaar_remote::{AuthFailure, RemoteError};

/// Result type alias for shell commands.
pub type ApiResult<T> = Result<T, ApiError>;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "NETWORK_ERROR",
///   "message": "Request timed out. Please check your connection."
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Local storage operation failed
    DatabaseError,

    /// Cart or checkout rule violated
    CartError,

    /// Catalog or identity host unreachable / timed out
    NetworkError,

    /// Remote host answered with something unusable
    RemoteError,

    /// Sign-in rejected or session missing
    AuthError,

    /// App configuration is unusable
    ConfigError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a cart error.
    pub fn cart(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::CartError, message)
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ConstraintViolation { message } => {
                tracing::error!("Constraint violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid data")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Io(e) => {
                tracing::error!("Storage I/O failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Storage operation failed")
            }
            DbError::Serialization(e) => {
                tracing::error!("Stored data could not be decoded: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Stored data is corrupted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::CartTooLarge { max } => ApiError::new(
                ErrorCode::CartError,
                format!("Cart cannot have more than {} items", max),
            ),
            CoreError::QuantityTooLarge { requested, max } => ApiError::new(
                ErrorCode::ValidationError,
                format!("Quantity {} exceeds maximum allowed ({})", requested, max),
            ),
            CoreError::EmptyCheckout => ApiError::cart("Your cart is empty"),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

/// Converts remote errors to API errors.
///
/// The message is always `RemoteError::user_message()`; the detailed error
/// is logged.
impl From<RemoteError> for ApiError {
    fn from(err: RemoteError) -> Self {
        let code = match &err {
            RemoteError::Timeout { .. } | RemoteError::Connection(_) | RemoteError::Http(_) => {
                tracing::warn!("Remote host unreachable: {}", err);
                ErrorCode::NetworkError
            }
            RemoteError::Api { status: 404, .. } => ErrorCode::NotFound,
            RemoteError::Api { .. } | RemoteError::Parse(_) => {
                tracing::error!("Remote call failed: {}", err);
                ErrorCode::RemoteError
            }
            RemoteError::Auth(AuthFailure::Other(code)) => {
                tracing::error!(code = %code, "Unrecognized identity error");
                ErrorCode::AuthError
            }
            RemoteError::Auth(_) | RemoteError::NotSignedIn => ErrorCode::AuthError,
            RemoteError::InvalidConfig(_) | RemoteError::InvalidUrl(_) => {
                tracing::error!("Remote configuration invalid: {}", err);
                ErrorCode::ConfigError
            }
        };
        ApiError::new(code, err.user_message())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!("Configuration error: {}", err);
        ApiError::new(ErrorCode::ConfigError, "The app is misconfigured.")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ApiError {}

// =============================================================================
// Startup Errors
// =============================================================================

/// Failures while loading `bazaar.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid URL for {field}: {reason}")]
    InvalidUrl { field: &'static str, reason: String },
}

/// Failures that stop the shell from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database unavailable: {0}")]
    Database(#[from] DbError),

    #[error("Remote client setup failed: {0}")]
    Remote(#[from] RemoteError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_remote::TIMEOUT_MESSAGE;

    #[test]
    fn test_timeout_maps_to_network_error() {
        let err = ApiError::from(RemoteError::Timeout { secs: 15 });
        assert_eq!(err.code, ErrorCode::NetworkError);
        assert_eq!(err.message, TIMEOUT_MESSAGE);
    }

    #[test]
    fn test_query_failure_hides_details() {
        let err = ApiError::from(DbError::QueryFailed("no such table: profiles".into()));
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(!err.message.contains("profiles"));
    }

    #[test]
    fn test_core_errors() {
        let err = ApiError::from(CoreError::EmptyCheckout);
        assert_eq!(err.code, ErrorCode::CartError);

        let err = ApiError::from(CoreError::Validation(ValidationError::MustBePositive {
            field: "quantity".into(),
        }));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "quantity must be positive");
    }

    #[test]
    fn test_serialized_shape() {
        let err = ApiError::from(RemoteError::Auth(AuthFailure::WeakPassword));
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "AUTH_ERROR");
        assert_eq!(json["message"], "Password should be at least 6 characters.");
    }
}
