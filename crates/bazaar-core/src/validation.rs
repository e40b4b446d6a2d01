//! # Validation Module
//!
//! Input validation utilities for Bazaar.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Screen                                                       │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Shell command (Rust)                                         │
//! │  └── THIS MODULE: business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Remote identity provider / SQLite                            │
//! │  ├── Credential checks (wrong password, unknown account)               │
//! │  └── NOT NULL / PRIMARY KEY constraints                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use bazaar_core::validation::{validate_email, validate_quantity};
//!
//! validate_email("ada@example.com").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::types::Profile;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Minimum password length accepted by the identity provider.
pub const MIN_PASSWORD_LEN: usize = 6;

// =============================================================================
// Credential Validators
// =============================================================================

/// Validates an email address.
///
/// ## Rules
/// - Must not be empty
/// - At most 254 characters
/// - Exactly one `@`, non-empty local part, domain containing a dot
///
/// ## Returns
/// The trimmed email.
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_email;
///
/// assert!(validate_email("ada@example.com").is_ok());
/// assert!(validate_email("ada@localhost").is_err());
/// assert!(validate_email("").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let invalid = || ValidationError::InvalidFormat {
        field: "email".to_string(),
        reason: "must look like name@example.com".to_string(),
    };

    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty()
        || domain.contains('@')
        || email.chars().any(char::is_whitespace)
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
    {
        return Err(invalid());
    }

    Ok(email.to_string())
}

/// Validates a password for sign-up / sign-in.
///
/// ## Rules
/// - Must not be empty
/// - At least [`MIN_PASSWORD_LEN`] characters
///
/// Passwords are never trimmed.
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.is_empty() {
        return Err(ValidationError::Required {
            field: "password".to_string(),
        });
    }

    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: MIN_PASSWORD_LEN,
        });
    }

    Ok(())
}

/// Validates a phone number in E.164 form.
///
/// ## Rules
/// - Leading `+`, then 8 to 15 digits
/// - Spaces and hyphens are stripped first
///
/// ## Returns
/// The normalized number, e.g. `+15551234567`.
///
/// ## Example
/// ```rust
/// use bazaar_core::validation::validate_phone;
///
/// assert_eq!(validate_phone("+1 555-123-4567").unwrap(), "+15551234567");
/// assert!(validate_phone("5551234567").is_err());
/// ```
pub fn validate_phone(phone: &str) -> ValidationResult<String> {
    let normalized: String = phone
        .trim()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect();

    if normalized.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    let digits = normalized.strip_prefix('+').ok_or_else(|| ValidationError::InvalidFormat {
        field: "phone".to_string(),
        reason: "must start with a country code, e.g. +1".to_string(),
    })?;

    if !digits.chars().all(|c| c.is_ascii_digit()) || !(8..=15).contains(&digits.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain 8 to 15 digits".to_string(),
        });
    }

    Ok(normalized)
}

/// Validates a one-time SMS verification code (6 digits).
pub fn validate_verification_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "verification code".to_string(),
        });
    }
    if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "verification code".to_string(),
            reason: "must be 6 digits".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Profile Validators
// =============================================================================

/// Validates a display name.
///
/// ## Rules
/// - Must not be empty
/// - At most 100 characters
pub fn validate_display_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.chars().count() > 100 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
    }

    Ok(())
}

/// Validates an IFSC / routing code: 4 letters, a `0`, then 6 alphanumerics.
pub fn validate_ifsc(code: &str) -> ValidationResult<()> {
    let code = code.trim();
    let chars: Vec<char> = code.chars().collect();

    let valid = chars.len() == 11
        && chars[..4].iter().all(|c| c.is_ascii_uppercase())
        && chars[4] == '0'
        && chars[5..].iter().all(|c| c.is_ascii_alphanumeric());

    if !valid {
        return Err(ValidationError::InvalidFormat {
            field: "ifsc".to_string(),
            reason: "must look like ABCD0123456".to_string(),
        });
    }

    Ok(())
}

/// Validates a bank account number: 6 to 20 digits.
pub fn validate_account_number(number: &str) -> ValidationResult<()> {
    let number = number.trim();
    if !number.chars().all(|c| c.is_ascii_digit()) || !(6..=20).contains(&number.len()) {
        return Err(ValidationError::InvalidFormat {
            field: "account number".to_string(),
            reason: "must contain 6 to 20 digits".to_string(),
        });
    }
    Ok(())
}

/// Validates a profile before it is saved.
///
/// ## Rules
/// - `user_id` and display name are required
/// - Email and phone, when present, must be well formed
/// - Bank details are optional as a group; once any bank field is filled
///   in, account number and IFSC must both be valid
pub fn validate_profile(profile: &Profile) -> ValidationResult<()> {
    if profile.user_id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "user_id".to_string(),
        });
    }

    validate_display_name(&profile.display_name)?;

    if let Some(email) = profile.email.as_deref().filter(|e| !e.trim().is_empty()) {
        validate_email(email)?;
    }

    if let Some(phone) = profile.phone.as_deref().filter(|p| !p.trim().is_empty()) {
        validate_phone(phone)?;
    }

    let bank = &profile.bank;
    let any_bank_field = [
        &bank.account_holder,
        &bank.account_number,
        &bank.bank_name,
        &bank.ifsc,
    ]
    .iter()
    .any(|f| !f.trim().is_empty());

    if any_bank_field {
        validate_account_number(&bank.account_number)?;
        validate_ifsc(&bank.ifsc)?;
    }

    Ok(())
}

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns the default listing)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates a catalog page size.
pub fn validate_page_size(limit: u64) -> ValidationResult<()> {
    if limit == 0 || limit > 100 {
        return Err(ValidationError::OutOfRange {
            field: "limit".to_string(),
            min: 1,
            max: 100,
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Product detail: Add to cart                                            │
/// │                                                                         │
/// │  User picks quantity: 5                                                │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(5) ← THIS FUNCTION                                  │
/// │       │                                                                 │
/// │       ├── qty <= 0? → Error: "quantity must be positive"               │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"     │
/// │       └── OK → Cart::add                                               │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
