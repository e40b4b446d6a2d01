//! # Domain Types
//!
//! Core domain types used throughout Bazaar.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Profile      │   │ PreferenceState │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (i64)       │   │  user_id        │   │  first_login    │       │
//! │  │  title          │   │  address        │   │  logged_in      │       │
//! │  │  price_cents    │   │  bank details   │   │  dark_mode      │       │
//! │  │  discount_bps   │   │  updated_at     │   │  loading        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiscountRate   │   │  ProductPage    │   │    AuthUser     │       │
//! │  │  bps (u32)      │   │  products       │   │  uid, email     │       │
//! │  │  717 = 7.17%    │   │  total/skip/lim │   │  provider       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Category { slug, name }   Address / BankDetails (inside Profile)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Immutability
//! A `Product` is created from an API response and never mutated. Cart and
//! wishlist entries hold their own snapshot of it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Discount Rate
// =============================================================================

/// Discount rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 717 bps = 7.17%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct DiscountRate(u32);

impl DiscountRate {
    /// Creates a discount rate from basis points, capped at 100%.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        if bps > 10_000 {
            DiscountRate(10_000)
        } else {
            DiscountRate(bps)
        }
    }

    /// Creates a discount rate from a percentage as sent by the catalog API.
    ///
    /// Negative or non-finite values are treated as no discount.
    pub fn from_percentage(pct: f64) -> Self {
        if !pct.is_finite() || pct <= 0.0 {
            return DiscountRate::zero();
        }
        DiscountRate::from_bps((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        DiscountRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

// =============================================================================
// Product
// =============================================================================

/// Physical dimensions reported by the catalog (centimetres).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
    pub depth: f64,
}

/// A customer review attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    /// Star rating, 0-5.
    pub rating: u8,
    pub comment: String,
    pub date: Option<DateTime<Utc>>,
    pub reviewer_name: String,
    pub reviewer_email: Option<String>,
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Catalog identifier; unique within one catalog host.
    pub id: i64,

    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub brand: Option<String>,

    /// List price in cents.
    pub price_cents: i64,

    /// Discount in basis points (0 when the catalog has none).
    #[serde(default)]
    pub discount_bps: u32,

    /// Average rating, 0.0-5.0.
    #[serde(default)]
    pub rating: f32,

    /// Number of ratings behind `rating` (0 when unknown).
    #[serde(default)]
    pub rating_count: u32,

    /// Units in stock. Hosts that do not report stock yield 0.
    #[serde(default)]
    pub stock: i64,

    #[serde(default)]
    pub thumbnail: Option<String>,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub dimensions: Option<Dimensions>,

    #[serde(default)]
    pub reviews: Vec<Review>,

    #[serde(default)]
    pub warranty_information: Option<String>,

    #[serde(default)]
    pub shipping_information: Option<String>,

    #[serde(default)]
    pub return_policy: Option<String>,

    #[serde(default)]
    pub availability_status: Option<String>,

    #[serde(default = "default_minimum_order_quantity")]
    pub minimum_order_quantity: u32,
}

fn default_minimum_order_quantity() -> u32 {
    1
}

impl Product {
    /// Returns the list price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    #[inline]
    pub fn discount_rate(&self) -> DiscountRate {
        DiscountRate::from_bps(self.discount_bps)
    }

    /// Price after the catalog discount.
    pub fn discounted_price(&self) -> Money {
        self.price().apply_discount(self.discount_rate())
    }

    /// Image shown in lists: the thumbnail, else the first gallery image.
    pub fn primary_image(&self) -> Option<&str> {
        self.thumbnail
            .as_deref()
            .or_else(|| self.images.first().map(String::as_str))
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// One page of a paged catalog listing.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    /// Total products matching the query on the server.
    pub total: u64,
    pub skip: u64,
    pub limit: u64,
}

impl ProductPage {
    /// Whether another page exists after this one.
    pub fn has_more(&self) -> bool {
        self.skip + (self.products.len() as u64) < self.total
    }

    /// `skip` value for the next page request.
    pub fn next_skip(&self) -> u64 {
        self.skip + self.products.len() as u64
    }
}

/// A catalog category.
///
/// Hosts that only return plain names get `slug == name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Value used in `/products/category/{slug}` requests.
    pub slug: String,
    /// Human-readable label.
    pub name: String,
}

impl Category {
    pub fn from_name(name: impl Into<String>) -> Self {
        let name = name.into();
        Category {
            slug: name.clone(),
            name,
        }
    }
}

// =============================================================================
// Preferences
// =============================================================================

/// Process-wide preference flags.
///
/// ## Defaults
/// A fresh install has never logged in, so it sees onboarding after its
/// first login. `is_loading` stays true until the durable store has been
/// read, and flips to false exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceState {
    pub is_first_login: bool,
    pub is_logged_in: bool,
    pub is_dark_mode: bool,
    pub is_loading: bool,
}

impl Default for PreferenceState {
    fn default() -> Self {
        PreferenceState {
            is_first_login: true,
            is_logged_in: false,
            is_dark_mode: false,
            is_loading: true,
        }
    }
}

/// Keys of the three persisted flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    FirstLogin,
    LoggedIn,
    DarkMode,
}

impl PreferenceKey {
    pub const ALL: [PreferenceKey; 3] = [
        PreferenceKey::FirstLogin,
        PreferenceKey::LoggedIn,
        PreferenceKey::DarkMode,
    ];

    /// Key under which the flag is stored in the preference file.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PreferenceKey::FirstLogin => "is_first_login",
            PreferenceKey::LoggedIn => "is_logged_in",
            PreferenceKey::DarkMode => "is_dark_mode",
        }
    }

    /// Value used when the store has never seen this key.
    pub const fn default_value(&self) -> bool {
        match self {
            PreferenceKey::FirstLogin => true,
            PreferenceKey::LoggedIn | PreferenceKey::DarkMode => false,
        }
    }
}

impl std::fmt::Display for PreferenceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Profile
// =============================================================================

/// Postal address on a profile. Empty strings mean "not provided".
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Address {
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.line1.is_empty() && self.city.is_empty() && self.postal_code.is_empty()
    }

    /// Single-line rendering used on the checkout screen.
    pub fn one_line(&self) -> String {
        [
            &self.line1,
            &self.line2,
            &self.city,
            &self.state,
            &self.postal_code,
            &self.country,
        ]
        .iter()
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.trim())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Bank account used for refunds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BankDetails {
    pub account_holder: String,
    pub account_number: String,
    pub bank_name: String,
    /// IFSC / routing code.
    pub ifsc: String,
}

impl BankDetails {
    /// Account number with all but the last four digits masked.
    pub fn masked_account_number(&self) -> String {
        let digits: Vec<char> = self.account_number.chars().collect();
        if digits.len() <= 4 {
            return self.account_number.clone();
        }
        let visible: String = digits[digits.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(digits.len() - 4), visible)
    }
}

/// Per-user profile, keyed by the identity provider's user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub display_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Address,
    pub bank: BankDetails,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// Creates an empty profile for a freshly signed-in user.
    pub fn new(user_id: impl Into<String>) -> Self {
        Profile {
            user_id: user_id.into(),
            display_name: String::new(),
            email: None,
            phone: None,
            address: Address::default(),
            bank: BankDetails::default(),
            updated_at: Utc::now(),
        }
    }

    /// Seeds a profile from what the identity provider knows.
    pub fn from_auth_user(user: &AuthUser) -> Self {
        Profile {
            display_name: user.display_name.clone().unwrap_or_default(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            ..Profile::new(user.uid.clone())
        }
    }
}

// =============================================================================
// Auth
// =============================================================================

/// How a user signed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthProvider {
    Password,
    Google,
    Phone,
}

/// The signed-in user as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub provider: AuthProvider,
    /// True when the provider created the account during this sign-in.
    pub is_new_user: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================


#[cfg(test)]
mod tests {
    use super::fixtures::product;
    use super::*;

    #[test]
    fn test_discount_rate_from_percentage() {
        assert_eq!(DiscountRate::from_percentage(7.17).bps(), 717);
        assert_eq!(DiscountRate::from_percentage(-3.0).bps(), 0);
        assert_eq!(DiscountRate::from_percentage(250.0).bps(), 10_000);
    }

    #[test]
    fn test_discounted_price() {
        let mut p = product(1, 10_000);
        p.discount_bps = 1000;
        assert_eq!(p.discounted_price().cents(), 9_000);
    }

    #[test]
    fn test_primary_image_falls_back_to_gallery() {
        let mut p = product(1, 100);
        assert_eq!(p.primary_image(), None);

        p.images = vec!["a.png".into(), "b.png".into()];
        assert_eq!(p.primary_image(), Some("a.png"));

        p.thumbnail = Some("thumb.png".into());
        assert_eq!(p.primary_image(), Some("thumb.png"));
    }

    #[test]
    fn test_product_page_paging() {
        let page = ProductPage {
            products: vec![product(1, 1), product(2, 1)],
            total: 5,
            skip: 2,
            limit: 2,
        };
        assert!(page.has_more());
        assert_eq!(page.next_skip(), 4);

        let last = ProductPage {
            products: vec![product(5, 1)],
            total: 5,
            skip: 4,
            limit: 2,
        };
        assert!(!last.has_more());
    }

    #[test]
    fn test_preference_defaults() {
        let prefs = PreferenceState::default();
        assert!(prefs.is_first_login);
        assert!(!prefs.is_logged_in);
        assert!(prefs.is_loading);
        for key in PreferenceKey::ALL {
            let expected = match key {
                PreferenceKey::FirstLogin => prefs.is_first_login,
                PreferenceKey::LoggedIn => prefs.is_logged_in,
                PreferenceKey::DarkMode => prefs.is_dark_mode,
            };
            assert_eq!(key.default_value(), expected);
        }
    }

    #[test]
    fn test_masked_account_number() {
        let bank = BankDetails {
            account_number: "123456789012".into(),
            ..Default::default()
        };
        assert_eq!(bank.masked_account_number(), "********9012");

        let short = BankDetails {
            account_number: "12".into(),
            ..Default::default()
        };
        assert_eq!(short.masked_account_number(), "12");
    }

    #[test]
    fn test_address_one_line_skips_blanks() {
        let address = Address {
            line1: "12 Market St".into(),
            city: "Springfield".into(),
            postal_code: "12345".into(),
            ..Default::default()
        };
        assert_eq!(address.one_line(), "12 Market St, Springfield, 12345");
        assert!(!address.is_empty());
        assert!(Address::default().is_empty());
    }
}
