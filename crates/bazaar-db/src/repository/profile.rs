//! # Profile Repository
//!
//! Per-user profile rows keyed by the identity provider's user id.
//!
//! Address and bank details are flattened into columns; the row struct
//! below is the only place that knows the column names.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use bazaar_core::{Address, BankDetails, Profile};

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    user_id: String,
    display_name: String,
    email: Option<String>,
    phone: Option<String>,
    address_line1: String,
    address_line2: String,
    city: String,
    state: String,
    postal_code: String,
    country: String,
    account_holder: String,
    account_number: String,
    bank_name: String,
    ifsc: String,
    updated_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            user_id: row.user_id,
            display_name: row.display_name,
            email: row.email,
            phone: row.phone,
            address: Address {
                line1: row.address_line1,
                line2: row.address_line2,
                city: row.city,
                state: row.state,
                postal_code: row.postal_code,
                country: row.country,
            },
            bank: BankDetails {
                account_holder: row.account_holder,
                account_number: row.account_number,
                bank_name: row.bank_name,
                ifsc: row.ifsc,
            },
            updated_at: row.updated_at,
        }
    }
}

/// Repository for user profiles.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: SqlitePool,
}

impl ProfileRepository {
    /// Creates a new ProfileRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProfileRepository { pool }
    }

    /// Gets a profile by user id.
    pub async fn get(&self, user_id: &str) -> DbResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT
                user_id, display_name, email, phone,
                address_line1, address_line2, city, state, postal_code, country,
                account_holder, account_number, bank_name, ifsc,
                updated_at
            FROM profiles
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Profile::from))
    }

    /// Inserts or fully replaces a profile.
    ///
    /// `updated_at` is stamped here; the stored profile is returned.
    pub async fn upsert(&self, profile: &Profile) -> DbResult<Profile> {
        let mut stored = profile.clone();
        stored.updated_at = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO profiles (
                user_id, display_name, email, phone,
                address_line1, address_line2, city, state, postal_code, country,
                account_holder, account_number, bank_name, ifsc,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ON CONFLICT (user_id) DO UPDATE SET
                display_name = excluded.display_name,
                email = excluded.email,
                phone = excluded.phone,
                address_line1 = excluded.address_line1,
                address_line2 = excluded.address_line2,
                city = excluded.city,
                state = excluded.state,
                postal_code = excluded.postal_code,
                country = excluded.country,
                account_holder = excluded.account_holder,
                account_number = excluded.account_number,
                bank_name = excluded.bank_name,
                ifsc = excluded.ifsc,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&stored.user_id)
        .bind(&stored.display_name)
        .bind(&stored.email)
        .bind(&stored.phone)
        .bind(&stored.address.line1)
        .bind(&stored.address.line2)
        .bind(&stored.address.city)
        .bind(&stored.address.state)
        .bind(&stored.address.postal_code)
        .bind(&stored.address.country)
        .bind(&stored.bank.account_holder)
        .bind(&stored.bank.account_number)
        .bind(&stored.bank.bank_name)
        .bind(&stored.bank.ifsc)
        .bind(stored.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(user_id = %stored.user_id, "Profile saved");
        Ok(stored)
    }

    /// Creates the profile on first login; leaves an existing one alone.
    ///
    /// Returns the profile as stored after the call.
    pub async fn ensure(&self, seed: &Profile) -> DbResult<Profile> {
        if let Some(existing) = self.get(&seed.user_id).await? {
            return Ok(existing);
        }
        self.upsert(seed).await
    }
}
