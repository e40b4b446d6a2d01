//! Fixtures and in-process fakes for the shell's unit tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;

use bazaar_core::{AuthProvider, AuthUser, Category, Product, ProductPage};
use bazaar_db::{Database, DbConfig, MemoryKeyValueStore};
use bazaar_remote::{
    AuthFailure, AuthSession, IdentityProvider, PhoneVerification, ProductCatalog, RemoteError,
    RemoteResult,
};

use crate::state::PreferenceStore;

pub(crate) fn product(id: i64, price_cents: i64) -> Product {
    Product {
        id,
        title: format!("Product {}", id),
        description: String::new(),
        category: if id % 2 == 0 { "even" } else { "odd" }.to_string(),
        brand: None,
        price_cents,
        discount_bps: 0,
        rating: 0.0,
        rating_count: 0,
        stock: 10,
        thumbnail: None,
        images: Vec::new(),
        tags: Vec::new(),
        dimensions: None,
        reviews: Vec::new(),
        warranty_information: None,
        shipping_information: None,
        return_policy: None,
        availability_status: None,
        minimum_order_quantity: 1,
    }
}

pub(crate) async fn memory_db() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

// =============================================================================
// Catalog
// =============================================================================

pub(crate) struct FakeCatalog {
    products: Vec<Product>,
    timeout: AtomicBool,
}

impl FakeCatalog {
    /// Products 1..=count at $1.00 each.
    pub(crate) fn with_products(count: i64) -> Self {
        FakeCatalog {
            products: (1..=count).map(|id| product(id, 100)).collect(),
            timeout: AtomicBool::new(false),
        }
    }

    pub(crate) fn fail_with_timeout(&self) {
        self.timeout.store(true, Ordering::SeqCst);
    }

    fn check(&self) -> RemoteResult<()> {
        if self.timeout.load(Ordering::SeqCst) {
            return Err(RemoteError::Timeout { secs: 15 });
        }
        Ok(())
    }

    fn page(&self, matching: Vec<Product>, limit: u64, skip: u64) -> ProductPage {
        ProductPage {
            total: matching.len() as u64,
            products: matching
                .into_iter()
                .skip(skip as usize)
                .take(limit as usize)
                .collect(),
            skip,
            limit,
        }
    }
}

#[async_trait]
impl ProductCatalog for FakeCatalog {
    async fn list_products(&self, limit: u64, skip: u64) -> RemoteResult<ProductPage> {
        self.check()?;
        Ok(self.page(self.products.clone(), limit, skip))
    }

    async fn get_product(&self, id: i64) -> RemoteResult<Product> {
        self.check()?;
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(RemoteError::Api {
                status: 404,
                message: format!("Product with id '{}' not found", id),
            })
    }

    async fn search_products(&self, query: &str, limit: u64, skip: u64) -> RemoteResult<ProductPage> {
        self.check()?;
        let matching = self
            .products
            .iter()
            .filter(|p| p.title.to_lowercase().contains(&query.to_lowercase()))
            .cloned()
            .collect();
        Ok(self.page(matching, limit, skip))
    }

    async fn products_by_category(
        &self,
        slug: &str,
        limit: u64,
        skip: u64,
    ) -> RemoteResult<ProductPage> {
        self.check()?;
        let matching = self
            .products
            .iter()
            .filter(|p| p.category == slug)
            .cloned()
            .collect();
        Ok(self.page(matching, limit, skip))
    }

    async fn categories(&self) -> RemoteResult<Vec<Category>> {
        self.check()?;
        Ok(vec![Category::from_name("even"), Category::from_name("odd")])
    }

    async fn store_products(&self) -> RemoteResult<Vec<Product>> {
        self.check()?;
        Ok(self.products.clone())
    }

    async fn store_products_by_category(&self, name: &str) -> RemoteResult<Vec<Product>> {
        self.check()?;
        Ok(self
            .products
            .iter()
            .filter(|p| p.category == name)
            .cloned()
            .collect())
    }

    async fn store_categories(&self) -> RemoteResult<Vec<String>> {
        self.check()?;
        Ok(vec!["even".into(), "odd".into()])
    }
}

// =============================================================================
// Identity
// =============================================================================

pub(crate) const GOOD_PASSWORD: &str = "secret1";
pub(crate) const GOOD_CODE: &str = "123456";

pub(crate) fn session_for(uid: &str, ttl: Duration) -> AuthSession {
    AuthSession {
        user: AuthUser {
            uid: uid.to_string(),
            email: None,
            phone: None,
            display_name: None,
            photo_url: None,
            provider: AuthProvider::Password,
            is_new_user: false,
        },
        id_token: format!("id-{}", uid),
        refresh_token: format!("refresh-{}", uid),
        expires_at: Instant::now() + ttl,
    }
}

#[derive(Default)]
pub(crate) struct FakeIdentity {
    refreshes: AtomicUsize,
    reject_refresh: AtomicBool,
    updates: Mutex<Vec<(Option<String>, Option<String>)>>,
    resets: Mutex<Vec<String>>,
}

impl FakeIdentity {
    pub(crate) fn refresh_count(&self) -> usize {
        self.refreshes.load(Ordering::SeqCst)
    }

    pub(crate) fn reject_refresh(&self) {
        self.reject_refresh.store(true, Ordering::SeqCst);
    }

    /// `(display_name, photo_url)` pairs sent to `update_profile`.
    pub(crate) fn updates(&self) -> Vec<(Option<String>, Option<String>)> {
        self.updates.lock().unwrap().clone()
    }

    pub(crate) fn resets(&self) -> Vec<String> {
        self.resets.lock().unwrap().clone()
    }

    fn session(&self, uid: String, provider: AuthProvider, is_new_user: bool) -> AuthSession {
        let mut session = session_for(&uid, Duration::from_secs(3600));
        session.user.provider = provider;
        session.user.is_new_user = is_new_user;
        session
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentity {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> RemoteResult<AuthSession> {
        if password != GOOD_PASSWORD {
            return Err(RemoteError::Auth(AuthFailure::InvalidCredentials));
        }
        let mut session = self.session(format!("uid-{}", email), AuthProvider::Password, false);
        session.user.email = Some(email.to_string());
        Ok(session)
    }

    async fn sign_up(&self, email: &str, _password: &str) -> RemoteResult<AuthSession> {
        let mut session = self.session(format!("uid-{}", email), AuthProvider::Password, true);
        session.user.email = Some(email.to_string());
        Ok(session)
    }

    async fn sign_in_with_google(&self, google_id_token: &str) -> RemoteResult<AuthSession> {
        let mut session = self.session(
            format!("uid-{}", google_id_token),
            AuthProvider::Google,
            google_id_token == "new-user",
        );
        session.user.display_name = Some("Grace Hopper".into());
        session.user.email = Some("grace@example.com".into());
        Ok(session)
    }

    async fn send_phone_code(
        &self,
        phone: &str,
        _recaptcha_token: &str,
    ) -> RemoteResult<PhoneVerification> {
        Ok(PhoneVerification {
            phone: phone.to_string(),
            session_info: "session-1".into(),
        })
    }

    async fn sign_in_with_phone(
        &self,
        verification: &PhoneVerification,
        code: &str,
    ) -> RemoteResult<AuthSession> {
        if code != GOOD_CODE {
            return Err(RemoteError::Auth(AuthFailure::InvalidVerificationCode));
        }
        let mut session = self.session(
            format!("uid-{}", verification.phone),
            AuthProvider::Phone,
            false,
        );
        session.user.phone = Some(verification.phone.clone());
        Ok(session)
    }

    async fn update_profile(
        &self,
        _id_token: &str,
        display_name: Option<&str>,
        photo_url: Option<&str>,
    ) -> RemoteResult<()> {
        self.updates.lock().unwrap().push((
            display_name.map(str::to_string),
            photo_url.map(str::to_string),
        ));
        Ok(())
    }

    async fn send_password_reset(&self, email: &str) -> RemoteResult<()> {
        self.resets.lock().unwrap().push(email.to_string());
        Ok(())
    }

    async fn refresh(&self, session: &AuthSession) -> RemoteResult<AuthSession> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        if self.reject_refresh.load(Ordering::SeqCst) {
            return Err(RemoteError::Auth(AuthFailure::SessionExpired));
        }
        Ok(AuthSession {
            user: session.user.clone(),
            id_token: format!("refreshed-{}", session.user.uid),
            refresh_token: session.refresh_token.clone(),
            expires_at: Instant::now() + Duration::from_secs(3600),
        })
    }
}

// =============================================================================
// Preferences
// =============================================================================

pub(crate) async fn loaded_prefs() -> PreferenceStore {
    let prefs = PreferenceStore::new(Arc::new(MemoryKeyValueStore::new()));
    prefs.load().await;
    prefs
}
