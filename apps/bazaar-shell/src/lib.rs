//! # Bazaar Shell Library
//!
//! Core library for the Bazaar shopping client. Owns every state holder a
//! UI binds to and exposes the commands the screens invoke.
//!
//! ## Module Organization
//! ```text
//! bazaar_shell/
//! ├── lib.rs            ◄─── You are here (startup & App)
//! ├── state/
//! │   ├── mod.rs        ◄─── State type exports
//! │   ├── config.rs     ◄─── bazaar.toml + BAZAAR_* overrides
//! │   ├── cart.rs       ◄─── Cart state + SQLite mirror
//! │   ├── cart_cache.rs ◄─── Background cart cache writer
//! │   ├── wishlist.rs   ◄─── Favorites
//! │   ├── checkout.rs   ◄─── Checkout selection
//! │   ├── preferences.rs◄─── Observable persisted flags
//! │   ├── navigation.rs ◄─── Splash → login/onboarding/home
//! │   ├── session.rs    ◄─── Signed-in user and tokens
//! │   └── catalog.rs    ◄─── Home screen product feed
//! ├── commands/         ◄─── Operations invoked by screens
//! └── error.rs          ◄─── API error type for commands
//! ```
//!
//! ## State Management
//! Instead of a single lock around everything, each concern has its own
//! holder; [`App`] simply groups them so a UI can hand out references.

pub mod commands;
pub mod error;
pub mod state;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bazaar_core::BootstrapState;
use bazaar_db::{Database, DbConfig, TomlPreferenceFile};
use bazaar_remote::{CatalogClient, IdentityClient, IdentityProvider, ProductCatalog};

use error::{ConfigError, StartupError};
use state::{
    CartState, CheckoutState, NavigationState, PreferenceStore, ProductFeed, SessionState,
    ShellConfig, WishlistState,
};

/// Every state holder plus the clients the commands talk to.
pub struct App {
    pub config: ShellConfig,
    pub db: Database,
    pub catalog: Arc<dyn ProductCatalog>,
    pub cart: CartState,
    pub wishlist: WishlistState,
    pub checkout: CheckoutState,
    pub preferences: PreferenceStore,
    pub navigation: NavigationState,
    pub session: SessionState,
    pub feed: ProductFeed,
}

impl App {
    /// Builds the application state.
    ///
    /// ## Startup Sequence
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────────┐
    /// │                       Application Startup                               │
    /// │                                                                         │
    /// │  1. Validate Config ──────────────────────────────────────────────────► │
    /// │                                                                         │
    /// │  2. Create Data Directory ────────────────────────────────────────────► │
    /// │     • Linux: ~/.local/share/shop/                                       │
    /// │                                                                         │
    /// │  3. Connect to Database ──────────────────────────────────────────────► │
    /// │     • SQLite with WAL mode, pending migrations                          │
    /// │     • Restore cached cart lines                                         │
    /// │                                                                         │
    /// │  4. Open Preference File ─────────────────────────────────────────────► │
    /// │     • Publish stored flags, is_loading = false                          │
    /// │                                                                         │
    /// │  5. Build Remote Clients ─────────────────────────────────────────────► │
    /// │     • Catalog always; identity only with an API key                     │
    /// └─────────────────────────────────────────────────────────────────────────┘
    /// ```
    pub async fn start(config: ShellConfig) -> Result<App, StartupError> {
        config.validate()?;

        let data_dir = config.data_dir();
        tokio::fs::create_dir_all(&data_dir)
            .await
            .map_err(ConfigError::from)?;
        info!(data_dir = %data_dir.display(), "Data directory ready");

        let db = Database::new(DbConfig::new(config.database_path())).await?;
        let cart = CartState::restore(&db).await?;

        let preferences =
            PreferenceStore::new(Arc::new(TomlPreferenceFile::new(config.preferences_path())));
        preferences.load().await;

        let catalog: Arc<dyn ProductCatalog> =
            Arc::new(CatalogClient::new(config.catalog_config()?)?);

        let identity = match config.identity_config()? {
            Some(identity) => {
                let client: Arc<dyn IdentityProvider> = Arc::new(IdentityClient::new(identity)?);
                Some(client)
            }
            None => {
                warn!("No identity API key configured; sign-in is disabled");
                None
            }
        };

        info!("State initialized");
        Ok(App {
            navigation: NavigationState::new(config.splash_delay()),
            feed: ProductFeed::new(config.catalog.page_size),
            session: SessionState::new(identity),
            wishlist: WishlistState::new(),
            checkout: CheckoutState::new(),
            config,
            db,
            catalog,
            cart,
            preferences,
        })
    }

    /// Directory that holds the database, preferences and profile images.
    pub fn data_dir(&self) -> PathBuf {
        self.config.data_dir()
    }

    /// Shows the splash screen, then loads the product feed once the user
    /// lands on home.
    pub async fn bootstrap(&self) -> BootstrapState {
        let state = self.navigation.run(&self.preferences).await;
        if state == BootstrapState::Ready {
            self.feed.refresh(self.catalog.as_ref()).await;
        }
        state
    }

    /// Waits for queued cart and preference writes, then closes the pool.
    pub async fn shutdown(&self) {
        self.cart.flush().await;
        self.preferences.flush().await;
        self.db.close().await;
        info!("Shutdown complete");
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=bazaar=trace` - Show trace for bazaar crates only
/// - Default: INFO, DEBUG for bazaar crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,bazaar=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}
