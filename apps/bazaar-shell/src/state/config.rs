//! # Shell Configuration
//!
//! Settings for the remote hosts, timeouts and on-device file locations.
//!
//! ## Configuration File (`bazaar.toml`)
//! ```toml
//! [catalog]
//! catalog_url = "https://dummyjson.com/"
//! store_url = "https://fakestoreapi.com/"
//! timeout_secs = 15
//! page_size = 20
//!
//! [identity]
//! api_key = "AIza..."
//! identity_url = "https://identitytoolkit.googleapis.com/v1/"
//! token_url = "https://securetoken.googleapis.com/v1/"
//!
//! [app]
//! splash_delay_ms = 2000
//! # database_path = "/custom/bazaar.db"
//! # preferences_path = "/custom/bazaar_preferences.toml"
//! ```
//!
//! ## Load Order (later overrides earlier)
//! 1. Default values
//! 2. Config file
//! 3. `BAZAAR_*` environment variables

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use bazaar_core::validation::validate_page_size;
use bazaar_core::{DEFAULT_SPLASH_DELAY_MS, PREFERENCE_FILE_NAME};
use bazaar_remote::{
    CatalogConfig, IdentityConfig, RemoteResult, DEFAULT_CATALOG_URL, DEFAULT_IDENTITY_URL,
    DEFAULT_STORE_URL, DEFAULT_TOKEN_URL,
};

use crate::error::ConfigError;

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "bazaar.toml";

/// Database file name inside the platform data directory.
pub const DATABASE_FILE_NAME: &str = "bazaar.db";

/// Longest splash the config may ask for.
const MAX_SPLASH_DELAY_MS: u64 = 10_000;

// =============================================================================
// Sections
// =============================================================================

/// Catalog hosts and paging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogSettings {
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,

    #[serde(default = "default_store_url")]
    pub store_url: String,

    /// Per-request ceiling in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_store_url() -> String {
    DEFAULT_STORE_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_page_size() -> u64 {
    20
}

impl Default for CatalogSettings {
    fn default() -> Self {
        CatalogSettings {
            catalog_url: default_catalog_url(),
            store_url: default_store_url(),
            timeout_secs: default_timeout_secs(),
            page_size: default_page_size(),
        }
    }
}

/// Identity provider.
///
/// An empty `api_key` disables sign-in; the catalog still works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentitySettings {
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_identity_url")]
    pub identity_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,
}

fn default_identity_url() -> String {
    DEFAULT_IDENTITY_URL.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

impl Default for IdentitySettings {
    fn default() -> Self {
        IdentitySettings {
            api_key: String::new(),
            identity_url: default_identity_url(),
            token_url: default_token_url(),
        }
    }
}

/// Startup and storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_splash_delay_ms")]
    pub splash_delay_ms: u64,

    /// Overrides the platform data directory location.
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    #[serde(default)]
    pub preferences_path: Option<PathBuf>,
}

fn default_splash_delay_ms() -> u64 {
    DEFAULT_SPLASH_DELAY_MS
}

impl Default for AppSettings {
    fn default() -> Self {
        AppSettings {
            splash_delay_ms: default_splash_delay_ms(),
            database_path: None,
            preferences_path: None,
        }
    }
}

// =============================================================================
// ShellConfig
// =============================================================================

/// Complete shell configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShellConfig {
    #[serde(default)]
    pub catalog: CatalogSettings,

    #[serde(default)]
    pub identity: IdentitySettings,

    #[serde(default)]
    pub app: AppSettings,
}

impl ShellConfig {
    /// Loads configuration from file, environment, and defaults.
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading shell config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load shell config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;

        info!(?path, "Shell config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("catalog.catalog_url", &self.catalog.catalog_url)?;
        check_url("catalog.store_url", &self.catalog.store_url)?;
        check_url("identity.identity_url", &self.identity.identity_url)?;
        check_url("identity.token_url", &self.identity.token_url)?;

        if self.catalog.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "catalog.timeout_secs must be greater than 0".into(),
            ));
        }

        validate_page_size(self.catalog.page_size)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if self.app.splash_delay_ms > MAX_SPLASH_DELAY_MS {
            return Err(ConfigError::Invalid(format!(
                "app.splash_delay_ms must be at most {}",
                MAX_SPLASH_DELAY_MS
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Applies overrides from any `BAZAAR_*` lookup.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("BAZAAR_CATALOG_URL") {
            debug!(url = %url, "Overriding catalog URL from environment");
            self.catalog.catalog_url = url;
        }

        if let Some(url) = lookup("BAZAAR_STORE_URL") {
            debug!(url = %url, "Overriding store URL from environment");
            self.catalog.store_url = url;
        }

        if let Some(secs) = lookup("BAZAAR_HTTP_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(s) => self.catalog.timeout_secs = s,
                Err(_) => warn!(value = %secs, "Ignoring non-numeric BAZAAR_HTTP_TIMEOUT_SECS"),
            }
        }

        if let Some(size) = lookup("BAZAAR_PAGE_SIZE") {
            if let Ok(s) = size.parse::<u64>() {
                self.catalog.page_size = s;
            }
        }

        if let Some(key) = lookup("BAZAAR_IDENTITY_API_KEY") {
            self.identity.api_key = key;
        }

        if let Some(url) = lookup("BAZAAR_IDENTITY_URL") {
            self.identity.identity_url = url;
        }

        if let Some(url) = lookup("BAZAAR_TOKEN_URL") {
            self.identity.token_url = url;
        }

        if let Some(ms) = lookup("BAZAAR_SPLASH_DELAY_MS") {
            if let Ok(ms) = ms.parse::<u64>() {
                debug!(splash_delay_ms = ms, "Overriding splash delay from environment");
                self.app.splash_delay_ms = ms;
            }
        }

        if let Some(path) = lookup("BAZAAR_DB_PATH") {
            self.app.database_path = Some(PathBuf::from(path));
        }

        if let Some(path) = lookup("BAZAAR_PREFERENCES_PATH") {
            self.app.preferences_path = Some(PathBuf::from(path));
        }
    }

    fn project_dirs() -> Option<directories::ProjectDirs> {
        directories::ProjectDirs::from("com", "bazaar", "shop")
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Derived Settings
    // =========================================================================

    /// Directory for the database, the preference file and profile images.
    pub fn data_dir(&self) -> PathBuf {
        if let Some(parent) = self
            .app
            .database_path
            .as_deref()
            .and_then(Path::parent)
            .filter(|p| !p.as_os_str().is_empty())
        {
            return parent.to_path_buf();
        }
        Self::project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn database_path(&self) -> PathBuf {
        self.app
            .database_path
            .clone()
            .unwrap_or_else(|| self.data_dir().join(DATABASE_FILE_NAME))
    }

    pub fn preferences_path(&self) -> PathBuf {
        self.app
            .preferences_path
            .clone()
            .unwrap_or_else(|| self.data_dir().join(format!("{}.toml", PREFERENCE_FILE_NAME)))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.catalog.timeout_secs)
    }

    pub fn splash_delay(&self) -> Duration {
        Duration::from_millis(self.app.splash_delay_ms)
    }

    pub fn catalog_config(&self) -> RemoteResult<CatalogConfig> {
        CatalogConfig::new(
            &self.catalog.catalog_url,
            &self.catalog.store_url,
            self.http_timeout(),
        )
    }

    /// `None` when no API key is configured.
    pub fn identity_config(&self) -> RemoteResult<Option<IdentityConfig>> {
        if self.identity.api_key.trim().is_empty() {
            return Ok(None);
        }
        IdentityConfig::new(
            self.identity.api_key.clone(),
            &self.identity.identity_url,
            &self.identity.token_url,
            self.http_timeout(),
        )
        .map(Some)
    }
}

fn check_url(field: &'static str, raw: &str) -> Result<(), ConfigError> {
    if !raw.starts_with("http://") && !raw.starts_with("https://") {
        return Err(ConfigError::InvalidUrl {
            field,
            reason: format!("must start with http:// or https://, got: {}", raw),
        });
    }
    Ok(())
}
