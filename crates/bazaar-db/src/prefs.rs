//! # Preference Key-Value Store
//!
//! Durable storage for the boolean preference flags.
//!
//! ## Backends
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       KeyValueStore (trait)                             │
//! │                                                                         │
//! │   ┌───────────────────────────────┐   ┌─────────────────────────────┐  │
//! │   │ TomlPreferenceFile            │   │ MemoryKeyValueStore         │  │
//! │   │  <dir>/bazaar_preferences.toml│   │  HashMap behind a Mutex     │  │
//! │   │                               │   │  (tests, ephemeral runs)    │  │
//! │   │  is_first_login = false       │   │                             │  │
//! │   │  is_logged_in = true          │   │                             │  │
//! │   │  is_dark_mode = false         │   │                             │  │
//! │   └───────────────────────────────┘   └─────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomic Writes
//! The TOML file is rewritten as a whole: serialize to `<name>.toml.tmp`,
//! then rename over the original. A crash mid-write leaves the previous
//! file intact.
//!
//! Keys that are absent, or hold a non-boolean value, read as `None`; the
//! caller falls back to the key's default.
//!
//! A file that no longer parses is reported by reads. The next write
//! replaces it with a fresh table holding only the written flag.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};

/// Durable map of boolean flags.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads one flag. `None` when the key has never been written.
    async fn get_bool(&self, key: &str) -> DbResult<Option<bool>>;

    /// Writes one flag.
    async fn set_bool(&self, key: &str, value: bool) -> DbResult<()>;

    /// Reads every stored flag.
    async fn load_all(&self) -> DbResult<BTreeMap<String, bool>>;
}

// =============================================================================
// TOML File Backend
// =============================================================================

/// Preference flags stored in a small TOML file.
#[derive(Debug)]
pub struct TomlPreferenceFile {
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: tokio::sync::Mutex<()>,
}

impl TomlPreferenceFile {
    /// Opens (lazily) the file at `path`. The file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        TomlPreferenceFile {
            path: path.into(),
            write_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Store named `<name>.toml` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>, name: &str) -> Self {
        Self::new(dir.as_ref().join(format!("{}.toml", name)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_table(&self) -> DbResult<BTreeMap<String, bool>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(e.into()),
        };

        let table: toml::Table = toml::from_str(&content).map_err(|e| {
            DbError::Serialization(format!(
                "Failed to parse preference file '{}': {}",
                self.path.display(),
                e
            ))
        })?;

        let mut flags = BTreeMap::new();
        for (key, value) in table {
            match value.as_bool() {
                Some(flag) => {
                    flags.insert(key, flag);
                }
                None => warn!(key = %key, "Ignoring non-boolean preference value"),
            }
        }
        Ok(flags)
    }

    async fn write_table(&self, flags: &BTreeMap<String, bool>) -> DbResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let content = toml::to_string(flags).map_err(DbError::serialization)?;
        let tmp_path = self.path.with_extension("toml.tmp");

        tokio::fs::write(&tmp_path, content).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for TomlPreferenceFile {
    async fn get_bool(&self, key: &str) -> DbResult<Option<bool>> {
        Ok(self.read_table().await?.get(key).copied())
    }

    async fn set_bool(&self, key: &str, value: bool) -> DbResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut flags = match self.read_table().await {
            Ok(flags) => flags,
            Err(DbError::Serialization(e)) => {
                warn!(error = %e, "Discarding unreadable preference file");
                BTreeMap::new()
            }
            Err(e) => return Err(e),
        };
        flags.insert(key.to_string(), value);
        self.write_table(&flags).await?;

        debug!(key = %key, value, path = %self.path.display(), "Preference persisted");
        Ok(())
    }

    async fn load_all(&self) -> DbResult<BTreeMap<String, bool>> {
        self.read_table().await
    }
}

// =============================================================================
// In-Memory Backend
// =============================================================================

/// Non-durable store for tests and throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, bool>>,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `values`.
    pub fn with_values<'a>(values: impl IntoIterator<Item = (&'a str, bool)>) -> Self {
        let map = values
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        MemoryKeyValueStore {
            values: Mutex::new(map),
        }
    }

    fn lock(&self) -> DbResult<std::sync::MutexGuard<'_, HashMap<String, bool>>> {
        self.values
            .lock()
            .map_err(|_| DbError::Internal("Preference map lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get_bool(&self, key: &str) -> DbResult<Option<bool>> {
        Ok(self.lock()?.get(key).copied())
    }

    async fn set_bool(&self, key: &str, value: bool) -> DbResult<()> {
        self.lock()?.insert(key.to_string(), value);
        Ok(())
    }

    async fn load_all(&self) -> DbResult<BTreeMap<String, bool>> {
        Ok(self
            .lock()?
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::PREFERENCE_FILE_NAME;

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlPreferenceFile::in_dir(dir.path(), PREFERENCE_FILE_NAME);

        assert_eq!(store.get_bool("is_logged_in").await.unwrap(), None);
        assert!(store.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_values_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlPreferenceFile::in_dir(dir.path(), PREFERENCE_FILE_NAME);

        store.set_bool("is_logged_in", true).await.unwrap();
        store.set_bool("is_first_login", false).await.unwrap();
        store.set_bool("is_logged_in", false).await.unwrap();

        let reopened = TomlPreferenceFile::in_dir(dir.path(), PREFERENCE_FILE_NAME);
        assert_eq!(reopened.get_bool("is_logged_in").await.unwrap(), Some(false));
        assert_eq!(reopened.get_bool("is_first_login").await.unwrap(), Some(false));
        assert_eq!(reopened.load_all().await.unwrap().len(), 2);
        assert!(dir.path().join("bazaar_preferences.toml").exists());
        assert!(!dir.path().join("bazaar_preferences.toml.tmp").exists());
    }

    #[tokio::test]
    async fn test_non_boolean_values_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        std::fs::write(&path, "is_dark_mode = \"yes\"\nis_logged_in = true\n").unwrap();

        let store = TomlPreferenceFile::new(&path);
        assert_eq!(store.get_bool("is_dark_mode").await.unwrap(), None);
        assert_eq!(store.get_bool("is_logged_in").await.unwrap(), Some(true));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.toml");
        std::fs::write(&path, "this is [not toml").unwrap();

        let store = TomlPreferenceFile::new(&path);
        assert!(matches!(
            store.load_all().await,
            Err(DbError::Serialization(_))
        ));
    }

    #[tokio::test]
    async fn test_write_replaces_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlPreferenceFile::in_dir(dir.path(), PREFERENCE_FILE_NAME);
        std::fs::write(store.path(), "is_logged_in = [not toml").unwrap();

        store.set_bool("is_logged_in", true).await.unwrap();

        let reopened = TomlPreferenceFile::in_dir(dir.path(), PREFERENCE_FILE_NAME);
        assert_eq!(reopened.get_bool("is_logged_in").await.unwrap(), Some(true));
        assert_eq!(reopened.load_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = TomlPreferenceFile::new(dir.path().join("nested/deeper/prefs.toml"));

        store.set_bool("is_dark_mode", true).await.unwrap();
        assert_eq!(store.get_bool("is_dark_mode").await.unwrap(), Some(true));
    }

    #[tokio::test]
    async fn test_memory_store() {
        let store = MemoryKeyValueStore::with_values([("is_logged_in", true)]);
        assert_eq!(store.get_bool("is_logged_in").await.unwrap(), Some(true));

        store.set_bool("is_dark_mode", true).await.unwrap();
        assert_eq!(store.load_all().await.unwrap().len(), 2);
    }
}
