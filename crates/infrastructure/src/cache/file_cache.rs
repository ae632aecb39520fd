//! Durable client cache.
//!
//! All keys live in one JSON object file:
//! - Linux: ~/.local/share/bazaar/session.json
//! - macOS: ~/Library/Application Support/bazaar/session.json
//! - Windows: %APPDATA%/bazaar/session.json

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bazaar_application::ports::{CacheError, ClientCache};
use bazaar_domain::StorageSettings;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::warn;

use crate::serialization::{from_json_bytes, to_json_stable_bytes};

/// File name of the durable cache.
pub const DURABLE_FILE_NAME: &str = "session.json";

type Entries = BTreeMap<String, String>;

/// File-backed cache surviving restarts.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileCache {
    /// Creates a cache stored at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Creates a cache stored in `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(DURABLE_FILE_NAME))
    }

    /// Creates the cache configured by `settings`, defaulting to the
    /// platform data directory.
    ///
    /// # Errors
    ///
    /// Returns `CacheError::Unavailable` if no data directory exists.
    pub fn from_settings(settings: &StorageSettings) -> Result<Self, CacheError> {
        let dir = settings
            .durable_dir
            .clone()
            .or_else(|| dirs::data_dir().map(|p| p.join("bazaar")))
            .ok_or_else(|| CacheError::Unavailable("durable".to_string()))?;
        Ok(Self::in_dir(&dir))
    }

    /// Location of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// A missing file is empty; a corrupt one is treated as empty and
    /// replaced on the next write.
    async fn load(&self) -> Result<Entries, CacheError> {
        let content = match fs::read(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Entries::new()),
            Err(e) => return Err(CacheError::Io(e.to_string())),
        };

        match from_json_bytes(&content) {
            Ok(entries) => Ok(entries),
            Err(error) => {
                warn!(path = %self.path.display(), %error, "durable cache is corrupt, starting empty");
                Ok(Entries::new())
            }
        }
    }

    async fn save(&self, entries: &Entries) -> Result<(), CacheError> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .await
                .map_err(|e| CacheError::Io(e.to_string()))?;
        }
        let content = to_json_stable_bytes(entries).map_err(|e| CacheError::Malformed(e.to_string()))?;
        fs::write(&self.path, content)
            .await
            .map_err(|e| CacheError::Io(e.to_string()))
    }
}

#[async_trait]
impl ClientCache for FileCache {
    fn name(&self) -> &str {
        "durable"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries).await
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.save(&entries).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_set_get_remove() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::in_dir(dir.path());

        assert_eq!(cache.get("bazaar.session.vendor").await.unwrap(), None);

        cache.set("bazaar.session.vendor", "{\"email\":\"a@b.c\"}").await.unwrap();
        assert_eq!(
            cache.get("bazaar.session.vendor").await.unwrap().as_deref(),
            Some("{\"email\":\"a@b.c\"}")
        );

        cache.remove("bazaar.session.vendor").await.unwrap();
        assert_eq!(cache.get("bazaar.session.vendor").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        FileCache::in_dir(dir.path()).set("k", "v").await.unwrap();

        let reopened = FileCache::in_dir(dir.path());
        assert_eq!(reopened.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_remove_missing_key_does_not_create_file() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::in_dir(&dir.path().join("nested"));

        cache.remove("absent").await.unwrap();
        assert!(!cache.path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty_and_is_replaced() {
        let dir = TempDir::new().unwrap();
        let cache = FileCache::in_dir(dir.path());
        std::fs::write(cache.path(), b"{ not json").unwrap();

        assert_eq!(cache.get("k").await.unwrap(), None);
        cache.set("k", "v").await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn test_from_settings_uses_configured_dir() {
        let settings = StorageSettings {
            durable_dir: Some(PathBuf::from("/tmp/bazaar-test")),
            ..StorageSettings::default()
        };
        let cache = FileCache::from_settings(&settings).unwrap();
        assert_eq!(cache.path(), Path::new("/tmp/bazaar-test/session.json"));
    }
}
