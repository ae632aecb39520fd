use std::collections::HashMap;

use async_trait::async_trait;
use bazaar_application::ports::{CacheError, ClientCache};
use tokio::sync::RwLock;

/// In-process cache scoped to the running session.
#[derive(Debug)]
pub struct MemoryCache {
    name: String,
    entries: RwLock<HashMap<String, String>>,
    available: bool,
}

impl MemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: RwLock::new(HashMap::new()),
            available: true,
        }
    }

    /// The per-session cache.
    #[must_use]
    pub fn session() -> Self {
        Self::new("session")
    }

    /// A cache whose every operation fails, as storage does in private
    /// browsing modes.
    #[must_use]
    pub fn unavailable(name: impl Into<String>) -> Self {
        Self {
            available: false,
            ..Self::new(name)
        }
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.available {
            Ok(())
        } else {
            Err(CacheError::Unavailable(self.name.clone()))
        }
    }
}

#[async_trait]
impl ClientCache for MemoryCache {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.check()?;
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.check()?;
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.check()?;
        self.entries.write().await.remove(key);
        Ok(())
    }
}
