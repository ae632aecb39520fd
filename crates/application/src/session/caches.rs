//! Client caches mirroring the session store.
//!
//! A record is written to every cache on login and removed from every
//! cache on logout or invalidation. Individual cache failures are logged
//! and counted, never raised: an unavailable storage must not stop the
//! reachable ones from being cleared.

use std::fmt;
use std::sync::Arc;

use bazaar_domain::{IdentityRecord, Role, StorageSettings};
use tracing::{debug, warn};

use crate::ports::ClientCache;

/// The ordered set of caches holding identity records.
///
/// Order matters for reads: the first cache holding a valid record wins,
/// so register the durable cache before the session-scoped one.
#[derive(Clone)]
pub struct SessionCaches {
    caches: Vec<Arc<dyn ClientCache>>,
    keys: StorageSettings,
}

impl SessionCaches {
    /// Creates an empty set using the given keys.
    #[must_use]
    pub const fn new(keys: StorageSettings) -> Self {
        Self {
            caches: Vec::new(),
            keys,
        }
    }

    /// Registers a cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn ClientCache>) -> Self {
        self.caches.push(cache);
        self
    }

    /// Storage key for a role.
    #[must_use]
    pub fn key(&self, role: Role) -> &str {
        self.keys.key(role)
    }

    /// Writes `record` to every cache. Returns the number of failures.
    pub async fn write(&self, role: Role, record: &IdentityRecord) -> usize {
        let json = match serde_json::to_string(record) {
            Ok(json) => json,
            Err(error) => {
                warn!(%role, %error, "identity record could not be serialized");
                return self.caches.len();
            }
        };

        let key = self.key(role);
        let mut failures = 0;
        for cache in &self.caches {
            if let Err(error) = cache.set(key, &json).await {
                warn!(%role, cache = cache.name(), %error, "failed to cache identity");
                failures += 1;
            }
        }
        failures
    }

    /// Reads the first valid record for `role`.
    ///
    /// Malformed or unauthenticated entries are removed on the way.
    pub async fn read(&self, role: Role) -> Option<IdentityRecord> {
        let key = self.key(role);
        for cache in &self.caches {
            let raw = match cache.get(key).await {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(error) => {
                    debug!(%role, cache = cache.name(), %error, "cache unreadable");
                    continue;
                }
            };

            match serde_json::from_str::<IdentityRecord>(&raw) {
                Ok(record) if record.is_authenticated() && record.role == role => {
                    return Some(record);
                }
                Ok(_) => warn!(%role, cache = cache.name(), "discarding unauthenticated cached identity"),
                Err(error) => warn!(%role, cache = cache.name(), %error, "discarding malformed cached identity"),
            }

            if let Err(error) = cache.remove(key).await {
                debug!(%role, cache = cache.name(), %error, "could not discard cached identity");
            }
        }
        None
    }

    /// Removes `role`'s record from every cache. Returns the number of
    /// caches that could not be cleared.
    pub async fn purge(&self, role: Role) -> usize {
        let key = self.key(role);
        let mut failures = 0;
        for cache in &self.caches {
            if let Err(error) = cache.remove(key).await {
                warn!(%role, cache = cache.name(), %error, "failed to clear cached identity");
                failures += 1;
            }
        }
        failures
    }
}

impl fmt::Debug for SessionCaches {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.caches.iter().map(|cache| cache.name()).collect();
        f.debug_struct("SessionCaches")
            .field("caches", &names)
            .field("keys", &self.keys)
            .finish()
    }
}
