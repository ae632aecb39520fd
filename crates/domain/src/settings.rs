//! Session layer settings.
//!
//! Every field has a default so partial configuration files work.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::identity::Role;

/// Top-level settings for guards, transport and invalidation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GuardSettings {
    /// Login and landing routes.
    pub routes: RouteSettings,
    /// Backend API settings.
    pub api: ApiSettings,
    /// Which failures invalidate which session.
    pub invalidation: InvalidationSettings,
    /// Client-side cache keys and locations.
    pub storage: StorageSettings,
}

/// Client-side routes used by the redirect policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteSettings {
    /// Buyer login page.
    pub buyer_login_path: String,
    /// Vendor login page.
    pub vendor_login_path: String,
    /// Landing page for visitors with no navigation history.
    pub site_root: String,
    /// Where a buyer lands after login when no return path is known.
    pub buyer_home: String,
    /// Where a vendor lands after login when no return path is known.
    pub vendor_home: String,
}

impl Default for RouteSettings {
    fn default() -> Self {
        Self {
            buyer_login_path: "/login".to_string(),
            vendor_login_path: "/vendor/login".to_string(),
            site_root: "/".to_string(),
            buyer_home: "/".to_string(),
            vendor_home: "/vendor/dashboard".to_string(),
        }
    }
}

impl RouteSettings {
    /// Login page for a role.
    #[must_use]
    pub fn login_path(&self, role: Role) -> &str {
        match role {
            Role::Buyer => &self.buyer_login_path,
            Role::Vendor => &self.vendor_login_path,
        }
    }

    /// Post-login landing page for a role.
    #[must_use]
    pub fn home(&self, role: Role) -> &str {
        match role {
            Role::Buyer => &self.buyer_home,
            Role::Vendor => &self.vendor_home,
        }
    }
}

/// Backend API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Base URL relative request targets are resolved against.
    pub base_url: String,
    /// Profile endpoint used by the vendor guard's soft-verify.
    pub vendor_profile_endpoint: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            vendor_profile_endpoint: "/api/vendor/profile".to_string(),
            timeout_ms: 30_000,
        }
    }
}

/// Maps an API path prefix to the session it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceRule {
    /// Path prefix, matched on segment boundaries.
    pub prefix: String,
    /// Session invalidated by auth failures under this prefix.
    pub role: Role,
}

impl NamespaceRule {
    /// Creates a rule.
    #[must_use]
    pub fn new(prefix: impl Into<String>, role: Role) -> Self {
        Self {
            prefix: prefix.into(),
            role,
        }
    }

    /// Returns true if `path` is the prefix itself or lies below it.
    ///
    /// `/api/vendor` matches `/api/vendor/orders` but not `/api/vendors`.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        let prefix = self.prefix.trim_end_matches('/');
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

/// Which failures count as a server-side session rejection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvalidationSettings {
    /// Status codes that invalidate a session.
    pub statuses: Vec<u16>,
    /// Namespaces guarded by the interceptor. Only the vendor API is
    /// guarded by default; buyer sessions expire through their cookie.
    pub namespaces: Vec<NamespaceRule>,
}

impl Default for InvalidationSettings {
    fn default() -> Self {
        Self {
            statuses: vec![401, 403],
            namespaces: vec![NamespaceRule::new("/api/vendor", Role::Vendor)],
        }
    }
}

impl InvalidationSettings {
    /// Returns the role whose session a failure on `path` with `status`
    /// invalidates, if any.
    #[must_use]
    pub fn role_for(&self, status: u16, path: &str) -> Option<Role> {
        if !self.statuses.contains(&status) {
            return None;
        }
        self.namespaces
            .iter()
            .find(|rule| rule.matches(path))
            .map(|rule| rule.role)
    }
}

/// Client-side cache keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Cache key of the buyer identity record.
    pub buyer_key: String,
    /// Cache key of the vendor identity record.
    pub vendor_key: String,
    /// Directory of the durable cache. Defaults to the platform data dir.
    pub durable_dir: Option<PathBuf>,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            buyer_key: "bazaar.session.buyer".to_string(),
            vendor_key: "bazaar.session.vendor".to_string(),
            durable_dir: None,
        }
    }
}

impl StorageSettings {
    /// Cache key for a role.
    #[must_use]
    pub fn key(&self, role: Role) -> &str {
        match role {
            Role::Buyer => &self.buyer_key,
            Role::Vendor => &self.vendor_key,
        }
    }
}
