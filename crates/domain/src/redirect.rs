//! Login redirect policy.
//!
//! Computes where an unauthenticated visitor is sent, and reads the
//! return path back out of the login page's address.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::form_urlencoded;

use crate::identity::Role;
use crate::location::Location;
use crate::settings::RouteSettings;

/// Query parameter carrying the page to return to after login.
pub const NEXT_PARAM: &str = "next";

/// Query parameter carrying the [`LoginReason`].
pub const REASON_PARAM: &str = "reason";

/// Why the visitor is being sent to a login page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginReason {
    /// No session existed.
    Required,
    /// A previously valid session was rejected by the server.
    Expired,
}

impl LoginReason {
    /// Returns the reason as it appears in the login URL.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for LoginReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure login-URL computation over the configured routes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RedirectPolicy {
    routes: RouteSettings,
}

impl RedirectPolicy {
    /// Creates a policy over the given routes.
    #[must_use]
    pub const fn new(routes: RouteSettings) -> Self {
        Self { routes }
    }

    /// The configured routes.
    #[must_use]
    pub const fn routes(&self) -> &RouteSettings {
        &self.routes
    }

    /// Login page path for a role.
    #[must_use]
    pub fn login_path(&self, role: Role) -> &str {
        self.routes.login_path(role)
    }

    /// Returns true if `location` is the login page of `role`.
    #[must_use]
    pub fn is_login_page(&self, role: Role, location: &Location) -> bool {
        location.is_path(self.login_path(role))
    }

    /// Computes the URL to send the visitor to.
    ///
    /// - A visitor who needs to log in without navigation history (a deep
    ///   link in a fresh tab) gets the site root, so they are not stranded
    ///   on a login page. Expiry redirects always target the login page.
    /// - Buyers go to the fixed buyer login page.
    /// - Vendors go to the vendor login page with `reason` and `next`,
    ///   where `next` encodes `path?query#hash` of `current`.
    #[must_use]
    pub fn compute_login_url(
        &self,
        role: Role,
        current: &Location,
        reason: LoginReason,
        has_history: bool,
    ) -> String {
        if !has_history && reason == LoginReason::Required {
            return self.routes.site_root.clone();
        }

        match role {
            Role::Buyer => self.routes.buyer_login_path.clone(),
            Role::Vendor => {
                let query = form_urlencoded::Serializer::new(String::new())
                    .append_pair(REASON_PARAM, reason.as_str())
                    .append_pair(NEXT_PARAM, &current.target())
                    .finish();
                format!("{}?{query}", self.routes.vendor_login_path)
            }
        }
    }

    /// Extracts the post-login return path from a login page location.
    ///
    /// Only same-site absolute paths are accepted; anything that could
    /// leave the site (`//host`, `https://…`, backslashes) yields `None`.
    #[must_use]
    pub fn return_path(&self, login_location: &Location) -> Option<String> {
        let next = form_urlencoded::parse(login_location.query.as_bytes())
            .find(|(key, _)| key == NEXT_PARAM)
            .map(|(_, value)| value.into_owned())?;

        let is_local = next.starts_with('/') && !next.starts_with("//") && !next.contains('\\');
        let target = Location::parse(&next);
        let is_login = Role::ALL
            .iter()
            .any(|&role| self.is_login_page(role, &target));

        (is_local && !is_login).then_some(next)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn policy() -> RedirectPolicy {
        RedirectPolicy::new(RouteSettings::default())
    }

    fn next_of(url: &str) -> Option<String> {
        let query = url.split_once('?').map(|(_, q)| q).unwrap_or_default();
        form_urlencoded::parse(query.as_bytes())
            .find(|(k, _)| k == NEXT_PARAM)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn test_vendor_next_round_trips_path_and_query() {
        let loc = Location::new("/vendor/orders").with_query("?page=2");
        let url = policy().compute_login_url(Role::Vendor, &loc, LoginReason::Expired, true);

        assert!(url.starts_with("/vendor/login?"));
        assert!(url.contains("reason=expired"));
        assert_eq!(next_of(&url).as_deref(), Some("/vendor/orders?page=2"));
    }

    #[test]
    fn test_vendor_next_keeps_fragment() {
        let loc = Location::parse("/vendor/products?q=a b&sort=new#grid");
        let url = policy().compute_login_url(Role::Vendor, &loc, LoginReason::Required, true);

        assert!(url.contains("reason=required"));
        assert_eq!(
            next_of(&url).as_deref(),
            Some("/vendor/products?q=a b&sort=new#grid")
        );
    }

    #[test]
    fn test_buyer_login_has_no_return_path() {
        let loc = Location::new("/account/orders");
        let url = policy().compute_login_url(Role::Buyer, &loc, LoginReason::Required, true);
        assert_eq!(url, "/login");
    }

    #[test]
    fn test_no_history_login_required_goes_to_site_root() {
        let loc = Location::new("/vendor/orders");
        for role in Role::ALL {
            let url = policy().compute_login_url(role, &loc, LoginReason::Required, false);
            assert_eq!(url, "/");
        }
    }

    #[test]
    fn test_no_history_expiry_keeps_login_and_return_path() {
        let loc = Location::new("/vendor/orders").with_query("page=2");
        let url = policy().compute_login_url(Role::Vendor, &loc, LoginReason::Expired, false);

        assert_eq!(url, "/vendor/login?reason=expired&next=%2Fvendor%2Forders%3Fpage%3D2");
    }

    #[test]
    fn test_is_login_page() {
        assert!(policy().is_login_page(Role::Vendor, &Location::parse("/vendor/login?reason=expired")));
        assert!(!policy().is_login_page(Role::Buyer, &Location::new("/vendor/login")));
    }

    #[test]
    fn test_return_path_accepts_local_paths() {
        let loc = Location::new("/vendor/orders").with_query("page=2");
        let url = policy().compute_login_url(Role::Vendor, &loc, LoginReason::Expired, true);

        let login = Location::parse(&url);
        assert_eq!(
            policy().return_path(&login).as_deref(),
            Some("/vendor/orders?page=2")
        );
    }

    #[test]
    fn test_return_path_rejects_offsite_targets() {
        for next in ["https://evil.example", "//evil.example/x", "/\\evil", "vendor/orders"] {
            let query = form_urlencoded::Serializer::new(String::new())
                .append_pair(NEXT_PARAM, next)
                .finish();
            let login = Location::new("/vendor/login").with_query(query);
            assert_eq!(policy().return_path(&login), None, "accepted {next}");
        }
    }

    #[test]
    fn test_return_path_rejects_login_pages() {
        let login = Location::new("/vendor/login").with_query("next=%2Fvendor%2Flogin");
        assert_eq!(policy().return_path(&login), None);
    }

    #[test]
    fn test_return_path_missing() {
        let login = Location::new("/vendor/login").with_query("reason=required");
        assert_eq!(policy().return_path(&login), None);
    }
}
