//! Address-bar locations.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// The visible parts of a location: path, query and fragment.
///
/// `query` and `hash` are stored without their leading `?` / `#`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Path component, always starting with `/`.
    pub path: String,
    /// Query string without the leading `?`.
    #[serde(default)]
    pub query: String,
    /// Fragment without the leading `#`.
    #[serde(default)]
    pub hash: String,
}

impl Location {
    /// Creates a location with only a path.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: normalize_path(path.into()),
            query: String::new(),
            hash: String::new(),
        }
    }

    /// Sets the query string. A leading `?` is accepted and dropped.
    #[must_use]
    pub fn with_query(mut self, query: impl AsRef<str>) -> Self {
        self.query = query.as_ref().trim_start_matches('?').to_string();
        self
    }

    /// Sets the fragment. A leading `#` is accepted and dropped.
    #[must_use]
    pub fn with_hash(mut self, hash: impl AsRef<str>) -> Self {
        self.hash = hash.as_ref().trim_start_matches('#').to_string();
        self
    }

    /// Parses either an absolute URL or a site-relative target such as
    /// `/vendor/orders?page=2#top`.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        if let Ok(url) = Url::parse(input)
            && url.has_host()
        {
            return Self::from_url(&url);
        }

        let (before_hash, hash) = input.split_once('#').unwrap_or((input, ""));
        let (path, query) = before_hash.split_once('?').unwrap_or((before_hash, ""));

        Self::new(path).with_query(query).with_hash(hash)
    }

    /// Builds a location from an absolute URL, dropping scheme and host.
    #[must_use]
    pub fn from_url(url: &Url) -> Self {
        Self::new(url.path())
            .with_query(url.query().unwrap_or_default())
            .with_hash(url.fragment().unwrap_or_default())
    }

    /// Rebuilds `path?query#hash`, omitting empty parts.
    #[must_use]
    pub fn target(&self) -> String {
        let mut target = self.path.clone();
        if !self.query.is_empty() {
            target.push('?');
            target.push_str(&self.query);
        }
        if !self.hash.is_empty() {
            target.push('#');
            target.push_str(&self.hash);
        }
        target
    }

    /// Compares paths, ignoring a trailing slash.
    #[must_use]
    pub fn is_path(&self, path: &str) -> bool {
        trim_trailing_slash(&self.path) == trim_trailing_slash(path)
    }

    /// Returns true if both locations point at the same path.
    #[must_use]
    pub fn same_path(&self, other: &Self) -> bool {
        self.is_path(&other.path)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new("/")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.target())
    }
}

fn normalize_path(path: String) -> String {
    if path.is_empty() {
        "/".to_string()
    } else if path.starts_with('/') {
        path
    } else {
        format!("/{path}")
    }
}

fn trim_trailing_slash(path: &str) -> &str {
    if path.len() > 1 {
        path.trim_end_matches('/')
    } else {
        path
    }
}
