//! Identity records held by the client for each role.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{DomainError, DomainResult};

/// The two independent session flavors of the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// A shopper on the storefront.
    Buyer,
    /// A seller using the vendor dashboard.
    Vendor,
}

impl Role {
    /// Every role, in a stable order.
    pub const ALL: [Self; 2] = [Self::Buyer, Self::Vendor];

    /// Returns the role as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buyer => "buyer",
            Self::Vendor => "vendor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "buyer" | "user" => Ok(Self::Buyer),
            "vendor" => Ok(Self::Vendor),
            other => Err(DomainError::UnknownRole(other.to_string())),
        }
    }
}

/// The last-known profile of an authenticated visitor.
///
/// Only login, registration and logout flows write these; guards read
/// them. Extra profile fields returned by the backend are preserved in
/// `profile` and flattened back out when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentityRecord {
    /// Backend identifier.
    #[serde(default)]
    pub id: String,
    /// Login email. Empty means "not authenticated".
    #[serde(default)]
    pub email: String,
    /// Which session this record belongs to.
    pub role: Role,
    /// Any other profile fields.
    #[serde(flatten)]
    pub profile: BTreeMap<String, Value>,
}

impl IdentityRecord {
    /// Creates a record with no extra profile fields.
    #[must_use]
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
            role,
            profile: BTreeMap::new(),
        }
    }

    /// Adds a profile field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.profile.insert(key.into(), value.into());
        self
    }

    /// Returns a profile field by name.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.profile.get(key)
    }

    /// A record counts as authenticated iff its email is non-empty.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.email.trim().is_empty()
    }
}
