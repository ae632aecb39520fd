use bazaar_domain::{ApiSettings, Role};

/// How a guard confirms a stored identity before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// Render as soon as the store holds an authenticated record.
    TrustStore,
    /// GET `endpoint` through the shared transport first; any failure
    /// blocks rendering.
    SoftVerify {
        /// Profile endpoint to call.
        endpoint: String,
    },
}

/// The capability a guard checks: a role plus a verification mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardSpec {
    /// Session the guard requires.
    pub role: Role,
    /// Verification applied to the stored identity.
    pub verification: Verification,
}

impl GuardSpec {
    /// Buyer guard: trusts the store.
    #[must_use]
    pub const fn buyer() -> Self {
        Self {
            role: Role::Buyer,
            verification: Verification::TrustStore,
        }
    }

    /// Vendor guard: soft-verifies against `endpoint`.
    #[must_use]
    pub fn vendor(endpoint: impl Into<String>) -> Self {
        Self {
            role: Role::Vendor,
            verification: Verification::SoftVerify {
                endpoint: endpoint.into(),
            },
        }
    }

    /// The default guard for `role` under the given API settings.
    #[must_use]
    pub fn for_role(role: Role, api: &ApiSettings) -> Self {
        match role {
            Role::Buyer => Self::buyer(),
            Role::Vendor => Self::vendor(api.vendor_profile_endpoint.clone()),
        }
    }
}
