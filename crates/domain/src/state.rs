//! Guard state machine for UI binding.
//!
//! A mounted guard moves through these states; only `Authorized` lets
//! the protected view render. Every other state is a blank frame.

use crate::identity::IdentityRecord;

/// Where the guard is being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderEnvironment {
    /// Server-side rendering: identity must not leak into markup.
    Server,
    /// Running in the client.
    #[default]
    Client,
}

/// Decision state of one mounted guard.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GuardState {
    /// Not evaluated yet, or evaluated on the server.
    #[default]
    Idle,

    /// No identity; navigation to `to` was requested.
    Redirecting {
        /// Navigation target.
        to: String,
    },

    /// Identity present, soft-verify outstanding.
    Verifying,

    /// The protected view may render.
    Authorized {
        /// The identity the view renders for.
        identity: IdentityRecord,
    },

    /// Soft-verify failed. The session itself is left alone.
    Unverified,

    /// The identity disappeared while mounted, or the visitor is
    /// already on the login page.
    Unauthenticated,
}

impl GuardState {
    /// Returns true if the protected view may render.
    #[must_use]
    pub const fn is_authorized(&self) -> bool {
        matches!(self, Self::Authorized { .. })
    }

    /// Returns true while a soft-verify is outstanding.
    #[must_use]
    pub const fn is_verifying(&self) -> bool {
        matches!(self, Self::Verifying)
    }

    /// Returns true once the guard has reached a decision.
    #[must_use]
    pub const fn is_settled(&self) -> bool {
        !matches!(self, Self::Idle | Self::Verifying)
    }

    /// Returns the authorized identity, if any.
    #[must_use]
    pub const fn identity(&self) -> Option<&IdentityRecord> {
        match self {
            Self::Authorized { identity } => Some(identity),
            _ => None,
        }
    }

    /// Short label for logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Redirecting { .. } => "redirecting",
            Self::Verifying => "verifying",
            Self::Authorized { .. } => "authorized",
            Self::Unverified => "unverified",
            Self::Unauthenticated => "unauthenticated",
        }
    }
}
