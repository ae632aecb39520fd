//! Session lifecycle events.
//!
//! Events are serializable so they can be written to shared storage and
//! replayed in other tabs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::Role;
use crate::redirect::LoginReason;

/// A change to one role's session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A login or registration stored a new identity.
    Established {
        /// Affected role.
        role: Role,
        /// When it happened.
        at: DateTime<Utc>,
    },
    /// The server rejected a session the client believed valid.
    Invalidated {
        /// Affected role.
        role: Role,
        /// Reason passed on to the login page.
        reason: LoginReason,
        /// When it happened.
        at: DateTime<Utc>,
    },
    /// The visitor logged out.
    LoggedOut {
        /// Affected role.
        role: Role,
        /// When it happened.
        at: DateTime<Utc>,
    },
}

impl SessionEvent {
    /// The role this event concerns.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Established { role, .. }
            | Self::Invalidated { role, .. }
            | Self::LoggedOut { role, .. } => *role,
        }
    }

    /// When the event happened.
    #[must_use]
    pub const fn at(&self) -> DateTime<Utc> {
        match self {
            Self::Established { at, .. } | Self::Invalidated { at, .. } | Self::LoggedOut { at, .. } => {
                *at
            }
        }
    }

    /// Returns true if this event ends the role's session.
    #[must_use]
    pub const fn ends_session(&self) -> bool {
        matches!(self, Self::Invalidated { .. } | Self::LoggedOut { .. })
    }
}
