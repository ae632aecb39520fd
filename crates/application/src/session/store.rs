//! Observable per-role session store.
//!
//! Each role has its own watch channel, so subscribers only wake when
//! their role's record actually changes value.

use std::sync::Arc;

use bazaar_domain::{IdentityRecord, Role};
use tokio::sync::watch;

type Slot = watch::Sender<Option<IdentityRecord>>;

/// Process-wide holder of the last-known identity per role.
///
/// Cloning is cheap and every clone shares the same slots.
#[derive(Debug, Clone)]
pub struct SessionStore {
    slots: Arc<Slots>,
}

#[derive(Debug)]
struct Slots {
    buyer: Slot,
    vendor: Slot,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Slots {
                buyer: watch::channel(None).0,
                vendor: watch::channel(None).0,
            }),
        }
    }

    fn slot(&self, role: Role) -> &Slot {
        match role {
            Role::Buyer => &self.slots.buyer,
            Role::Vendor => &self.slots.vendor,
        }
    }

    /// The stored record for `role`, authenticated or not.
    #[must_use]
    pub fn get(&self, role: Role) -> Option<IdentityRecord> {
        self.slot(role).borrow().clone()
    }

    /// The stored record for `role` if it passes the email predicate.
    #[must_use]
    pub fn authenticated(&self, role: Role) -> Option<IdentityRecord> {
        self.get(role).filter(IdentityRecord::is_authenticated)
    }

    /// Returns true if `role` has an authenticated record.
    #[must_use]
    pub fn is_authenticated(&self, role: Role) -> bool {
        self.slot(role)
            .borrow()
            .as_ref()
            .is_some_and(IdentityRecord::is_authenticated)
    }

    /// Replaces the record for `role`.
    ///
    /// Returns true if the value changed; identical writes notify nobody.
    pub fn set(&self, role: Role, record: IdentityRecord) -> bool {
        self.slot(role).send_if_modified(|current| {
            if current.as_ref() == Some(&record) {
                false
            } else {
                *current = Some(record);
                true
            }
        })
    }

    /// Clears the record for `role`, leaving the other role untouched.
    ///
    /// Returns true if a record was removed. Concurrent clears see
    /// exactly one `true`.
    pub fn clear(&self, role: Role) -> bool {
        self.slot(role).send_if_modified(|current| current.take().is_some())
    }

    /// Observes changes of `role`'s record.
    #[must_use]
    pub fn subscribe(&self, role: Role) -> watch::Receiver<Option<IdentityRecord>> {
        self.slot(role).subscribe()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
