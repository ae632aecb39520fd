use std::sync::Arc;

use bazaar_domain::{IdentityRecord, RedirectPolicy, Role, SessionEvent};
use tracing::{debug, info};

use super::ExpiryNotifier;
use crate::error::{ApplicationError, ApplicationResult};
use crate::ports::Navigator;

/// Login, logout and startup flows over the session store and caches.
#[derive(Clone)]
pub struct SessionService {
    notifier: ExpiryNotifier,
    navigator: Arc<dyn Navigator>,
    policy: RedirectPolicy,
}

impl SessionService {
    /// Creates a session service.
    #[must_use]
    pub fn new(notifier: ExpiryNotifier, navigator: Arc<dyn Navigator>, policy: RedirectPolicy) -> Self {
        Self {
            notifier,
            navigator,
            policy,
        }
    }

    /// The notifier this service emits through.
    #[must_use]
    pub const fn notifier(&self) -> &ExpiryNotifier {
        &self.notifier
    }

    /// Stores an authenticated identity for `role`.
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Unauthenticated` if the record has no
    /// email or belongs to another role. Cache failures are tolerated.
    pub async fn establish(&self, role: Role, record: IdentityRecord) -> ApplicationResult<()> {
        if record.role != role || !record.is_authenticated() {
            return Err(ApplicationError::Unauthenticated { role });
        }

        let cache_failures = self.notifier.caches().write(role, &record).await;
        self.notifier.store().set(role, record);
        info!(%role, cache_failures, "session established");
        self.notifier.emit(SessionEvent::Established {
            role,
            at: self.notifier.now(),
        });
        Ok(())
    }

    /// Establishes the session, then leaves the login page for the
    /// validated return path or the role's home. Returns the destination.
    ///
    /// # Errors
    ///
    /// Same as [`Self::establish`]; nothing is navigated on error.
    pub async fn complete_login(&self, role: Role, record: IdentityRecord) -> ApplicationResult<String> {
        self.establish(role, record).await?;

        let current = self.navigator.current_location();
        let destination = self
            .policy
            .return_path(&current)
            .unwrap_or_else(|| self.policy.routes().home(role).to_string());
        debug!(%role, to = %destination, "leaving login page");
        self.navigator.replace(&destination);
        Ok(destination)
    }

    /// Ends `role`'s session. Returns true if a session was active.
    pub async fn logout(&self, role: Role) -> bool {
        let cache_failures = self.notifier.caches().purge(role).await;
        let cleared = self.notifier.store().clear(role);
        if cleared {
            info!(%role, cache_failures, "logged out");
            self.notifier.emit(SessionEvent::LoggedOut {
                role,
                at: self.notifier.now(),
            });
        }
        cleared
    }

    /// Loads every role from the caches into the store. Returns the number
    /// of roles restored.
    pub async fn hydrate(&self) -> usize {
        let mut restored = 0;
        for role in Role::ALL {
            if let Some(record) = self.notifier.caches().read(role).await {
                self.notifier.store().set(role, record);
                restored += 1;
            }
        }
        info!(restored, "session store hydrated");
        restored
    }

    /// Applies an event observed in another tab.
    ///
    /// Local events are emitted as usual, so a bridge forwarding this
    /// notifier's events must not forward the ones it just applied.
    pub async fn apply_remote(&self, event: &SessionEvent) {
        debug!(?event, "applying remote session event");
        match *event {
            SessionEvent::Invalidated { role, reason, .. } => {
                self.notifier.invalidate(role, reason).await;
            }
            SessionEvent::LoggedOut { role, .. } => {
                self.logout(role).await;
            }
            SessionEvent::Established { role, .. } => {
                if let Some(record) = self.notifier.caches().read(role).await {
                    self.notifier.store().set(role, record);
                }
            }
        }
    }
}
