//! Expiry notifier.
//!
//! `invalidate` clears every client cache of a role, then the in-memory
//! store, then broadcasts `SessionEvent::Invalidated`. The store clear is
//! an atomic compare-and-notify, so concurrent invalidations of the same
//! session broadcast exactly once. `expire` is the server-rejection path
//! and broadcasts unconditionally.

use std::fmt;
use std::sync::Arc;

use bazaar_domain::{LoginReason, Role, SessionEvent};
use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::{SessionCaches, SessionStore};
use crate::ports::Clock;

/// Buffered events per subscriber before it starts lagging.
pub const EVENT_CAPACITY: usize = 32;

/// Outcome of one `invalidate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invalidation {
    /// Role that was invalidated.
    pub role: Role,
    /// True if this call removed the in-memory record.
    pub cleared: bool,
    /// Caches that could not be cleared.
    pub cache_failures: usize,
}

/// Broadcasts session lifecycle events and performs invalidation.
#[derive(Clone)]
pub struct ExpiryNotifier {
    store: SessionStore,
    caches: SessionCaches,
    events: broadcast::Sender<SessionEvent>,
    clock: Arc<dyn Clock>,
}

impl ExpiryNotifier {
    /// Creates a notifier over the store and its caches.
    #[must_use]
    pub fn new(store: SessionStore, caches: SessionCaches, clock: Arc<dyn Clock>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store,
            caches,
            events,
            clock,
        }
    }

    /// The session store this notifier clears.
    #[must_use]
    pub const fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The caches this notifier clears.
    #[must_use]
    pub const fn caches(&self) -> &SessionCaches {
        &self.caches
    }

    /// Subscribes to session events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("no session event subscribers");
        }
    }

    /// Invalidates `role`'s session. Safe to call repeatedly and
    /// concurrently; never fails.
    pub async fn invalidate(&self, role: Role, reason: LoginReason) -> Invalidation {
        let outcome = self.clear(role).await;

        if outcome.cleared {
            info!(%role, %reason, cache_failures = outcome.cache_failures, "session invalidated");
            self.emit_invalidated(role, reason);
        } else {
            debug!(%role, "session already cleared");
        }
        outcome
    }

    /// Handles a server rejection of `role`'s session.
    ///
    /// Clears like [`invalidate`](Self::invalidate) but always broadcasts,
    /// so the visitor leaves the rejected page even when the session only
    /// lived in the caches.
    pub async fn expire(&self, role: Role) -> Invalidation {
        let outcome = self.clear(role).await;
        info!(
            %role,
            cleared = outcome.cleared,
            cache_failures = outcome.cache_failures,
            "session expired"
        );
        self.emit_invalidated(role, LoginReason::Expired);
        outcome
    }

    async fn clear(&self, role: Role) -> Invalidation {
        let cache_failures = self.caches.purge(role).await;
        let cleared = self.store.clear(role);
        Invalidation {
            role,
            cleared,
            cache_failures,
        }
    }

    fn emit_invalidated(&self, role: Role, reason: LoginReason) {
        self.emit(SessionEvent::Invalidated {
            role,
            reason,
            at: self.now(),
        });
    }
}

impl fmt::Debug for ExpiryNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpiryNotifier")
            .field("store", &self.store)
            .field("caches", &self.caches)
            .field("subscribers", &self.events.receiver_count())
            .finish_non_exhaustive()
    }
}
