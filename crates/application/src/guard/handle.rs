use std::fmt;
use std::sync::Arc;

use bazaar_domain::GuardState;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::ProtectedView;
use super::route_guard::GuardCore;

/// A mounted guarded view. Dropping it unmounts the guard.
pub struct GuardHandle<V> {
    core: Arc<GuardCore>,
    view: Arc<V>,
    state: watch::Receiver<GuardState>,
    watcher: Option<JoinHandle<()>>,
}

impl<V: ProtectedView> GuardHandle<V> {
    pub(super) fn new(core: Arc<GuardCore>, view: Arc<V>, watcher: Option<JoinHandle<()>>) -> Self {
        let state = core.state.subscribe();
        Self {
            core,
            view,
            state,
            watcher,
        }
    }

    /// Mount id, as it appears in log output.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.core.id
    }

    /// Current guard state.
    #[must_use]
    pub fn state(&self) -> GuardState {
        self.state.borrow().clone()
    }

    /// Observes guard state changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<GuardState> {
        self.state.clone()
    }

    /// Renders the protected view if the guard is authorized; otherwise
    /// nothing.
    #[must_use]
    pub fn render(&self) -> Option<V::Output> {
        let identity = self.state.borrow().identity().cloned()?;
        Some(self.view.render(&identity))
    }

    /// Unmounts the guard.
    pub fn unmount(self) {}
}

impl<V> Drop for GuardHandle<V> {
    fn drop(&mut self) {
        self.core.retire();
        if let Some(watcher) = self.watcher.take() {
            watcher.abort();
        }
        debug!(guard = %self.core.id, "guard unmounted");
    }
}

impl<V> fmt::Debug for GuardHandle<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardHandle")
            .field("id", &self.core.id)
            .field("state", &*self.state.borrow())
            .finish_non_exhaustive()
    }
}
