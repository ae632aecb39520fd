//! The single subscriber that navigates after an invalidation.

use std::sync::Arc;

use bazaar_domain::{RedirectPolicy, SessionEvent};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::ports::Navigator;

/// Sends the visitor to the login page when their session is invalidated.
#[derive(Clone)]
pub struct ExpiryRedirector {
    navigator: Arc<dyn Navigator>,
    policy: RedirectPolicy,
}

impl ExpiryRedirector {
    /// Creates a redirector.
    #[must_use]
    pub fn new(navigator: Arc<dyn Navigator>, policy: RedirectPolicy) -> Self {
        Self { navigator, policy }
    }

    /// Handles one event. Returns the URL navigated to, if any.
    pub fn handle(&self, event: &SessionEvent) -> Option<String> {
        let SessionEvent::Invalidated { role, reason, .. } = *event else {
            return None;
        };

        let current = self.navigator.current_location();
        if self.policy.is_login_page(role, &current) {
            debug!(%role, location = %current, "already on login page");
            return None;
        }

        let url = self
            .policy
            .compute_login_url(role, &current, reason, self.navigator.has_history());
        info!(%role, from = %current, to = %url, "redirecting after invalidation");
        self.navigator.replace(&url);
        Some(url)
    }

    /// Handles events until the channel closes.
    pub async fn run(self, mut events: broadcast::Receiver<SessionEvent>) {
        loop {
            match events.recv().await {
                Ok(event) => {
                    self.handle(&event);
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "expiry redirector lagged behind session events");
                }
                Err(RecvError::Closed) => break,
            }
        }
        debug!("expiry redirector stopped");
    }

    /// Runs the redirector on the current runtime.
    pub fn spawn(self, events: broadcast::Receiver<SessionEvent>) -> JoinHandle<()> {
        tokio::spawn(self.run(events))
    }
}
