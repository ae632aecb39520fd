//! Navigation port

use bazaar_domain::Location;
use tokio::sync::watch;

/// Port over the client's address bar and history.
pub trait Navigator: Send + Sync {
    /// The location currently shown.
    fn current_location(&self) -> Location;

    /// Returns false for a fresh tab opened directly on a deep link.
    fn has_history(&self) -> bool;

    /// Navigates to `url`, replacing the current history entry.
    fn replace(&self, url: &str);

    /// Observes location changes.
    fn subscribe(&self) -> watch::Receiver<Location>;
}
