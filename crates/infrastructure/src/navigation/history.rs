//! In-memory navigation history.

use std::sync::{Mutex, MutexGuard, PoisonError};

use bazaar_application::ports::Navigator;
use bazaar_domain::Location;
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug)]
struct History {
    entries: Vec<Location>,
    index: usize,
}

/// A browser-like history stack publishing the current location.
#[derive(Debug)]
pub struct HistoryNavigator {
    history: Mutex<History>,
    location: watch::Sender<Location>,
}

impl HistoryNavigator {
    /// Opens a fresh tab directly on `target`: no history to go back to.
    #[must_use]
    pub fn open(target: &str) -> Self {
        let location = Location::parse(target);
        Self {
            history: Mutex::new(History {
                entries: vec![location.clone()],
                index: 0,
            }),
            location: watch::channel(location).0,
        }
    }

    fn history(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Follows a link to `target`, dropping any forward entries.
    pub fn visit(&self, target: &str) {
        let location = Location::parse(target);
        let mut history = self.history();
        let next = history.index + 1;
        history.entries.truncate(next);
        history.entries.push(location.clone());
        history.index = next;
        debug!(to = %location, "visit");
        self.location.send_replace(location);
    }

    /// Goes back one entry. Returns false at the start of the history.
    pub fn back(&self) -> bool {
        let mut history = self.history();
        if history.index == 0 {
            return false;
        }
        history.index -= 1;
        let location = history.entries[history.index].clone();
        debug!(to = %location, "back");
        self.location.send_replace(location);
        true
    }

    /// Number of entries in the history.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history().entries.len()
    }

    /// Always false: a history holds at least the opened location.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history().entries.is_empty()
    }
}

impl Navigator for HistoryNavigator {
    fn current_location(&self) -> Location {
        self.location.borrow().clone()
    }

    fn has_history(&self) -> bool {
        self.history().index > 0
    }

    fn replace(&self, url: &str) {
        let location = Location::parse(url);
        let mut history = self.history();
        let index = history.index;
        if let Some(entry) = history.entries.get_mut(index) {
            *entry = location.clone();
        }
        debug!(to = %location, "replace");
        self.location.send_replace(location);
    }

    fn subscribe(&self) -> watch::Receiver<Location> {
        self.location.subscribe()
    }
}
