//! System clock adapter

use bazaar_application::ports::Clock;
use chrono::{DateTime, Utc};

/// Clock reading the system time, used to stamp session events.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
