//! Clock port

use chrono::{DateTime, Utc};

/// Port for the current time, used to stamp session events.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;
}
