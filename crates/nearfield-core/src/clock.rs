//! Clock abstraction so traversal timestamps are deterministic in tests.

use chrono::{DateTime, Utc};

/// Source of the current time for traversal bookkeeping.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock used outside tests.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
