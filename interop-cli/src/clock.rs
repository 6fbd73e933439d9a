//! Wall-clock abstraction for report timestamps.

use chrono::{DateTime, Utc};

/// Trait for getting the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Real system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Mock clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct MockClock {
    at: DateTime<Utc>,
}

impl MockClock {
    pub fn new(at: DateTime<Utc>) -> Self {
        Self { at }
    }

    /// Frozen at `secs` seconds after the Unix epoch; out-of-range values
    /// fall back to the epoch.
    pub fn at_unix(secs: i64) -> Self {
        Self::new(DateTime::from_timestamp(secs, 0).unwrap_or_default())
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.at
    }
}
