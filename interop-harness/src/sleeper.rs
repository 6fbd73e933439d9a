//! Sleep abstraction for the publisher start stagger.
//!
//! The runner staggers publisher starts so their generated sample sequences
//! differ; tests use [`MockSleeper`] to record the delays instead of waiting.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Trait for sleeping between process starts.
pub trait Sleeper: Send + Sync {
    /// Sleep for the given duration.
    fn sleep(&self, duration: Duration);
}

/// Real sleeper that uses `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSleeper;

impl Sleeper for RealSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Mock sleeper for testing - returns immediately and records each request.
#[derive(Debug, Default, Clone)]
pub struct MockSleeper {
    requests: Arc<Mutex<Vec<Duration>>>,
}

impl MockSleeper {
    /// Create a new mock sleeper.
    pub fn new() -> Self {
        Self::default()
    }

    /// Durations requested so far, in call order.
    pub fn requests(&self) -> Vec<Duration> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Sleeper for MockSleeper {
    fn sleep(&self, duration: Duration) {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(duration);
    }
}
