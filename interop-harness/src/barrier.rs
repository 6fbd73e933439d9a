//! Completion barrier shared by the drivers of one test case.
//!
//! Each entity owns a one-shot completion signal. A subscriber waits for
//! every publisher signal and a publisher waits for every subscriber signal
//! before its process is terminated, so no process is reaped while the
//! peers it talks to are still being observed.

use std::sync::{Condvar, Mutex, OnceLock, PoisonError};
use std::time::{Duration, Instant};

use interop_schema::{Outcome, Role};

/// One-shot latch. Once raised it stays raised.
#[derive(Debug, Default)]
pub struct CompletionSignal {
    raised: Mutex<bool>,
    cond: Condvar,
}

impl CompletionSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the signal and wake all waiters.
    pub fn raise(&self) {
        let mut raised = self.raised.lock().unwrap_or_else(PoisonError::into_inner);
        *raised = true;
        self.cond.notify_all();
    }

    pub fn is_raised(&self) -> bool {
        *self.raised.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Block until raised or `deadline` passes. Returns whether it was raised.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        let mut raised = self.raised.lock().unwrap_or_else(PoisonError::into_inner);
        while !*raised {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            raised = self
                .cond
                .wait_timeout(raised, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
        true
    }
}

/// Completion signals for every entity of a test case.
#[derive(Debug)]
pub struct CompletionBarrier {
    roles: Vec<Role>,
    signals: Vec<CompletionSignal>,
}

impl CompletionBarrier {
    /// One signal per entity, index-aligned with `roles`.
    pub fn new(roles: Vec<Role>) -> Self {
        let signals = roles.iter().map(|_| CompletionSignal::new()).collect();
        Self { roles, signals }
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Signal owned by entity `index`.
    pub fn signal(&self, index: usize) -> Option<&CompletionSignal> {
        self.signals.get(index)
    }

    /// Indices entity `index` must wait for: every entity of the other role.
    pub fn wait_set(&self, index: usize) -> Vec<usize> {
        let Some(&own) = self.roles.get(index) else {
            return Vec::new();
        };
        self.roles
            .iter()
            .enumerate()
            .filter(|&(_, &role)| role != own)
            .map(|(i, _)| i)
            .collect()
    }

    /// Wait for every signal in the wait set of `index`.
    ///
    /// Returns false if `timeout` elapsed first.
    pub fn wait_for_peers(&self, index: usize, timeout: Duration) -> bool {
        let deadline = Instant::now()
            .checked_add(timeout)
            .unwrap_or_else(far_future);
        self.wait_set(index)
            .into_iter()
            .all(|peer| self.signals[peer].wait_until(deadline))
    }

    /// Guard raising the signal of `index` when dropped.
    pub fn finish_guard(&self, index: usize) -> FinishGuard<'_> {
        FinishGuard {
            signal: self.signals.get(index),
        }
    }
}

fn far_future() -> Instant {
    // Roughly thirty years; far enough to never be reached by a test run.
    Instant::now() + Duration::from_secs(60 * 60 * 24 * 365 * 30)
}

/// Raises an entity's completion signal on drop, even during a panic.
#[derive(Debug)]
pub struct FinishGuard<'a> {
    signal: Option<&'a CompletionSignal>,
}

impl FinishGuard<'_> {
    /// Raise now instead of at drop. Raising twice has no further effect.
    pub fn finish(mut self) {
        if let Some(signal) = self.signal.take() {
            signal.raise();
        }
    }
}

impl Drop for FinishGuard<'_> {
    fn drop(&mut self) {
        if let Some(signal) = self.signal.take() {
            signal.raise();
        }
    }
}

/// Single-assignment storage for one entity's outcome.
#[derive(Debug, Default)]
pub struct OutcomeSlot {
    cell: OnceLock<Outcome>,
}

impl OutcomeSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the outcome. Returns false, leaving the slot unchanged, if it
    /// was already written.
    pub fn set(&self, outcome: Outcome) -> bool {
        self.cell.set(outcome).is_ok()
    }

    pub fn get(&self) -> Option<Outcome> {
        self.cell.get().copied()
    }
}
