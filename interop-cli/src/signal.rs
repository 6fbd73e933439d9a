//! Ctrl-C handling.
//!
//! The runner checks the flag between test cases, so an interrupted run
//! finishes the case in progress, stops its processes and still writes its
//! report.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use interop_harness::ShutdownCheck;

/// Set once SIGINT arrives.
#[derive(Debug, Clone)]
pub struct ShutdownFlag {
    flag: Arc<AtomicBool>,
}

impl Default for ShutdownFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownFlag {
    /// Create a flag and register the Ctrl-C handler.
    ///
    /// If a handler is already registered the flag still works, but only
    /// through [`trigger`](Self::trigger).
    pub fn new() -> Self {
        let flag = Arc::new(AtomicBool::new(false));
        let handler_flag = Arc::clone(&flag);
        let _ = ctrlc::set_handler(move || {
            handler_flag.store(true, Ordering::SeqCst);
        });
        Self { flag }
    }

    /// A flag without a signal handler.
    pub fn manual() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }
}

impl ShutdownCheck for ShutdownFlag {
    fn should_stop(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
