//! Shape Interoperability Harness
//!
//! Runs shape publisher and subscriber applications, possibly built from
//! different pub/sub implementations, and classifies how far each one got.
//!
//! # Overview
//!
//! For every entity of a [`TestCase`](interop_schema::TestCase) the runner:
//!
//! 1. Starts the process through a [`Launcher`] (subscribers first)
//! 2. Drives it through its lifecycle stages on a dedicated thread,
//!    matching its console output against known markers
//! 3. Records the resulting [`Outcome`](interop_schema::Outcome) in a
//!    single-assignment slot
//! 4. Waits on the completion barrier until every peer of the other role
//!    is done, then stops the process
//!
//! Publishers that print their samples forward them through per-publisher
//! sample channels, so subscriber-side verifiers can check delivery order or
//! tell whether data arrives from one publisher or from two.
//!
//! # Suites
//!
//! Built-in suites live in [`SuiteRegistry::builtin`]; further suites can be
//! loaded from JSON with [`load_suite_file`].

pub mod barrier;
pub mod channel;
pub mod driver;
pub mod expect;
pub mod launcher;
pub mod loader;
pub mod logger;
pub mod patterns;
pub mod registry;
pub mod runner;
pub mod shutdown;
pub mod sleeper;
pub mod suites;
pub mod types;
pub mod verifier;

pub use barrier::{CompletionBarrier, CompletionSignal, FinishGuard, OutcomeSlot};
pub use channel::{sample_channel, SampleReader, SampleWriter, MAX_SAMPLES_SAVED};
pub use driver::LifecycleDriver;
pub use expect::{
    Capture, Expect, LineSession, OutputStream, ProcessSession, ScriptedSession, Step,
    MAX_TRANSCRIPT_BYTES, SEARCH_OVERLAP_BYTES,
};
pub use launcher::{LaunchError, Launcher, ProcessLauncher, ScriptedLauncher, Session};
pub use loader::{load_suite_file, parse_suite, LoadError};
pub use logger::{EntityLogger, LogEntry, Logger, MockLogger, NullLogger, StderrLogger, Verbosity};
pub use registry::{RegistryError, Suite, SuiteRegistry};
pub use runner::{
    run_suite, run_test_case, RunError, RunnerConfig, DEFAULT_BARRIER_TIMEOUT_FACTOR,
    DEFAULT_PUBLISHER_STAGGER, DEFAULT_TIMEOUT,
};
pub use shutdown::{AlwaysShutdown, NeverShutdown, ShutdownCheck, StopAfter};
pub use sleeper::{MockSleeper, RealSleeper, Sleeper};
pub use types::{CaseResult, EntityReport, Mismatch, SuiteResult};
pub use verifier::{verify, MULTI_SOURCE_ITERATIONS, ORDERING_CHECK_SAMPLES};
