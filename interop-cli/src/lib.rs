//! shape-interop command-line runner.
//!
//! Argument parsing, command orchestration, report output and exit codes
//! for the `shape-interop` binary. The test machinery itself lives in
//! `interop-harness`.

pub mod cli;
pub mod clock;
pub mod commands;
pub mod exit;
pub mod io;
pub mod signal;

pub use cli::{
    parse_exe_spec, parse_from, Cli, CliError, Command, Implementation, ListArgs, MatrixArgs,
    RunArgs, RunOptions, SelectionArgs, DEFAULT_STAGGER_MS, DEFAULT_TIMEOUT_SEC,
};
pub use clock::{Clock, MockClock, SystemClock};
pub use commands::{
    execute_list, execute_matrix, execute_run, CommandError, CommandResult, MatrixResult,
    PairResult, RunResult,
};
pub use signal::ShutdownFlag;
