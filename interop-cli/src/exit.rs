//! Exit codes for the shape-interop CLI.

use interop_harness::{RegistryError, RunError};

use crate::commands::CommandError;

/// Exit code constants.
pub mod codes {
    /// Every selected case passed.
    pub const SUCCESS: i32 = 0;
    /// Invalid arguments.
    pub const INVALID_ARGS: i32 = 1;
    /// IO error.
    pub const IO_ERROR: i32 = 2;
    /// At least one case produced an unexpected outcome.
    pub const TEST_FAILURES: i32 = 3;
    /// A suite could not be loaded or is invalid.
    pub const SUITE_ERROR: i32 = 4;
    /// A selected suite or test case does not exist.
    pub const UNKNOWN_SELECTION: i32 = 5;
    /// Interrupted by signal (128 + signal number).
    pub const SIGINT: i32 = 130;
}

/// Map a CommandError to an exit code.
pub fn exit_code(error: &CommandError) -> i32 {
    match error {
        CommandError::InvalidArgument(_) => codes::INVALID_ARGS,
        CommandError::Load(_) => codes::SUITE_ERROR,
        CommandError::Registry(RegistryError::UnknownSuite(_) | RegistryError::UnknownTest(_)) => {
            codes::UNKNOWN_SELECTION
        }
        CommandError::Registry(_) => codes::SUITE_ERROR,
        CommandError::Run(RunError::InvalidCase(_)) => codes::SUITE_ERROR,
        CommandError::Run(RunError::DriverPanicked { .. }) => codes::TEST_FAILURES,
        CommandError::Report(_) => codes::IO_ERROR,
    }
}

/// Exit code of a run that completed without a command error.
pub fn outcome_code(all_passed: bool, interrupted: bool) -> i32 {
    if interrupted {
        codes::SIGINT
    } else if all_passed {
        codes::SUCCESS
    } else {
        codes::TEST_FAILURES
    }
}
