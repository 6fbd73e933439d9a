//! CLI argument parsing for shape-interop.
//!
//! Three subcommands: `run` tests one publisher implementation against one
//! subscriber implementation, `matrix` tests every ordered pair of a set of
//! implementations, and `list` prints the available suites.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use interop_harness::{Capture, RunnerConfig, Verbosity};
use thiserror::Error;

/// Default stage timeout in seconds for cases that do not set their own.
pub const DEFAULT_TIMEOUT_SEC: u64 = 20;

/// Default delay between consecutive publisher starts, in milliseconds.
pub const DEFAULT_STAGGER_MS: u64 = 1000;

/// Errors from CLI argument validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("timeout-sec must be at least 1, got {0}")]
    InvalidTimeoutSec(u64),

    #[error("--exe must look like NAME=PATH, got {0:?}")]
    InvalidExeSpec(String),

    #[error("implementation {0} is given twice")]
    DuplicateExeName(String),
}

/// Shape application interoperability tests.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "shape-interop")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Test one publisher implementation against one subscriber implementation.
    Run(RunArgs),
    /// Test every ordered pair of implementations.
    Matrix(MatrixArgs),
    /// List suites and their test cases.
    List(ListArgs),
}

/// Which test cases to run.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionArgs {
    /// Suite to run (repeatable). All suites when omitted.
    #[arg(long = "suite")]
    pub suites: Vec<String>,

    /// Single test case to run (repeatable).
    #[arg(long = "test")]
    pub tests: Vec<String>,

    /// Additional suite definition in JSON (repeatable).
    #[arg(long = "suite-file")]
    pub suite_files: Vec<PathBuf>,
}

/// Runner settings shared by `run` and `matrix`.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Stage timeout in seconds for cases that do not set their own.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SEC)]
    pub timeout_sec: u64,

    /// Delay between consecutive publisher starts, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_STAGGER_MS)]
    pub stagger_ms: u64,

    /// Token placed before the executable on every command line
    /// (repeatable), e.g. `--prefix taskset --prefix -c --prefix 1`.
    #[arg(long = "prefix", allow_hyphen_values = true)]
    pub prefix: Vec<String>,

    /// Capture application output through pipes instead of a
    /// pseudo-terminal. Applications that block-buffer stdout then need a
    /// line-buffering prefix such as `--prefix stdbuf --prefix -oL`.
    #[arg(long)]
    pub pipe_output: bool,

    /// Directory receiving report.json.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Increase verbosity (-v verifier progress, -vv stage transitions).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            timeout_sec: DEFAULT_TIMEOUT_SEC,
            stagger_ms: DEFAULT_STAGGER_MS,
            prefix: Vec::new(),
            pipe_output: false,
            output: None,
            verbose: 0,
        }
    }
}

impl RunOptions {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.timeout_sec == 0 {
            return Err(CliError::InvalidTimeoutSec(self.timeout_sec));
        }
        Ok(())
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig::new()
            .with_default_timeout(Duration::from_secs(self.timeout_sec))
            .with_publisher_stagger(Duration::from_millis(self.stagger_ms))
    }

    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_count(self.verbose)
    }

    /// How entity output is captured.
    pub fn capture(&self) -> Capture {
        if self.pipe_output {
            Capture::Pipe
        } else {
            Capture::Terminal
        }
    }
}

/// Arguments for the run command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct RunArgs {
    /// Shape application used for every publisher.
    #[arg(long)]
    pub publisher: PathBuf,

    /// Shape application used for every subscriber.
    #[arg(long)]
    pub subscriber: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub options: RunOptions,
}

impl RunArgs {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        self.options.validate()
    }
}

/// Arguments for the matrix command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct MatrixArgs {
    /// Implementation as NAME=PATH (repeatable).
    #[arg(long = "exe", required = true)]
    pub exes: Vec<String>,

    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub options: RunOptions,
}

impl MatrixArgs {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        self.options.validate()?;
        self.implementations().map(|_| ())
    }

    /// Parsed `--exe` values in the order given.
    pub fn implementations(&self) -> Result<Vec<Implementation>, CliError> {
        let mut parsed: Vec<Implementation> = Vec::with_capacity(self.exes.len());
        for spec in &self.exes {
            let implementation = parse_exe_spec(spec)?;
            if parsed.iter().any(|i| i.name == implementation.name) {
                return Err(CliError::DuplicateExeName(implementation.name));
            }
            parsed.push(implementation);
        }
        Ok(parsed)
    }
}

/// Arguments for the list command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct ListArgs {
    /// Only list this suite (repeatable).
    #[arg(long = "suite")]
    pub suites: Vec<String>,

    /// Additional suite definition in JSON (repeatable).
    #[arg(long = "suite-file")]
    pub suite_files: Vec<PathBuf>,
}

/// A named shape application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Implementation {
    pub name: String,
    pub path: PathBuf,
}

impl Implementation {
    /// Name an executable after its file stem.
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            name,
            path: path.to_path_buf(),
        }
    }
}

/// Parse `NAME=PATH`.
pub fn parse_exe_spec(spec: &str) -> Result<Implementation, CliError> {
    match spec.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => Ok(Implementation {
            name: name.to_string(),
            path: PathBuf::from(path),
        }),
        _ => Err(CliError::InvalidExeSpec(spec.to_string())),
    }
}

/// Parse CLI arguments from an iterator of strings.
/// Useful for testing.
pub fn parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}
