//! Run command orchestration.
//!
//! Resolves the selected cases, runs them with one publisher implementation
//! and one subscriber implementation, then writes the report.

use std::path::{Path, PathBuf};

use interop_fs::Filesystem;
use interop_harness::{
    run_suite, Launcher, Logger, ProcessLauncher, RunnerConfig, ShutdownCheck, Sleeper,
    SuiteResult,
};
use interop_schema::TestCase;

use crate::cli::{Implementation, RunArgs, RunOptions};
use crate::clock::Clock;
use crate::io::{Report, ReportWriter};

use super::{load_registry, select_cases, CommandResult};

/// Result of run command execution.
#[derive(Debug)]
pub struct RunResult {
    pub publisher: String,
    pub subscriber: String,
    pub suite: SuiteResult,
    /// Set when `--output` was given.
    pub report_path: Option<PathBuf>,
}

/// Launcher for real shape applications.
pub fn process_launcher(publisher: &Path, subscriber: &Path, options: &RunOptions) -> ProcessLauncher {
    ProcessLauncher::new(publisher, subscriber)
        .with_prefix(options.prefix.clone())
        .with_capture(options.capture())
}

/// Execute the run command.
pub fn execute_run(
    args: &RunArgs,
    launcher: &dyn Launcher,
    fs: &dyn Filesystem,
    clock: &dyn Clock,
    sleeper: &dyn Sleeper,
    logger: &dyn Logger,
    shutdown: &dyn ShutdownCheck,
) -> CommandResult<RunResult> {
    args.validate()?;

    let registry = load_registry(fs, &args.selection.suite_files)?;
    let cases = select_cases(&registry, &args.selection)?;
    let publisher = Implementation::from_path(&args.publisher);
    let subscriber = Implementation::from_path(&args.subscriber);

    let suite = run_pairing(
        &cases,
        &publisher,
        &subscriber,
        &args.options.runner_config(),
        launcher,
        sleeper,
        logger,
        shutdown,
    )?;

    let report_path = match &args.options.output {
        Some(dir) => {
            let report = Report::new(&suite, &publisher.name, &subscriber.name, clock.now());
            Some(ReportWriter::new(fs, dir).write(&report)?)
        }
        None => None,
    };

    Ok(RunResult {
        publisher: publisher.name,
        subscriber: subscriber.name,
        suite,
        report_path,
    })
}

/// Run `cases` for one publisher/subscriber pairing.
#[allow(clippy::too_many_arguments)]
pub(crate) fn run_pairing(
    cases: &[&TestCase],
    publisher: &Implementation,
    subscriber: &Implementation,
    config: &RunnerConfig,
    launcher: &dyn Launcher,
    sleeper: &dyn Sleeper,
    logger: &dyn Logger,
    shutdown: &dyn ShutdownCheck,
) -> CommandResult<SuiteResult> {
    logger.info(&format!(
        "{} -> {}: running {} test cases",
        publisher.name,
        subscriber.name,
        cases.len()
    ));
    Ok(run_suite(
        cases.iter().copied(),
        config,
        launcher,
        sleeper,
        logger,
        shutdown,
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{RunOptions, SelectionArgs};
    use crate::clock::MockClock;
    use crate::commands::test_support::{filesystem, launcher, SUITE_PATH};
    use crate::commands::CommandError;
    use crate::io::REPORT_FILE_NAME;
    use interop_harness::{
        AlwaysShutdown, MockLogger, MockSleeper, NeverShutdown, RegistryError,
    };
    use interop_schema::Role;

    fn args(tests: &[&str], output: Option<&str>) -> RunArgs {
        RunArgs {
            publisher: PathBuf::from("/opt/alpha/shape_main_alpha"),
            subscriber: PathBuf::from("/opt/beta/shape_main_beta"),
            selection: SelectionArgs {
                suites: vec!["smoke".to_string()],
                tests: tests.iter().map(|t| t.to_string()).collect(),
                suite_files: vec![PathBuf::from(SUITE_PATH)],
            },
            options: RunOptions {
                stagger_ms: 10,
                output: output.map(PathBuf::from),
                ..RunOptions::default()
            },
        }
    }

    // ===========================================
    // execute_run
    // ===========================================

    #[test]
    fn test_execute_run_reports_each_case() {
        let fs = filesystem();
        let logger = MockLogger::new();

        let result = execute_run(
            &args(&[], None),
            &launcher(),
            &fs,
            &MockClock::at_unix(0),
            &MockSleeper::new(),
            &logger,
            &NeverShutdown,
        )
        .unwrap();

        assert_eq!(result.publisher, "shape_main_alpha");
        assert_eq!(result.subscriber, "shape_main_beta");
        assert_eq!(result.suite.cases.len(), 2);
        assert_eq!(result.suite.passed(), 1);
        assert!(result.report_path.is_none());
        assert!(logger.contains("test Smoke_Match ... ok"));
        assert!(logger.contains("test Smoke_Wrong_Expectation ... FAILED"));
    }

    #[test]
    fn test_execute_run_subscriber_starts_first() {
        let launcher = launcher();
        execute_run(
            &args(&["Smoke_Match"], None),
            &launcher,
            &filesystem(),
            &MockClock::at_unix(0),
            &MockSleeper::new(),
            &MockLogger::new(),
            &NeverShutdown,
        )
        .unwrap();

        let roles: Vec<Role> = launcher.launches().into_iter().map(|(r, _)| r).collect();
        assert_eq!(roles, vec![Role::Subscriber, Role::Publisher]);
    }

    #[test]
    fn test_execute_run_writes_report() {
        let fs = filesystem();

        let result = execute_run(
            &args(&["Smoke_Wrong_Expectation"], Some("/out")),
            &launcher(),
            &fs,
            &MockClock::at_unix(1_700_000_000),
            &MockSleeper::new(),
            &MockLogger::new(),
            &NeverShutdown,
        )
        .unwrap();

        let path = result.report_path.unwrap();
        assert_eq!(path, Path::new("/out").join(REPORT_FILE_NAME));

        let report: Report = serde_json::from_slice(&fs.get_file(&path).unwrap()).unwrap();
        assert_eq!(report.generated_at, "2023-11-14T22:13:20+00:00");
        assert_eq!(report.publisher, "shape_main_alpha");
        assert_eq!(report.totals.failed, 1);
        let publisher = &report.cases[0].entities[0];
        assert_eq!(publisher.label, "P0");
        assert!(publisher
            .output
            .as_deref()
            .unwrap()
            .contains("on_publication_matched"));
    }

    #[test]
    fn test_execute_run_interrupted() {
        let result = execute_run(
            &args(&[], None),
            &launcher(),
            &filesystem(),
            &MockClock::at_unix(0),
            &MockSleeper::new(),
            &MockLogger::new(),
            &AlwaysShutdown,
        )
        .unwrap();

        assert!(result.suite.interrupted);
        assert!(result.suite.cases.is_empty());
    }

    #[test]
    fn test_execute_run_unknown_test() {
        let err = execute_run(
            &args(&["Smoke_Nope"], None),
            &launcher(),
            &filesystem(),
            &MockClock::at_unix(0),
            &MockSleeper::new(),
            &MockLogger::new(),
            &NeverShutdown,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            CommandError::Registry(RegistryError::UnknownTest(_))
        ));
    }

    #[test]
    fn test_execute_run_invalid_timeout() {
        let mut args = args(&[], None);
        args.options.timeout_sec = 0;

        let err = execute_run(
            &args,
            &launcher(),
            &filesystem(),
            &MockClock::at_unix(0),
            &MockSleeper::new(),
            &MockLogger::new(),
            &NeverShutdown,
        )
        .unwrap_err();

        assert!(matches!(err, CommandError::InvalidArgument(_)));
    }

    // ===========================================
    // process_launcher
    // ===========================================

    #[test]
    fn test_process_launcher_command_line() {
        let options = RunOptions {
            prefix: vec!["taskset".to_string(), "-c".to_string(), "1".to_string()],
            ..RunOptions::default()
        };
        let launcher = process_launcher(Path::new("/opt/a/pub"), Path::new("/opt/b/sub"), &options);
        assert_eq!(
            launcher.command_line(Role::Subscriber, "-t Square"),
            vec!["taskset", "-c", "1", "/opt/b/sub", "-S", "-t", "Square"]
        );
    }
}
