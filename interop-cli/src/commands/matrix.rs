//! Matrix command orchestration.
//!
//! Runs the selected cases for every ordered (publisher, subscriber) pair
//! of implementations, including each implementation against itself.

use std::path::PathBuf;

use interop_fs::Filesystem;
use interop_harness::{Launcher, Logger, ShutdownCheck, Sleeper, SuiteResult};

use crate::cli::{Implementation, MatrixArgs};
use crate::clock::Clock;
use crate::io::{Report, ReportWriter};

use super::run::run_pairing;
use super::{load_registry, select_cases, CommandResult};

/// Results for one pairing.
#[derive(Debug)]
pub struct PairResult {
    pub publisher: String,
    pub subscriber: String,
    pub suite: SuiteResult,
    pub report_path: Option<PathBuf>,
}

/// Result of matrix command execution.
#[derive(Debug, Default)]
pub struct MatrixResult {
    pub pairs: Vec<PairResult>,
    /// True when a shutdown request stopped the run early.
    pub interrupted: bool,
}

impl MatrixResult {
    pub fn all_passed(&self) -> bool {
        self.pairs.iter().all(|p| p.suite.all_passed())
    }
}

/// Directory under `--output` holding the report of one pairing.
pub fn pair_dir_name(publisher: &str, subscriber: &str) -> String {
    format!("{}--{}", publisher, subscriber)
}

/// Execute the matrix command.
///
/// `make_launcher` builds the launcher for a (publisher, subscriber) pair.
pub fn execute_matrix<F>(
    args: &MatrixArgs,
    make_launcher: F,
    fs: &dyn Filesystem,
    clock: &dyn Clock,
    sleeper: &dyn Sleeper,
    logger: &dyn Logger,
    shutdown: &dyn ShutdownCheck,
) -> CommandResult<MatrixResult>
where
    F: Fn(&Implementation, &Implementation) -> Box<dyn Launcher>,
{
    args.validate()?;
    let implementations = args.implementations()?;

    let registry = load_registry(fs, &args.selection.suite_files)?;
    let cases = select_cases(&registry, &args.selection)?;
    let config = args.options.runner_config();

    let mut result = MatrixResult::default();
    'pairs: for publisher in &implementations {
        for subscriber in &implementations {
            if shutdown.should_stop() {
                result.interrupted = true;
                break 'pairs;
            }

            let launcher = make_launcher(publisher, subscriber);
            let suite = run_pairing(
                &cases,
                publisher,
                subscriber,
                &config,
                launcher.as_ref(),
                sleeper,
                logger,
                shutdown,
            )?;

            let report_path = match &args.options.output {
                Some(dir) => {
                    let pair_dir = dir.join(pair_dir_name(&publisher.name, &subscriber.name));
                    let report = Report::new(&suite, &publisher.name, &subscriber.name, clock.now());
                    Some(ReportWriter::new(fs, &pair_dir).write(&report)?)
                }
                None => None,
            };

            let interrupted = suite.interrupted;
            result.pairs.push(PairResult {
                publisher: publisher.name.clone(),
                subscriber: subscriber.name.clone(),
                suite,
                report_path,
            });
            if interrupted {
                result.interrupted = true;
                break 'pairs;
            }
        }
    }

    Ok(result)
}
