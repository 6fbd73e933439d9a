//! Test case runner: starts every entity of a case, drives each one on its
//! own thread and compares the outcomes with the expected ones.

use std::thread;
use std::time::{Duration, Instant};

use interop_schema::{CaseError, Outcome, Role, TestCase};

use crate::barrier::{CompletionBarrier, OutcomeSlot};
use crate::channel::{sample_channel, SampleReader, SampleWriter, MAX_SAMPLES_SAVED};
use crate::driver::LifecycleDriver;
use crate::launcher::{LaunchError, Launcher, Session};
use crate::logger::{EntityLogger, Logger};
use crate::shutdown::ShutdownCheck;
use crate::sleeper::Sleeper;
use crate::types::{CaseResult, EntityReport, SuiteResult};

/// Default per-stage timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Default delay between consecutive publisher starts.
pub const DEFAULT_PUBLISHER_STAGGER: Duration = Duration::from_secs(1);

/// Default multiplier from stage timeout to completion barrier timeout.
pub const DEFAULT_BARRIER_TIMEOUT_FACTOR: u32 = 100;

/// Errors that can occur while running a test case.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("invalid test case: {0}")]
    InvalidCase(#[from] CaseError),

    #[error("test case {case}: driver for {label} panicked")]
    DriverPanicked { case: String, label: String },
}

/// Runner configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Stage timeout for cases that do not set their own.
    pub default_timeout: Duration,
    /// Delay between consecutive publisher starts, so that their sample
    /// sequences differ. A heuristic: it does not order their first samples.
    pub publisher_stagger: Duration,
    pub barrier_timeout_factor: u32,
    pub channel_capacity: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            default_timeout: DEFAULT_TIMEOUT,
            publisher_stagger: DEFAULT_PUBLISHER_STAGGER,
            barrier_timeout_factor: DEFAULT_BARRIER_TIMEOUT_FACTOR,
            channel_capacity: MAX_SAMPLES_SAVED,
        }
    }
}

impl RunnerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_publisher_stagger(mut self, stagger: Duration) -> Self {
        self.publisher_stagger = stagger;
        self
    }

    pub fn with_barrier_timeout_factor(mut self, factor: u32) -> Self {
        self.barrier_timeout_factor = factor;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Stage timeout for `case`.
    pub fn timeout_for(&self, case: &TestCase) -> Duration {
        case.timeout.unwrap_or(self.default_timeout)
    }

    /// How long an entity waits for its peers before its process is stopped.
    pub fn barrier_timeout(&self, stage_timeout: Duration) -> Duration {
        stage_timeout.saturating_mul(self.barrier_timeout_factor)
    }
}

/// Everything a driver thread borrows from the runner.
struct Shared<'a> {
    case: &'a TestCase,
    barrier: &'a CompletionBarrier,
    slots: &'a [OutcomeSlot],
    readers: &'a [SampleReader],
    logger: &'a dyn Logger,
    timeout: Duration,
    barrier_timeout: Duration,
}

/// What a driver thread hands back when it is joined.
struct Finished {
    index: usize,
    output: String,
}

/// Run one test case.
///
/// Subscribers start first, then publishers, `publisher_stagger` apart.
/// Every mismatch between expected and actual outcomes is reported.
pub fn run_test_case(
    case: &TestCase,
    config: &RunnerConfig,
    launcher: &dyn Launcher,
    sleeper: &dyn Sleeper,
    logger: &dyn Logger,
) -> Result<CaseResult, RunError> {
    case.validate()?;
    let start = Instant::now();
    let timeout = config.timeout_for(case);
    logger.verbose(&format!("running {} (timeout {:?})", case.name, timeout));

    let labels = case.labels();
    let barrier = CompletionBarrier::new(case.entities.iter().map(|e| e.role).collect());
    let slots: Vec<OutcomeSlot> = case.entities.iter().map(|_| OutcomeSlot::new()).collect();

    let mut writers: Vec<Option<SampleWriter>> = Vec::with_capacity(case.entities.len());
    let mut readers: Vec<SampleReader> = Vec::new();
    for entity in &case.entities {
        if entity.role == Role::Publisher {
            let (writer, reader) = sample_channel(config.channel_capacity);
            writers.push(Some(writer));
            readers.push(reader);
        } else {
            writers.push(None);
        }
    }

    let shared = Shared {
        case,
        barrier: &barrier,
        slots: &slots,
        readers: &readers,
        logger,
        timeout,
        barrier_timeout: config.barrier_timeout(timeout),
    };

    let start_order: Vec<usize> = (0..case.entities.len())
        .filter(|&i| case.entities[i].role == Role::Subscriber)
        .chain((0..case.entities.len()).filter(|&i| case.entities[i].role == Role::Publisher))
        .collect();

    let mut outputs = vec![String::new(); case.entities.len()];
    let mut panicked: Option<usize> = None;

    thread::scope(|scope| {
        let mut handles = Vec::with_capacity(start_order.len());
        let mut publishers_started = 0;

        for &index in &start_order {
            let entity = &case.entities[index];
            if entity.role == Role::Publisher {
                if publishers_started > 0 {
                    sleeper.sleep(config.publisher_stagger);
                }
                publishers_started += 1;
            }

            let launched = launcher.launch(entity.role, &entity.parameters);
            let writer = writers[index].take();
            let label = &labels[index];
            let shared = &shared;
            let handle = thread::Builder::new()
                .name(format!("{}-{}", case.name, label))
                .spawn_scoped(scope, move || drive_entity(shared, index, label, launched, writer));
            match handle {
                Ok(handle) => handles.push((index, handle)),
                Err(e) => {
                    logger.info(&format!("{}: failed to start driver thread: {}", label, e));
                    // Nobody else will raise this entity's signal.
                    barrier.finish_guard(index).finish();
                    slots[index].set(Outcome::TopicNotCreated);
                }
            }
        }

        for (index, handle) in handles {
            match handle.join() {
                Ok(finished) => outputs[finished.index] = finished.output,
                Err(_) => {
                    panicked.get_or_insert(index);
                }
            }
        }
    });

    if let Some(index) = panicked {
        return Err(RunError::DriverPanicked {
            case: case.name.clone(),
            label: labels[index].clone(),
        });
    }

    let mut entities = Vec::with_capacity(case.entities.len());
    for (index, (entity, output)) in case.entities.iter().zip(outputs).enumerate() {
        let actual = slots[index].get().ok_or_else(|| RunError::DriverPanicked {
            case: case.name.clone(),
            label: labels[index].clone(),
        })?;
        entities.push(EntityReport {
            label: labels[index].clone(),
            role: entity.role,
            parameters: entity.parameters.clone(),
            expected: entity.expected,
            actual,
            output,
        });
    }

    let result = CaseResult::new(case.name.clone(), entities, start.elapsed());
    for mismatch in result.mismatches() {
        logger.verbose(&format!("{}: {}", case.name, mismatch));
    }
    Ok(result)
}

/// Body of one driver thread: classify, publish the outcome, wait for the
/// peers, then stop the process.
fn drive_entity(
    shared: &Shared<'_>,
    index: usize,
    label: &str,
    launched: Result<Session, LaunchError>,
    writer: Option<SampleWriter>,
) -> Finished {
    let guard = shared.barrier.finish_guard(index);
    let logger = EntityLogger::new(shared.logger, label);
    let entity = &shared.case.entities[index];

    let (outcome, session, launch_error) = match launched {
        Ok(mut session) => {
            let mut driver = LifecycleDriver::new(entity.role, shared.timeout)
                .with_sample_reporting(entity.reports_samples())
                .with_check(shared.case.check)
                .with_logger(&logger);
            driver = match (&writer, entity.role) {
                (Some(writer), Role::Publisher) => driver.with_samples_out(writer),
                _ => driver.with_samples_in(shared.readers),
            };
            let outcome = driver.run(session.as_mut());
            (outcome, Some(session), None)
        }
        Err(e) => {
            logger.info(&format!("launch failed: {}", e));
            (Outcome::TopicNotCreated, None, Some(e.to_string()))
        }
    };

    shared.slots[index].set(outcome);
    guard.finish();

    if !shared.barrier.wait_for_peers(index, shared.barrier_timeout) {
        logger.info("timed out waiting for peers to finish");
    }

    let output = match (session, launch_error) {
        (Some(mut session), _) => {
            let output = session.transcript();
            session.terminate();
            output
        }
        (None, error) => error.unwrap_or_default(),
    };
    // The sample writer closes here, after the peers finished reading.
    drop(writer);

    Finished { index, output }
}

/// Run `cases` in order, stopping early when `shutdown` asks to.
pub fn run_suite<'a, I>(
    cases: I,
    config: &RunnerConfig,
    launcher: &dyn Launcher,
    sleeper: &dyn Sleeper,
    logger: &dyn Logger,
    shutdown: &dyn ShutdownCheck,
) -> Result<SuiteResult, RunError>
where
    I: IntoIterator<Item = &'a TestCase>,
{
    let mut result = SuiteResult::default();
    for case in cases {
        if shutdown.should_stop() {
            logger.info("shutdown requested, skipping remaining test cases");
            result.interrupted = true;
            break;
        }
        let case_result = run_test_case(case, config, launcher, sleeper, logger)?;
        logger.info(&format!(
            "test {} ... {}",
            case_result.name,
            if case_result.passed { "ok" } else { "FAILED" }
        ));
        result.cases.push(case_result);
    }
    Ok(result)
}
