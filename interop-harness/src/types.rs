//! Result types produced by the test case runner.

use std::fmt;
use std::time::Duration;

use interop_schema::{Outcome, Role};

/// Observed result for one entity of a test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityReport {
    /// `P0`, `S0`, ...
    pub label: String,
    pub role: Role,
    pub parameters: String,
    pub expected: Outcome,
    pub actual: Outcome,
    /// Captured console output, bounded.
    pub output: String,
}

impl EntityReport {
    pub fn matches(&self) -> bool {
        self.expected == self.actual
    }
}

/// An entity whose actual outcome differs from the expected one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub label: String,
    pub expected: Outcome,
    pub actual: Outcome,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {} ({})",
            self.label,
            self.expected,
            self.actual,
            self.actual.description()
        )
    }
}

/// Result of running one test case.
#[derive(Debug, Clone)]
pub struct CaseResult {
    pub name: String,
    pub passed: bool,
    pub entities: Vec<EntityReport>,
    pub duration: Duration,
}

impl CaseResult {
    /// Build a result; `passed` is derived from the entity reports.
    pub fn new(name: impl Into<String>, entities: Vec<EntityReport>, duration: Duration) -> Self {
        let passed = entities.iter().all(EntityReport::matches);
        Self {
            name: name.into(),
            passed,
            entities,
            duration,
        }
    }

    /// Actual outcomes, index-aligned with the test case entities.
    pub fn outcomes(&self) -> Vec<Outcome> {
        self.entities.iter().map(|e| e.actual).collect()
    }

    /// Every entity whose outcome differs from the expectation.
    pub fn mismatches(&self) -> Vec<Mismatch> {
        self.entities
            .iter()
            .filter(|e| !e.matches())
            .map(|e| Mismatch {
                label: e.label.clone(),
                expected: e.expected,
                actual: e.actual,
            })
            .collect()
    }

    /// Human-readable lines explaining a failure: one per mismatch followed
    /// by the captured output of the entity.
    pub fn diagnostics(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for entity in self.entities.iter().filter(|e| !e.matches()) {
            lines.push(format!(
                "{} ({} {}): expected {}, got {}",
                entity.label,
                entity.role,
                entity.parameters,
                entity.expected,
                entity.actual
            ));
            lines.extend(entity.output.lines().map(|l| format!("  | {}", l)));
        }
        lines
    }
}

/// Results of a sequence of test cases.
#[derive(Debug, Clone, Default)]
pub struct SuiteResult {
    pub cases: Vec<CaseResult>,
    /// True when a shutdown request stopped the run before every case ran.
    pub interrupted: bool,
}

impl SuiteResult {
    pub fn passed(&self) -> usize {
        self.cases.iter().filter(|c| c.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.cases.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.cases.iter().all(|c| c.passed)
    }

    /// Total wall-clock time of all cases.
    pub fn duration(&self) -> Duration {
        self.cases.iter().map(|c| c.duration).sum()
    }
}
