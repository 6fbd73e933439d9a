//! JSON report for one publisher/subscriber pairing.
//!
//! Written to `<out-dir>/report.json`:
//!
//! ```json
//! {
//!   "generated_at": "2026-01-01T00:00:00+00:00",
//!   "publisher": "alpha",
//!   "subscriber": "beta",
//!   "interrupted": false,
//!   "totals": { "cases": 2, "passed": 1, "failed": 1 },
//!   "cases": [
//!     {
//!       "name": "Test_Color_0",
//!       "passed": true,
//!       "duration_ms": 2034,
//!       "entities": [
//!         { "label": "P0", "role": "publisher", "parameters": "-t Square -c BLUE -x 2",
//!           "expected": "OK", "actual": "OK" }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! Entities of failed cases also carry their captured `output`.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use interop_fs::{Filesystem, FsError};
use interop_harness::{CaseResult, EntityReport, SuiteResult};
use interop_schema::{Outcome, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const REPORT_FILE_NAME: &str = "report.json";

/// Errors from report writing.
#[derive(Debug, Error)]
pub enum ReportWriterError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: FsError,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: FsError,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: String,
    pub publisher: String,
    pub subscriber: String,
    pub interrupted: bool,
    pub totals: Totals,
    pub cases: Vec<CaseEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub cases: usize,
    pub passed: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseEntry {
    pub name: String,
    pub passed: bool,
    pub duration_ms: u64,
    pub entities: Vec<EntityEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEntry {
    pub label: String,
    pub role: Role,
    pub parameters: String,
    pub expected: Outcome,
    pub actual: Outcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl Report {
    pub fn new(
        suite: &SuiteResult,
        publisher: &str,
        subscriber: &str,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            generated_at: generated_at.to_rfc3339(),
            publisher: publisher.to_string(),
            subscriber: subscriber.to_string(),
            interrupted: suite.interrupted,
            totals: Totals {
                cases: suite.cases.len(),
                passed: suite.passed(),
                failed: suite.failed(),
            },
            cases: suite.cases.iter().map(CaseEntry::from).collect(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl From<&CaseResult> for CaseEntry {
    fn from(case: &CaseResult) -> Self {
        Self {
            name: case.name.clone(),
            passed: case.passed,
            duration_ms: u64::try_from(case.duration.as_millis()).unwrap_or(u64::MAX),
            entities: case
                .entities
                .iter()
                .map(|e| EntityEntry::new(e, !case.passed))
                .collect(),
        }
    }
}

impl EntityEntry {
    fn new(entity: &EntityReport, with_output: bool) -> Self {
        Self {
            label: entity.label.clone(),
            role: entity.role,
            parameters: entity.parameters.clone(),
            expected: entity.expected,
            actual: entity.actual,
            output: with_output.then(|| entity.output.clone()),
        }
    }
}

/// Writes reports into one directory.
pub struct ReportWriter<'a> {
    fs: &'a dyn Filesystem,
    out_dir: &'a Path,
}

impl<'a> ReportWriter<'a> {
    pub fn new(fs: &'a dyn Filesystem, out_dir: &'a Path) -> Self {
        Self { fs, out_dir }
    }

    pub fn report_path(&self) -> PathBuf {
        self.out_dir.join(REPORT_FILE_NAME)
    }

    /// Create the directory if needed and write the report atomically.
    pub fn write(&self, report: &Report) -> Result<PathBuf, ReportWriterError> {
        self.fs
            .create_dir_all(self.out_dir)
            .map_err(|e| ReportWriterError::CreateDir {
                path: self.out_dir.display().to_string(),
                source: e,
            })?;

        let path = self.report_path();
        let json = report.to_json()?;
        self.fs
            .write_atomic(&path, json.as_bytes())
            .map_err(|e| ReportWriterError::Write {
                path: path.display().to_string(),
                source: e,
            })?;
        Ok(path)
    }
}
