//! Loading suites from JSON files.
//!
//! ```json
//! {
//!   "name": "smoke",
//!   "cases": [
//!     {
//!       "name": "Test_Triangle_0",
//!       "check": "ordering_check",
//!       "timeout_sec": 5,
//!       "entities": [
//!         { "role": "publisher", "parameters": "-t Triangle -w", "expected": "OK" },
//!         { "role": "subscriber", "parameters": "-t Triangle", "expected": "OK" }
//!       ]
//!     }
//!   ]
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use interop_fs::{Filesystem, FsError};
use interop_schema::{Check, Entity, Outcome, Role, TestCase};
use serde::Deserialize;

use crate::registry::{RegistryError, Suite};

/// Errors that can occur when loading a suite file.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read suite file {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: FsError,
    },

    #[error("failed to parse JSON in {path}: {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid suite in {path}: {source}")]
    InvalidSuite {
        path: String,
        #[source]
        source: RegistryError,
    },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuiteFile {
    name: String,
    #[serde(default)]
    description: Option<String>,
    cases: Vec<CaseFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CaseFile {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    check: Check,
    #[serde(default)]
    timeout_sec: Option<u64>,
    entities: Vec<EntityFile>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntityFile {
    role: Role,
    #[serde(default)]
    parameters: String,
    expected: Outcome,
}

impl From<CaseFile> for TestCase {
    fn from(file: CaseFile) -> Self {
        TestCase {
            name: file.name,
            description: file.description,
            entities: file
                .entities
                .into_iter()
                .map(|e| Entity::new(e.role, e.parameters, e.expected))
                .collect(),
            check: file.check,
            timeout: file.timeout_sec.map(Duration::from_secs),
        }
    }
}

/// Parse a suite from JSON text. `origin` names the source in errors.
pub fn parse_suite(json: &str, origin: &str) -> Result<Suite, LoadError> {
    let file: SuiteFile = serde_json::from_str(json).map_err(|e| LoadError::JsonError {
        path: origin.to_string(),
        source: e,
    })?;

    let mut suite = Suite::new(file.name, file.cases.into_iter().map(TestCase::from).collect());
    suite.description = file.description;

    suite.validate().map_err(|e| LoadError::InvalidSuite {
        path: origin.to_string(),
        source: e,
    })?;
    Ok(suite)
}

/// Load a suite file.
pub fn load_suite_file(fs: &dyn Filesystem, path: &Path) -> Result<Suite, LoadError> {
    let origin = path.display().to_string();
    let content = fs.read_file(path).map_err(|e| LoadError::ReadError {
        path: origin.clone(),
        source: e,
    })?;
    parse_suite(&content, &origin)
}
