//! Named suites of test cases and the registry that holds them.

use interop_schema::{CaseError, TestCase};
use thiserror::Error;

use crate::suites;

/// Errors from suite registration and lookup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown suite: {0}")]
    UnknownSuite(String),

    #[error("unknown test case: {0}")]
    UnknownTest(String),

    #[error("suite {0} is already registered")]
    DuplicateSuite(String),

    #[error("test case {case} is declared twice in suite {suite}")]
    DuplicateCase { suite: String, case: String },

    #[error(transparent)]
    InvalidCase(#[from] CaseError),
}

/// A named, ordered list of test cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suite {
    pub name: String,
    pub description: Option<String>,
    pub cases: Vec<TestCase>,
}

impl Suite {
    pub fn new(name: impl Into<String>, cases: Vec<TestCase>) -> Self {
        Self {
            name: name.into(),
            description: None,
            cases,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Look up a case by name.
    pub fn case(&self, name: &str) -> Option<&TestCase> {
        self.cases.iter().find(|c| c.name == name)
    }

    /// Check every case and reject duplicate case names.
    pub fn validate(&self) -> Result<(), RegistryError> {
        for (i, case) in self.cases.iter().enumerate() {
            case.validate()?;
            if self.cases[..i].iter().any(|c| c.name == case.name) {
                return Err(RegistryError::DuplicateCase {
                    suite: self.name.clone(),
                    case: case.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Suites available to a run, in registration order.
#[derive(Debug, Clone, Default)]
pub struct SuiteRegistry {
    suites: Vec<Suite>,
}

impl SuiteRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in suites.
    pub fn builtin() -> Self {
        Self {
            suites: vec![suites::interoperability(), suites::ownership()],
        }
    }

    /// Add a suite after validating it.
    pub fn register(&mut self, suite: Suite) -> Result<(), RegistryError> {
        if self.suites.iter().any(|s| s.name == suite.name) {
            return Err(RegistryError::DuplicateSuite(suite.name));
        }
        suite.validate()?;
        self.suites.push(suite);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<&Suite, RegistryError> {
        self.suites
            .iter()
            .find(|s| s.name == name)
            .ok_or_else(|| RegistryError::UnknownSuite(name.to_string()))
    }

    pub fn names(&self) -> Vec<&str> {
        self.suites.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn suites(&self) -> &[Suite] {
        &self.suites
    }

    /// Find a case by name in any suite; the first registered wins.
    pub fn find_case(&self, name: &str) -> Result<&TestCase, RegistryError> {
        self.suites
            .iter()
            .find_map(|s| s.case(name))
            .ok_or_else(|| RegistryError::UnknownTest(name.to_string()))
    }
}
