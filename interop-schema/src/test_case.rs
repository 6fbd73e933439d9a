//! Test case definitions: roles, entities and the expected outcome vector.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::outcome::Outcome;
use crate::params::requests_sample_reporting;

/// Role an entity plays in a test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Publisher,
    Subscriber,
}

impl Role {
    /// Command-line flag selecting this role in a shape application.
    pub fn flag(&self) -> &'static str {
        match self {
            Role::Publisher => "-P",
            Role::Subscriber => "-S",
        }
    }

    /// Single-letter prefix used in entity labels.
    pub fn letter(&self) -> char {
        match self {
            Role::Publisher => 'P',
            Role::Subscriber => 'S',
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Publisher => f.write_str("publisher"),
            Role::Subscriber => f.write_str("subscriber"),
        }
    }
}

/// How a subscriber checks the data it receives once data starts arriving.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Check {
    /// Receiving any data is enough.
    #[default]
    NoCheck,
    /// Received samples must match the single publisher's samples in order.
    OrderingCheck,
    /// Classify whether samples arrive from one or from two publishers.
    MultiSourceCheck,
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Check::NoCheck => f.write_str("no_check"),
            Check::OrderingCheck => f.write_str("ordering_check"),
            Check::MultiSourceCheck => f.write_str("multi_source_check"),
        }
    }
}

/// One publisher or subscriber participating in a test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub role: Role,
    /// Forwarded to the executable without interpretation.
    pub parameters: String,
    pub expected: Outcome,
}

impl Entity {
    /// Create an entity.
    pub fn new(role: Role, parameters: impl Into<String>, expected: Outcome) -> Self {
        Self {
            role,
            parameters: parameters.into(),
            expected,
        }
    }

    /// Whether the parameters ask a publisher to print each sample it sends.
    pub fn reports_samples(&self) -> bool {
        self.role == Role::Publisher && requests_sample_reporting(&self.parameters)
    }
}

/// Errors from test case validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CaseError {
    #[error("test case {0} declares no entities")]
    NoEntities(String),

    #[error("test case {name}: {check} needs at least {required} publisher(s), found {found}")]
    NotEnoughPublishers {
        name: String,
        check: Check,
        required: usize,
        found: usize,
    },

    #[error("test case {0}: timeout must be greater than zero")]
    ZeroTimeout(String),
}

/// A named set of entities with their expected outcomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestCase {
    pub name: String,
    pub description: Option<String>,
    pub entities: Vec<Entity>,
    pub check: Check,
    /// Per-stage timeout. `None` uses the runner default.
    pub timeout: Option<Duration>,
}

impl TestCase {
    /// Create an empty test case.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            entities: Vec::new(),
            check: Check::NoCheck,
            timeout: None,
        }
    }

    /// Builder: add a publisher.
    pub fn publisher(mut self, parameters: impl Into<String>, expected: Outcome) -> Self {
        self.entities
            .push(Entity::new(Role::Publisher, parameters, expected));
        self
    }

    /// Builder: add a subscriber.
    pub fn subscriber(mut self, parameters: impl Into<String>, expected: Outcome) -> Self {
        self.entities
            .push(Entity::new(Role::Subscriber, parameters, expected));
        self
    }

    /// Builder: set the verifier.
    pub fn with_check(mut self, check: Check) -> Self {
        self.check = check;
        self
    }

    /// Builder: set the per-stage timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Expected outcomes, index-aligned with `entities`.
    pub fn expected(&self) -> Vec<Outcome> {
        self.entities.iter().map(|e| e.expected).collect()
    }

    /// Number of publisher entities.
    pub fn publisher_count(&self) -> usize {
        self.entities
            .iter()
            .filter(|e| e.role == Role::Publisher)
            .count()
    }

    /// Number of subscriber entities.
    pub fn subscriber_count(&self) -> usize {
        self.entities.len() - self.publisher_count()
    }

    /// Labels such as `P0`, `P1`, `S0`, numbered per role in declaration order.
    pub fn labels(&self) -> Vec<String> {
        let mut publishers = 0;
        let mut subscribers = 0;
        self.entities
            .iter()
            .map(|e| {
                let n = match e.role {
                    Role::Publisher => &mut publishers,
                    Role::Subscriber => &mut subscribers,
                };
                let label = format!("{}{}", e.role.letter(), n);
                *n += 1;
                label
            })
            .collect()
    }

    /// Check the case can be executed.
    pub fn validate(&self) -> Result<(), CaseError> {
        if self.entities.is_empty() {
            return Err(CaseError::NoEntities(self.name.clone()));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(CaseError::ZeroTimeout(self.name.clone()));
        }

        let required = match self.check {
            Check::NoCheck => 0,
            Check::OrderingCheck => 1,
            Check::MultiSourceCheck => 2,
        };
        let found = self.publisher_count();
        if found < required {
            return Err(CaseError::NotEnoughPublishers {
                name: self.name.clone(),
                check: self.check,
                required,
                found,
            });
        }

        Ok(())
    }
}
