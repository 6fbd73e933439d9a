//! Shape Interoperability Schema
//!
//! Data model shared by the harness and the CLI: the outcome taxonomy,
//! entities, test cases and sample identifiers.

mod outcome;
mod params;
mod sample;
mod test_case;

pub use outcome::{Outcome, ParseOutcomeError};
pub use params::{requests_sample_reporting, split_parameters, SAMPLE_REPORTING_FLAGS};
pub use sample::{Sample, SAMPLE_TOKEN_LEN};
pub use test_case::{CaseError, Check, Entity, Role, TestCase};
