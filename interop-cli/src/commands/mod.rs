//! Command orchestration for CLI subcommands.
//!
//! - `run` - one publisher implementation against one subscriber implementation
//! - `matrix` - every ordered pair of implementations
//! - `list` - suites and their cases

pub mod list;
pub mod matrix;
pub mod run;

#[cfg(test)]
pub(crate) mod test_support;

pub use list::execute_list;
pub use matrix::{execute_matrix, MatrixResult, PairResult};
pub use run::{execute_run, RunResult};

use interop_fs::Filesystem;
use interop_harness::{load_suite_file, LoadError, RegistryError, RunError, SuiteRegistry};
use interop_schema::TestCase;
use std::path::PathBuf;
use thiserror::Error;

use crate::cli::{CliError, SelectionArgs};
use crate::io::ReportWriterError;

/// Errors from command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CliError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Run(#[from] RunError),

    #[error("report error: {0}")]
    Report(#[from] ReportWriterError),
}

/// Result of command execution.
pub type CommandResult<T> = Result<T, CommandError>;

/// Built-in suites followed by the suites loaded from `suite_files`.
pub fn load_registry(fs: &dyn Filesystem, suite_files: &[PathBuf]) -> CommandResult<SuiteRegistry> {
    let mut registry = SuiteRegistry::builtin();
    for path in suite_files {
        registry.register(load_suite_file(fs, path)?)?;
    }
    Ok(registry)
}

/// Resolve `--suite` and `--test` against `registry`.
///
/// Without `--suite` every registered suite is eligible. Without `--test`
/// every case of the eligible suites runs, in registration order; otherwise
/// the named cases run in the order given.
pub fn select_cases<'r>(
    registry: &'r SuiteRegistry,
    selection: &SelectionArgs,
) -> CommandResult<Vec<&'r TestCase>> {
    let suites = if selection.suites.is_empty() {
        registry.suites().iter().collect::<Vec<_>>()
    } else {
        selection
            .suites
            .iter()
            .map(|name| registry.get(name))
            .collect::<Result<Vec<_>, _>>()?
    };

    if selection.tests.is_empty() {
        return Ok(suites.iter().flat_map(|s| s.cases.iter()).collect());
    }

    selection
        .tests
        .iter()
        .map(|name| {
            suites
                .iter()
                .find_map(|s| s.case(name))
                .ok_or_else(|| CommandError::from(RegistryError::UnknownTest(name.clone())))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use interop_fs::MockFilesystem;
    use std::path::Path;

    const EXTRA: &str = r#"{"name":"extra","cases":[{"name":"Extra_0","entities":[
        {"role":"publisher","parameters":"-t Triangle","expected":"OK"},
        {"role":"subscriber","parameters":"-t Triangle","expected":"OK"}]}]}"#;

    fn selection(suites: &[&str], tests: &[&str]) -> SelectionArgs {
        SelectionArgs {
            suites: suites.iter().map(|s| s.to_string()).collect(),
            tests: tests.iter().map(|s| s.to_string()).collect(),
            suite_files: Vec::new(),
        }
    }

    fn names(cases: &[&TestCase]) -> Vec<String> {
        cases.iter().map(|c| c.name.clone()).collect()
    }

    // ===========================================
    // load_registry
    // ===========================================

    #[test]
    fn test_load_registry_appends_files() {
        let fs = MockFilesystem::new();
        fs.add_file("/s/extra.json", EXTRA);
        let registry = load_registry(&fs, &[PathBuf::from("/s/extra.json")]).unwrap();
        assert_eq!(registry.names(), vec!["interoperability", "ownership", "extra"]);
    }

    #[test]
    fn test_load_registry_missing_file() {
        let fs = MockFilesystem::new();
        let err = load_registry(&fs, &[PathBuf::from("/s/none.json")]).unwrap_err();
        assert!(matches!(err, CommandError::Load(LoadError::ReadError { .. })));
    }

    #[test]
    fn test_load_registry_duplicate_suite_name() {
        let fs = MockFilesystem::new();
        fs.add_file("/s/a.json", EXTRA);
        fs.add_file("/s/b.json", EXTRA);
        let err = load_registry(&fs, &[PathBuf::from("/s/a.json"), PathBuf::from("/s/b.json")])
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::Registry(RegistryError::DuplicateSuite(_))
        ));
    }

    // ===========================================
    // select_cases
    // ===========================================

    #[test]
    fn test_select_everything_by_default() {
        let registry = SuiteRegistry::builtin();
        let cases = select_cases(&registry, &selection(&[], &[])).unwrap();
        let total: usize = registry.suites().iter().map(|s| s.cases.len()).sum();
        assert_eq!(cases.len(), total);
        assert_eq!(cases[0].name, "Test_DataRepresentation_0");
    }

    #[test]
    fn test_select_suite() {
        let registry = SuiteRegistry::builtin();
        let cases = select_cases(&registry, &selection(&["ownership"], &[])).unwrap();
        assert_eq!(names(&cases), vec!["Test_Ownership_3", "Test_Ownership_4"]);
    }

    #[test]
    fn test_select_tests_in_given_order() {
        let registry = SuiteRegistry::builtin();
        let cases =
            select_cases(&registry, &selection(&[], &["Test_Ownership_4", "Test_Color_2"])).unwrap();
        assert_eq!(names(&cases), vec!["Test_Ownership_4", "Test_Color_2"]);
    }

    #[test]
    fn test_select_test_outside_selected_suite() {
        let registry = SuiteRegistry::builtin();
        let err = select_cases(&registry, &selection(&["ownership"], &["Test_Color_2"]))
            .unwrap_err();
        assert!(matches!(
            err,
            CommandError::Registry(RegistryError::UnknownTest(_))
        ));
    }

    #[test]
    fn test_select_unknown_suite() {
        let registry = SuiteRegistry::builtin();
        let err = select_cases(&registry, &selection(&["latency"], &[])).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Registry(RegistryError::UnknownSuite(_))
        ));
    }

    #[test]
    fn test_select_from_loaded_suite() {
        let fs = MockFilesystem::new();
        fs.add_file("/s/extra.json", EXTRA);
        let registry = load_registry(&fs, &[Path::new("/s/extra.json").to_path_buf()]).unwrap();
        let cases = select_cases(&registry, &selection(&["extra"], &[])).unwrap();
        assert_eq!(names(&cases), vec!["Extra_0"]);
    }
}
