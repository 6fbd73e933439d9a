//! List command: suites and their test cases.

use std::fmt::Write;

use interop_fs::Filesystem;

use crate::cli::ListArgs;

use super::{load_registry, CommandResult};

/// Render the selected suites, one case per line with its entity count and
/// check.
pub fn execute_list(args: &ListArgs, fs: &dyn Filesystem) -> CommandResult<String> {
    let registry = load_registry(fs, &args.suite_files)?;
    let suites = if args.suites.is_empty() {
        registry.suites().iter().collect::<Vec<_>>()
    } else {
        args.suites
            .iter()
            .map(|name| registry.get(name))
            .collect::<Result<Vec<_>, _>>()?
    };

    let mut out = String::new();
    for suite in suites {
        match &suite.description {
            Some(description) => {
                let _ = writeln!(out, "{} ({} cases): {}", suite.name, suite.cases.len(), description);
            }
            None => {
                let _ = writeln!(out, "{} ({} cases)", suite.name, suite.cases.len());
            }
        }
        for case in &suite.cases {
            let _ = writeln!(
                out,
                "  {:<28} {}P/{}S  {}",
                case.name,
                case.publisher_count(),
                case.subscriber_count(),
                case.check
            );
        }
    }
    Ok(out)
}
