//! Plain-text run summary.

use std::fmt::Write;

use interop_harness::SuiteResult;

/// Summary of a pairing: one line per case, each mismatch indented under
/// its failed case, then the totals.
///
/// ```text
/// alpha -> beta
/// test Test_Color_0 ... ok
/// test Test_Topic_1 ... FAILED
///     P0: expected READER_NOT_MATCHED, got OK (the entity completed every stage)
///
/// test result: FAILED. 1 passed; 1 failed; finished in 2.1s
/// ```
pub fn render_summary(publisher: &str, subscriber: &str, suite: &SuiteResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} -> {}", publisher, subscriber);

    for case in &suite.cases {
        let status = if case.passed { "ok" } else { "FAILED" };
        let _ = writeln!(out, "test {} ... {}", case.name, status);
        for mismatch in case.mismatches() {
            let _ = writeln!(out, "    {}", mismatch);
        }
    }

    let verdict = if suite.all_passed() { "ok" } else { "FAILED" };
    let _ = writeln!(
        out,
        "\ntest result: {}. {} passed; {} failed; finished in {:.1}s",
        verdict,
        suite.passed(),
        suite.failed(),
        suite.duration().as_secs_f64()
    );
    if suite.interrupted {
        let _ = writeln!(out, "interrupted: remaining test cases were skipped");
    }
    out
}
