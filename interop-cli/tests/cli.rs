//! Integration tests for the shape-interop binary.
//!
//! Each test runs the built binary against throwaway suite files and shape
//! applications in a temporary directory.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

/// Run shape-interop with the given arguments.
fn shape_interop(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_shape-interop"))
        .args(args)
        .output()
        .expect("Failed to execute shape-interop")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

/// Suite whose single case expects both entities to refuse a missing topic.
fn write_suite(dir: &Path) -> String {
    let path = dir.join("refusal.json");
    fs::write(
        &path,
        r#"{
            "name": "refusal",
            "cases": [{
                "name": "Refusal_0",
                "timeout_sec": 2,
                "entities": [
                    { "role": "publisher", "parameters": "-x 2", "expected": "TOPIC_NOT_CREATED" },
                    { "role": "subscriber", "parameters": "-x 2", "expected": "TOPIC_NOT_CREATED" }
                ]
            }]
        }"#,
    )
    .unwrap();
    path_str(&path).to_string()
}

#[test]
fn test_list_builtin_suites() {
    let output = shape_interop(&["list"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("interoperability"));
    assert!(stdout.contains("Test_Reliability_4"));
    assert!(stdout.contains("ownership"));
}

#[test]
fn test_list_unknown_suite() {
    let output = shape_interop(&["list", "--suite", "latency"]);
    assert_eq!(output.status.code(), Some(5));
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown suite: latency"));
}

#[test]
fn test_run_invalid_timeout() {
    let output = shape_interop(&[
        "run",
        "--publisher",
        "/nonexistent/pub",
        "--subscriber",
        "/nonexistent/sub",
        "--timeout-sec",
        "0",
    ]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_run_unknown_test() {
    let output = shape_interop(&[
        "run",
        "--publisher",
        "/nonexistent/pub",
        "--subscriber",
        "/nonexistent/sub",
        "--test",
        "Test_Nope",
    ]);
    assert_eq!(output.status.code(), Some(5));
}

#[test]
fn test_run_bad_suite_file() {
    let dir = TempDir::new().unwrap();
    let suite = dir.path().join("bad.json");
    fs::write(&suite, "{ not json").unwrap();

    let output = shape_interop(&[
        "run",
        "--publisher",
        "/nonexistent/pub",
        "--subscriber",
        "/nonexistent/sub",
        "--suite-file",
        path_str(&suite),
    ]);
    assert_eq!(output.status.code(), Some(4));
}

#[test]
fn test_run_missing_executables_fail_the_case() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("out");

    let output = shape_interop(&[
        "run",
        "--publisher",
        "/nonexistent/pub",
        "--subscriber",
        "/nonexistent/sub",
        "--test",
        "Test_Topic_1",
        "--stagger-ms",
        "0",
        "--output",
        path_str(&out),
    ]);
    assert_eq!(output.status.code(), Some(3));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("test Test_Topic_1 ... FAILED"));
    assert!(stdout.contains("P0: expected READER_NOT_MATCHED, got TOPIC_NOT_CREATED"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("report.json")).unwrap()).unwrap();
    assert_eq!(report["publisher"], "pub");
    assert_eq!(report["totals"]["failed"], 1);
    assert_eq!(report["cases"][0]["entities"][1]["actual"], "TOPIC_NOT_CREATED");
}

#[cfg(unix)]
#[test]
fn test_run_passing_case_with_prefix() {
    let dir = TempDir::new().unwrap();
    let app = dir.path().join("refuser.sh");
    fs::write(&app, "echo 'please specify topic name [-t]'\nexit 1\n").unwrap();
    let suite = write_suite(dir.path());

    let output = shape_interop(&[
        "run",
        "--publisher",
        path_str(&app),
        "--subscriber",
        path_str(&app),
        "--prefix",
        "sh",
        "--suite-file",
        &suite,
        "--suite",
        "refusal",
        "--stagger-ms",
        "0",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(output.status.code(), Some(0), "{}", stdout);
    assert!(stdout.contains("refuser -> refuser"));
    assert!(stdout.contains("test result: ok. 1 passed; 0 failed"));
}

#[cfg(unix)]
#[test]
fn test_matrix_pairs() {
    let dir = TempDir::new().unwrap();
    let app = dir.path().join("refuser.sh");
    fs::write(&app, "echo 'please specify topic name [-t]'\nexit 1\n").unwrap();
    let suite = write_suite(dir.path());
    let out = dir.path().join("out");
    let alpha = format!("alpha={}", path_str(&app));
    let beta = format!("beta={}", path_str(&app));

    let output = shape_interop(&[
        "matrix",
        "--exe",
        &alpha,
        "--exe",
        &beta,
        "--prefix",
        "sh",
        "--suite-file",
        &suite,
        "--suite",
        "refusal",
        "--stagger-ms",
        "0",
        "--output",
        path_str(&out),
    ]);
    assert_eq!(output.status.code(), Some(0));
    for pair in ["alpha--alpha", "alpha--beta", "beta--alpha", "beta--beta"] {
        assert!(out.join(pair).join("report.json").exists(), "{}", pair);
    }
}
