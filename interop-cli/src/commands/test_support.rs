//! Shared fixtures for command tests.

use interop_fs::MockFilesystem;
use interop_harness::{ScriptedLauncher, Step};
use interop_schema::Role;

pub const SUITE_PATH: &str = "/suites/smoke.json";

/// One passing and one failing case, both with one-second stage timeouts.
pub const SMOKE_SUITE: &str = r#"{
    "name": "smoke",
    "cases": [
        {
            "name": "Smoke_Match",
            "timeout_sec": 1,
            "entities": [
                { "role": "publisher", "parameters": "-t Square", "expected": "OK" },
                { "role": "subscriber", "parameters": "-t Square", "expected": "OK" }
            ]
        },
        {
            "name": "Smoke_Wrong_Expectation",
            "timeout_sec": 1,
            "entities": [
                { "role": "publisher", "parameters": "-t Square", "expected": "READER_NOT_MATCHED" },
                { "role": "subscriber", "parameters": "-t Square", "expected": "OK" }
            ]
        }
    ]
}"#;

pub fn filesystem() -> MockFilesystem {
    let fs = MockFilesystem::new();
    fs.add_file(SUITE_PATH, SMOKE_SUITE);
    fs
}

/// Publisher and subscriber of `Square` that find each other.
pub fn launcher() -> ScriptedLauncher {
    ScriptedLauncher::new()
        .with_script(
            Role::Publisher,
            "-t Square",
            vec![
                Step::line("Create topic: Square"),
                Step::line("Create writer for topic: Square color: BLUE"),
                Step::line("on_publication_matched()"),
                Step::Hang,
            ],
        )
        .with_script(
            Role::Subscriber,
            "-t Square",
            vec![
                Step::line("Create topic: Square"),
                Step::line("Create reader for topic: Square"),
                Step::line("on_subscription_matched()"),
                Step::line("on_liveliness_changed()"),
                Step::line("Square     BLUE       010 020 [30]"),
                Step::Hang,
            ],
        )
}
