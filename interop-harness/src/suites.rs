//! Built-in test suites.

use std::time::Duration;

use interop_schema::{Check, Outcome, TestCase};

use crate::registry::Suite;

/// Stage timeout for cases where the entities are expected to communicate.
pub const LONG_TIMEOUT: Duration = Duration::from_secs(20);

/// Stage timeout for cases expected to stop early.
pub const SHORT_TIMEOUT: Duration = Duration::from_secs(5);

use Outcome::{DataNotReceived, IncompatibleQos, ReaderNotMatched, WriterNotMatched};
use Outcome::Ok as OK;

/// (name, publisher parameters, subscriber parameters, expected publisher,
/// expected subscriber). Every row runs with data representation `-x 2`
/// unless it sets `-x` itself.
const PUB_SUB_CASES: &[(&str, &str, &str, Outcome, Outcome)] = &[
    ("Test_DataRepresentation_0", "-t Square -x 1", "-t Square -x 1", OK, OK),
    ("Test_DataRepresentation_1", "-t Square -x 1", "-t Square -x 2", IncompatibleQos, IncompatibleQos),
    ("Test_DataRepresentation_2", "-t Square -x 2", "-t Square -x 1", IncompatibleQos, IncompatibleQos),
    ("Test_DataRepresentation_3", "-t Square -x 2", "-t Square -x 2", OK, OK),
    ("Test_Domain_0", "-t Square", "-t Square", OK, OK),
    ("Test_Domain_1", "-t Square", "-t Square -d 1", ReaderNotMatched, WriterNotMatched),
    ("Test_Domain_2", "-t Square -d 1", "-t Square", ReaderNotMatched, WriterNotMatched),
    ("Test_Domain_3", "-t Square -d 1", "-t Square -d 1", OK, OK),
    ("Test_Reliability_0", "-t Square -b", "-t Square -b", OK, OK),
    ("Test_Reliability_1", "-t Square -b", "-t Square -r", IncompatibleQos, IncompatibleQos),
    ("Test_Reliability_2", "-t Square -r", "-t Square -b", OK, OK),
    ("Test_Reliability_3", "-t Square -r -k 3", "-t Square -r", OK, OK),
    ("Test_Deadline_0", "-t Square -f 3", "-t Square -f 5", OK, OK),
    ("Test_Deadline_1", "-t Square -f 5", "-t Square -f 5", OK, OK),
    ("Test_Deadline_2", "-t Square -f 7", "-t Square -f 5", IncompatibleQos, IncompatibleQos),
    ("Test_Ownership_0", "-t Square -s -1", "-t Square -s -1", OK, OK),
    ("Test_Ownership_1", "-t Square -s -1", "-t Square -s 3", IncompatibleQos, IncompatibleQos),
    ("Test_Ownership_2", "-t Square -s 3", "-t Square -s -1", IncompatibleQos, IncompatibleQos),
    ("Test_Topic_0", "-t Square", "-t Square", OK, OK),
    ("Test_Topic_1", "-t Square", "-t Circle", ReaderNotMatched, WriterNotMatched),
    ("Test_Topic_2", "-t Circle", "-t Square", ReaderNotMatched, WriterNotMatched),
    ("Test_Topic_3", "-t Circle", "-t Circle", OK, OK),
    ("Test_Color_0", "-t Square -c BLUE", "-t Square -c BLUE", OK, OK),
    ("Test_Color_1", "-t Square -c BLUE", "-t Square -c RED", OK, DataNotReceived),
    ("Test_Color_2", "-t Square -c BLUE", "-t Square", OK, OK),
    ("Test_Color_3", "-t Square -c RED", "-t Square -c BLUE", OK, DataNotReceived),
    ("Test_Color_4", "-t Square -c RED", "-t Square -c RED", OK, OK),
    ("Test_Color_5", "-t Square -c RED", "-t Square", OK, OK),
    ("Test_Color_6", "-t Square", "-t Square -c BLUE", OK, OK),
    ("Test_Color_7", "-t Square", "-t Square -c RED", OK, DataNotReceived),
    ("Test_Color_8", "-t Square", "-t Square", OK, OK),
    ("Test_Partition_0", "-t Square -p \"p1\"", "-t Square -p \"p1\"", OK, OK),
    ("Test_Partition_1", "-t Square -p \"p1\"", "-t Square -p \"p2\"", ReaderNotMatched, WriterNotMatched),
    ("Test_Partition_2", "-t Square -p \"p2\"", "-t Square -p \"p1\"", ReaderNotMatched, WriterNotMatched),
    ("Test_Partition_3", "-t Square -p \"p2\"", "-t Square -p \"p2\"", OK, OK),
    ("Test_Durability_0", "-t Square -D v", "-t Square -D v", OK, OK),
    ("Test_Durability_1", "-t Square -D v", "-t Square -D l", IncompatibleQos, IncompatibleQos),
    ("Test_Durability_2", "-t Square -D v", "-t Square -D t", IncompatibleQos, IncompatibleQos),
    ("Test_Durability_3", "-t Square -D v", "-t Square -D p", IncompatibleQos, IncompatibleQos),
    ("Test_Durability_4", "-t Square -D l", "-t Square -D v", OK, OK),
    ("Test_Durability_5", "-t Square -D l", "-t Square -D l", OK, OK),
    ("Test_Durability_6", "-t Square -D l", "-t Square -D t", IncompatibleQos, IncompatibleQos),
    ("Test_Durability_7", "-t Square -D l", "-t Square -D p", IncompatibleQos, IncompatibleQos),
    ("Test_Durability_8", "-t Square -D t", "-t Square -D v", OK, OK),
    ("Test_Durability_9", "-t Square -D t", "-t Square -D l", OK, OK),
    ("Test_Durability_10", "-t Square -D t", "-t Square -D t", OK, OK),
    ("Test_Durability_11", "-t Square -D t", "-t Square -D p", IncompatibleQos, IncompatibleQos),
    ("Test_Durability_12", "-t Square -D p", "-t Square -D v", OK, OK),
    ("Test_Durability_13", "-t Square -D p", "-t Square -D l", OK, OK),
    ("Test_Durability_14", "-t Square -D p", "-t Square -D t", OK, OK),
    ("Test_Durability_15", "-t Square -D p", "-t Square -D p", OK, OK),
    ("Test_History_0", "-t Square -k 3", "-t Square -k 3", OK, OK),
    ("Test_History_1", "-t Square -k 3", "-t Square -k 0", OK, OK),
    ("Test_History_2", "-t Square -k 0", "-t Square -k 3", OK, OK),
    ("Test_History_3", "-t Square -k 0", "-t Square -k 0", OK, OK),
];

/// Append `-x 2` unless the parameters choose a data representation.
fn with_representation(parameters: &str) -> String {
    if parameters.split_ascii_whitespace().any(|t| t == "-x") {
        parameters.to_string()
    } else {
        format!("{} -x 2", parameters)
    }
}

fn timeout_for(publisher: Outcome, subscriber: Outcome) -> Duration {
    let communicates = publisher.is_ok()
        && matches!(
            subscriber,
            Outcome::Ok | Outcome::ReceivingFromOne | Outcome::ReceivingFromBoth
        );
    if communicates {
        LONG_TIMEOUT
    } else {
        SHORT_TIMEOUT
    }
}

fn pub_sub(name: &str, publisher: &str, subscriber: &str, pub_expected: Outcome, sub_expected: Outcome) -> TestCase {
    TestCase::new(name)
        .publisher(with_representation(publisher), pub_expected)
        .subscriber(with_representation(subscriber), sub_expected)
        .with_timeout(timeout_for(pub_expected, sub_expected))
}

/// Single publisher, single subscriber matrix over QoS settings.
pub fn interoperability() -> Suite {
    let mut cases: Vec<TestCase> = PUB_SUB_CASES
        .iter()
        .map(|&(name, publisher, subscriber, pub_expected, sub_expected)| {
            pub_sub(name, publisher, subscriber, pub_expected, sub_expected)
        })
        .collect();

    // Received samples must arrive in the order they were sent.
    let ordered = pub_sub(
        "Test_Reliability_4",
        "-t Square -r -k 0 -w",
        "-t Square -r -k 0",
        OK,
        OK,
    )
    .with_check(Check::OrderingCheck)
    .with_description("reliable keep-all: samples are received in publication order");
    let position = cases
        .iter()
        .position(|c| c.name == "Test_Deadline_0")
        .unwrap_or(cases.len());
    cases.insert(position, ordered);

    Suite::new("interoperability", cases)
        .with_description("one publisher and one subscriber per case")
}

/// Two publishers and one subscriber, classified by the multi-source check.
pub fn ownership() -> Suite {
    let cases = vec![
        TestCase::new("Test_Ownership_3")
            .with_description("different instances: ownership strength does not matter")
            .publisher(with_representation("-t Square -s 3 -c BLUE -w"), OK)
            .publisher(with_representation("-t Square -s 4 -c RED -w"), OK)
            .subscriber(with_representation("-t Square -s 2 -r -k 0"), Outcome::ReceivingFromBoth)
            .with_check(Check::MultiSourceCheck)
            .with_timeout(LONG_TIMEOUT),
        TestCase::new("Test_Ownership_4")
            .with_description("same instance: only the strongest publisher is received")
            .publisher(with_representation("-t Square -s 5 -r -k 0 -w"), OK)
            .publisher(with_representation("-t Square -s 4 -r -k 0 -w"), OK)
            .subscriber(with_representation("-t Square -s 2 -r -k 0"), Outcome::ReceivingFromOne)
            .with_check(Check::MultiSourceCheck)
            .with_timeout(LONG_TIMEOUT),
    ];

    Suite::new("ownership", cases).with_description("two publishers and one subscriber per case")
}
