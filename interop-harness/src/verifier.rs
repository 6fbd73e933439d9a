//! Subscriber-side checks run once data starts arriving.
//!
//! Each check reads the subscriber's live output together with the sample
//! channels of the publishers, and turns what it sees into an [`Outcome`].

use std::collections::HashSet;
use std::time::Duration;

use interop_schema::{Check, Outcome, Sample};

use crate::channel::SampleReader;
use crate::expect::{Expect, OutputStream};
use crate::logger::Logger;
use crate::patterns::markers;

/// Samples compared against the publisher by the ordering check.
pub const ORDERING_CHECK_SAMPLES: usize = 3;

/// Data markers inspected by the multi-source check before giving up.
pub const MULTI_SOURCE_ITERATIONS: usize = 80;

/// Run the verifier selected by `check`.
///
/// The stream must be positioned just after a data marker, so that the
/// current window holds the token of the sample just received. `channels`
/// is indexed by publisher ordinal.
pub fn verify(
    check: Check,
    stream: &mut dyn OutputStream,
    channels: &[SampleReader],
    timeout: Duration,
    logger: &dyn Logger,
) -> Outcome {
    match check {
        Check::NoCheck => Outcome::Ok,
        Check::OrderingCheck => ordering_check(stream, channels.first(), timeout, logger),
        Check::MultiSourceCheck => multi_source_check(stream, channels.get(1), timeout, logger),
    }
}

/// Token of the sample the subscriber just printed.
fn current_sample(stream: &dyn OutputStream) -> Option<Sample> {
    Sample::find_last(&format!("{}{}", stream.before(), stream.after()))
}

fn next_data(stream: &mut dyn OutputStream, timeout: Duration, logger: &dyn Logger) -> bool {
    logger.verbose("waiting for samples");
    matches!(
        stream.expect(&[&markers().data], timeout),
        Expect::Matched(_)
    )
}

/// Compare received samples with those the first publisher sent, in order.
fn ordering_check(
    stream: &mut dyn OutputStream,
    sent: Option<&SampleReader>,
    timeout: Duration,
    logger: &dyn Logger,
) -> Outcome {
    let Some(sent) = sent else {
        logger.info("ordering check without a publisher sample channel");
        return Outcome::DataNotCorrect;
    };

    for _ in 0..ORDERING_CHECK_SAMPLES {
        let Some(expected) = sent.take(timeout) else {
            logger.verbose("publisher sample channel starved");
            break;
        };
        let received = current_sample(stream);
        if received.as_ref() != Some(&expected) {
            logger.verbose(&format!(
                "expected sample {}, received {}",
                expected,
                received.map_or_else(|| "nothing".to_string(), |s| s.to_string())
            ));
            return Outcome::DataNotCorrect;
        }
        if !next_data(stream, timeout, logger) {
            break;
        }
    }

    Outcome::Ok
}

/// Decide whether samples arrive from one publisher or from two.
///
/// A sample whose token the second publisher reported belongs to it; any
/// other sample belongs to the first. A source counts as received only when
/// it shows up after the other source has already been seen.
///
/// If the second publisher never reports a sample the result is
/// `ReceivingFromOne`. Once it stops reporting, classification continues
/// against the samples already collected without waiting again.
fn multi_source_check(
    stream: &mut dyn OutputStream,
    second: Option<&SampleReader>,
    timeout: Duration,
    logger: &dyn Logger,
) -> Outcome {
    let Some(second) = second else {
        logger.info("multi-source check without a second publisher sample channel");
        return Outcome::ReceivingFromOne;
    };

    let mut second_samples: HashSet<Sample> = HashSet::new();
    let mut first_seen = false;
    let mut second_seen = false;
    let mut first_received = false;
    let mut second_received = false;
    let mut exhausted = false;

    for _ in 0..MULTI_SOURCE_ITERATIONS {
        if !exhausted {
            match second.take(timeout) {
                Some(sample) => {
                    second_samples.insert(sample);
                }
                None if second_samples.is_empty() => {
                    logger.verbose("second publisher sample channel starved");
                    break;
                }
                None => exhausted = true,
            }
        }
        second_samples.extend(second.drain());

        if let Some(current) = current_sample(stream) {
            if second_samples.contains(&current) {
                second_received |= first_seen;
                second_seen = true;
            } else {
                first_received |= second_seen;
                first_seen = true;
            }
        }

        if first_received && second_received {
            return Outcome::ReceivingFromBoth;
        }
        if !next_data(stream, timeout, logger) {
            break;
        }
    }

    Outcome::ReceivingFromOne
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::sample_channel;
    use crate::expect::{ScriptedSession, Step};
    use crate::logger::MockLogger;

    const WAIT: Duration = Duration::from_millis(500);

    fn data_line(token: &str) -> String {
        format!("Square     BLUE       {} [20]", token)
    }

    /// Session positioned just after the first data marker.
    fn positioned(tokens: &[&str], hang: bool) -> ScriptedSession {
        let mut steps: Vec<Step> = tokens.iter().map(|t| Step::Line(data_line(t))).collect();
        if hang {
            steps.push(Step::Hang);
        }
        let mut session = ScriptedSession::new(steps);
        assert_eq!(
            session.expect(&[&markers().data], WAIT),
            Expect::Matched(0)
        );
        session
    }

    fn channel_with(tokens: &[&str]) -> SampleReader {
        let (writer, reader) = sample_channel(100);
        for token in tokens {
            assert!(writer.push(Sample::new(*token)));
        }
        reader
    }

    // ===========================================
    // NoCheck
    // ===========================================

    #[test]
    fn test_no_check_is_ok() {
        let mut session = positioned(&["001 001"], false);
        let outcome = verify(Check::NoCheck, &mut session, &[], WAIT, &MockLogger::new());
        assert_eq!(outcome, Outcome::Ok);
    }

    // ===========================================
    // Ordering check
    // ===========================================

    #[test]
    fn test_ordering_matching_samples() {
        let tokens = ["001 001", "002 002", "003 003"];
        let mut session = positioned(&tokens, false);
        let channels = [channel_with(&tokens)];

        let outcome = verify(Check::OrderingCheck, &mut session, &channels, WAIT, &MockLogger::new());
        assert_eq!(outcome, Outcome::Ok);
    }

    #[test]
    fn test_ordering_mismatch() {
        let mut session = positioned(&["001 001", "003 003", "004 004"], false);
        let channels = [channel_with(&["001 001", "002 002", "003 003"])];

        let logger = MockLogger::new();
        let outcome = verify(Check::OrderingCheck, &mut session, &channels, WAIT, &logger);
        assert_eq!(outcome, Outcome::DataNotCorrect);
        assert!(logger.contains("expected sample 002 002, received 003 003"));
    }

    #[test]
    fn test_ordering_first_sample_wrong() {
        let mut session = positioned(&["009 009"], false);
        let channels = [channel_with(&["001 001"])];
        let outcome = verify(Check::OrderingCheck, &mut session, &channels, WAIT, &MockLogger::new());
        assert_eq!(outcome, Outcome::DataNotCorrect);
    }

    #[test]
    fn test_ordering_starved_channel_keeps_outcome() {
        let mut session = positioned(&["001 001", "002 002"], true);
        let channels = [channel_with(&["001 001"])];

        let logger = MockLogger::new();
        let outcome = verify(
            Check::OrderingCheck,
            &mut session,
            &channels,
            Duration::from_millis(50),
            &logger,
        );
        assert_eq!(outcome, Outcome::Ok);
        assert!(logger.contains("starved"));
    }

    #[test]
    fn test_ordering_stream_ends_early() {
        let mut session = positioned(&["001 001"], false);
        let channels = [channel_with(&["001 001", "002 002", "003 003"])];
        let outcome = verify(Check::OrderingCheck, &mut session, &channels, WAIT, &MockLogger::new());
        assert_eq!(outcome, Outcome::Ok);
    }

    #[test]
    fn test_ordering_without_channel() {
        let mut session = positioned(&["001 001"], false);
        let outcome = verify(Check::OrderingCheck, &mut session, &[], WAIT, &MockLogger::new());
        assert_eq!(outcome, Outcome::DataNotCorrect);
    }

    #[test]
    fn test_ordering_logs_waits() {
        let tokens = ["001 001", "002 002"];
        let mut session = positioned(&tokens, false);
        let channels = [channel_with(&tokens)];
        let logger = MockLogger::new();
        verify(Check::OrderingCheck, &mut session, &channels, WAIT, &logger);
        assert!(logger.contains("waiting for samples"));
    }

    // ===========================================
    // Multi-source check
    // ===========================================

    #[test]
    fn test_multi_source_both() {
        // First publisher: 1xx, second publisher: 2xx.
        let mut session = positioned(&["101 101", "201 201", "102 102", "202 202"], false);
        let first = channel_with(&["101 101", "102 102"]);
        let second = channel_with(&["201 201", "202 202"]);

        let outcome = verify(
            Check::MultiSourceCheck,
            &mut session,
            &[first, second],
            WAIT,
            &MockLogger::new(),
        );
        assert_eq!(outcome, Outcome::ReceivingFromBoth);
    }

    #[test]
    fn test_multi_source_only_first() {
        let mut session = positioned(&["101 101", "102 102", "103 103"], false);
        let first = channel_with(&["101 101", "102 102", "103 103"]);
        let second = channel_with(&["201 201", "202 202", "203 203"]);

        let outcome = verify(
            Check::MultiSourceCheck,
            &mut session,
            &[first, second],
            WAIT,
            &MockLogger::new(),
        );
        assert_eq!(outcome, Outcome::ReceivingFromOne);
    }

    #[test]
    fn test_multi_source_switch_once_is_one() {
        // Exclusive ownership handing over once: first, then only second.
        let mut session = positioned(&["101 101", "201 201", "202 202"], false);
        let first = channel_with(&["101 101"]);
        let second = channel_with(&["201 201", "202 202", "203 203"]);

        let outcome = verify(
            Check::MultiSourceCheck,
            &mut session,
            &[first, second],
            WAIT,
            &MockLogger::new(),
        );
        assert_eq!(outcome, Outcome::ReceivingFromOne);
    }

    #[test]
    fn test_multi_source_missing_second_channel() {
        let mut session = positioned(&["101 101"], false);
        let first = channel_with(&["101 101"]);
        let outcome = verify(
            Check::MultiSourceCheck,
            &mut session,
            &[first],
            WAIT,
            &MockLogger::new(),
        );
        assert_eq!(outcome, Outcome::ReceivingFromOne);
    }

    #[test]
    fn test_multi_source_starved_second_channel() {
        let mut session = positioned(&["101 101", "201 201"], true);
        let first = channel_with(&["101 101"]);
        let second = channel_with(&[]);
        let outcome = verify(
            Check::MultiSourceCheck,
            &mut session,
            &[first, second],
            Duration::from_millis(50),
            &MockLogger::new(),
        );
        assert_eq!(outcome, Outcome::ReceivingFromOne);
    }

    #[test]
    fn test_current_sample_uses_last_token() {
        let mut session = ScriptedSession::from_lines([
            "Square     RED        005 006 [20]".to_string(),
        ]);
        session.expect(&[&markers().data], WAIT);
        assert_eq!(current_sample(&session), Some(Sample::new("005 006")));
    }
}
