//! Lifecycle driver: walks one entity through its stages and classifies the
//! first stage it fails to reach.
//!
//! Publisher: topic, writer, publication matched, data sent.
//! Subscriber: topic, reader, subscription matched, writer alive, data
//! received, then the verifier selected by the test case.

use std::time::Duration;

use interop_schema::{Check, Outcome, Role, Sample};
use regex::Regex;

use crate::channel::{SampleReader, SampleWriter, MAX_SAMPLES_SAVED};
use crate::expect::{Expect, OutputStream};
use crate::logger::{Logger, NullLogger};
use crate::patterns::markers;
use crate::verifier::verify;

/// Classifies the output of one entity into an [`Outcome`].
pub struct LifecycleDriver<'a> {
    role: Role,
    timeout: Duration,
    reports_samples: bool,
    check: Check,
    samples_out: Option<&'a SampleWriter>,
    samples_in: &'a [SampleReader],
    logger: &'a dyn Logger,
}

impl<'a> LifecycleDriver<'a> {
    /// Driver for `role` waiting at most `timeout` at each stage.
    pub fn new(role: Role, timeout: Duration) -> Self {
        Self {
            role,
            timeout,
            reports_samples: false,
            check: Check::NoCheck,
            samples_out: None,
            samples_in: &[],
            logger: &NullLogger,
        }
    }

    /// Builder: the publisher prints every sample it sends.
    pub fn with_sample_reporting(mut self, reports_samples: bool) -> Self {
        self.reports_samples = reports_samples;
        self
    }

    /// Builder: verifier run by a subscriber once data arrives.
    pub fn with_check(mut self, check: Check) -> Self {
        self.check = check;
        self
    }

    /// Builder: channel receiving the samples a publisher reports.
    pub fn with_samples_out(mut self, writer: &'a SampleWriter) -> Self {
        self.samples_out = Some(writer);
        self
    }

    /// Builder: publisher channels read by a subscriber's verifier,
    /// indexed by publisher ordinal.
    pub fn with_samples_in(mut self, readers: &'a [SampleReader]) -> Self {
        self.samples_in = readers;
        self
    }

    pub fn with_logger(mut self, logger: &'a dyn Logger) -> Self {
        self.logger = logger;
        self
    }

    /// Drive `stream` to completion.
    pub fn run(&self, stream: &mut dyn OutputStream) -> Outcome {
        let outcome = match self.create_topic(stream) {
            Err(outcome) => outcome,
            Ok(()) => match self.role {
                Role::Publisher => self.publish(stream),
                Role::Subscriber => self.subscribe(stream),
            },
        };
        self.logger.debug(&format!("outcome {}", outcome));
        outcome
    }

    fn wait_for(&self, stream: &mut dyn OutputStream, stage: &str, patterns: &[&Regex]) -> Expect {
        let result = stream.expect(patterns, self.timeout);
        match result {
            Expect::Matched(0) => self.logger.debug(stage),
            Expect::Matched(_) => self.logger.debug(&format!("{} failed", stage)),
            Expect::Timeout => self.logger.debug(&format!("{}: timed out", stage)),
            Expect::Eof => self.logger.debug(&format!("{}: output closed", stage)),
        }
        result
    }

    fn create_topic(&self, stream: &mut dyn OutputStream) -> Result<(), Outcome> {
        let m = markers();
        match self.wait_for(
            stream,
            "topic created",
            &[
                &m.topic_created,
                &m.topic_name_required,
                &m.parse_error,
                &m.unrecognized_value,
            ],
        ) {
            Expect::Matched(0) => Ok(()),
            Expect::Matched(3) => Err(Outcome::UnrecognizedValue),
            _ => Err(Outcome::TopicNotCreated),
        }
    }

    fn publish(&self, stream: &mut dyn OutputStream) -> Outcome {
        let m = markers();

        if !matches!(
            self.wait_for(stream, "writer created", &[&m.writer_created]),
            Expect::Matched(0)
        ) {
            return Outcome::WriterNotCreated;
        }

        match self.wait_for(
            stream,
            "publication matched",
            &[&m.publication_matched, &m.offered_incompatible_qos],
        ) {
            Expect::Matched(0) => {}
            Expect::Matched(_) => return Outcome::IncompatibleQos,
            _ => return Outcome::ReaderNotMatched,
        }

        if !self.reports_samples {
            return Outcome::Ok;
        }

        if !matches!(
            self.wait_for(stream, "data sent", &[&m.data]),
            Expect::Matched(0)
        ) {
            return Outcome::DataNotSent;
        }

        if let Some(writer) = self.samples_out {
            self.record_samples(stream, writer);
        }
        Outcome::Ok
    }

    /// Forward the token of the current and following data lines, up to
    /// [`MAX_SAMPLES_SAVED`], stopping at the first timeout or end of output.
    fn record_samples(&self, stream: &mut dyn OutputStream, writer: &SampleWriter) {
        let data = &markers().data;
        let mut recorded = 0;
        loop {
            if let Some(sample) = Sample::find_last(stream.before()) {
                if !writer.push(sample) {
                    self.logger.debug("sample channel full, sample dropped");
                }
            }
            recorded += 1;
            if recorded >= MAX_SAMPLES_SAVED {
                break;
            }
            if !matches!(stream.expect(&[data], self.timeout), Expect::Matched(_)) {
                break;
            }
        }
        self.logger.debug(&format!("recorded {} samples", recorded));
    }

    fn subscribe(&self, stream: &mut dyn OutputStream) -> Outcome {
        let m = markers();

        match self.wait_for(stream, "reader created", &[&m.reader_created, &m.filter_failed]) {
            Expect::Matched(0) => {}
            Expect::Matched(_) => return Outcome::FilterNotCreated,
            _ => return Outcome::ReaderNotCreated,
        }

        match self.wait_for(
            stream,
            "subscription matched",
            &[&m.subscription_matched, &m.requested_incompatible_qos],
        ) {
            Expect::Matched(0) => {}
            Expect::Matched(_) => return Outcome::IncompatibleQos,
            _ => return Outcome::WriterNotMatched,
        }

        if !matches!(
            self.wait_for(stream, "writer alive", &[&m.liveliness_changed]),
            Expect::Matched(0)
        ) {
            return Outcome::WriterNotAlive;
        }

        if !matches!(
            self.wait_for(stream, "data received", &[&m.data]),
            Expect::Matched(0)
        ) {
            return Outcome::DataNotReceived;
        }

        verify(self.check, stream, self.samples_in, self.timeout, self.logger)
    }
}
