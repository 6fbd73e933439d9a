//! Outcome taxonomy for one publisher or subscriber run.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The closed set of result codes a lifecycle driver can produce.
///
/// Serialized and displayed in `SCREAMING_SNAKE_CASE` (`OK`,
/// `READER_NOT_MATCHED`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Ok,
    UnrecognizedValue,
    TopicNotCreated,
    ReaderNotCreated,
    WriterNotCreated,
    FilterNotCreated,
    IncompatibleQos,
    ReaderNotMatched,
    WriterNotMatched,
    WriterNotAlive,
    DataNotReceived,
    DataNotSent,
    DataNotCorrect,
    ReceivingFromOne,
    ReceivingFromBoth,
}

/// Error parsing an outcome name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown outcome: {0}")]
pub struct ParseOutcomeError(pub String);

impl Outcome {
    /// Every outcome, in declaration order.
    pub const ALL: [Outcome; 15] = [
        Outcome::Ok,
        Outcome::UnrecognizedValue,
        Outcome::TopicNotCreated,
        Outcome::ReaderNotCreated,
        Outcome::WriterNotCreated,
        Outcome::FilterNotCreated,
        Outcome::IncompatibleQos,
        Outcome::ReaderNotMatched,
        Outcome::WriterNotMatched,
        Outcome::WriterNotAlive,
        Outcome::DataNotReceived,
        Outcome::DataNotSent,
        Outcome::DataNotCorrect,
        Outcome::ReceivingFromOne,
        Outcome::ReceivingFromBoth,
    ];

    /// Canonical name, as used in reports and suite files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Ok => "OK",
            Outcome::UnrecognizedValue => "UNRECOGNIZED_VALUE",
            Outcome::TopicNotCreated => "TOPIC_NOT_CREATED",
            Outcome::ReaderNotCreated => "READER_NOT_CREATED",
            Outcome::WriterNotCreated => "WRITER_NOT_CREATED",
            Outcome::FilterNotCreated => "FILTER_NOT_CREATED",
            Outcome::IncompatibleQos => "INCOMPATIBLE_QOS",
            Outcome::ReaderNotMatched => "READER_NOT_MATCHED",
            Outcome::WriterNotMatched => "WRITER_NOT_MATCHED",
            Outcome::WriterNotAlive => "WRITER_NOT_ALIVE",
            Outcome::DataNotReceived => "DATA_NOT_RECEIVED",
            Outcome::DataNotSent => "DATA_NOT_SENT",
            Outcome::DataNotCorrect => "DATA_NOT_CORRECT",
            Outcome::ReceivingFromOne => "RECEIVING_FROM_ONE",
            Outcome::ReceivingFromBoth => "RECEIVING_FROM_BOTH",
        }
    }

    /// What the outcome says about the application's behavior.
    pub fn description(&self) -> &'static str {
        match self {
            Outcome::Ok => "publisher/subscriber sent/received data correctly",
            Outcome::UnrecognizedValue => "parameters for the publisher/subscriber not supported",
            Outcome::TopicNotCreated => "publisher/subscriber does not create the topic",
            Outcome::ReaderNotCreated => "subscriber does not create the data reader",
            Outcome::WriterNotCreated => "publisher does not create the data writer",
            Outcome::FilterNotCreated => "subscriber does not create the content filter",
            Outcome::IncompatibleQos => "publisher/subscriber with incompatible QoS",
            Outcome::ReaderNotMatched => "publisher does not find any compatible data reader",
            Outcome::WriterNotMatched => "subscriber does not find any compatible data writer",
            Outcome::WriterNotAlive => "subscriber does not find any live data writer",
            Outcome::DataNotReceived => "subscriber does not receive the data",
            Outcome::DataNotSent => "publisher does not send the data",
            Outcome::DataNotCorrect => "subscriber does not find the data expected",
            Outcome::ReceivingFromOne => "subscriber receives from one publisher",
            Outcome::ReceivingFromBoth => "subscriber receives from two publishers",
        }
    }

    /// True only for [`Outcome::Ok`].
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Outcome {
    type Err = ParseOutcomeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Outcome::ALL
            .iter()
            .copied()
            .find(|o| o.as_str() == s)
            .ok_or_else(|| ParseOutcomeError(s.to_string()))
    }
}
