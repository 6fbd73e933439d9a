//! Per-publisher queues carrying the samples a publisher reported sending.

use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use interop_schema::Sample;

/// Maximum number of samples a publisher records for verification.
pub const MAX_SAMPLES_SAVED: usize = 100;

/// Create a sample channel holding at most `capacity` samples.
pub fn sample_channel(capacity: usize) -> (SampleWriter, SampleReader) {
    let (tx, rx) = bounded(capacity);
    (SampleWriter { tx }, SampleReader { rx })
}

/// Publisher side of a sample channel. Dropping it closes the channel.
#[derive(Debug)]
pub struct SampleWriter {
    tx: Sender<Sample>,
}

impl SampleWriter {
    /// Queue a sample without blocking. Returns false if the sample was
    /// dropped because the channel is full or no reader remains.
    pub fn push(&self, sample: Sample) -> bool {
        match self.tx.try_send(sample) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Subscriber side of a sample channel. Clones share the same queue.
#[derive(Debug, Clone)]
pub struct SampleReader {
    rx: Receiver<Sample>,
}

impl SampleReader {
    /// Take the oldest sample, waiting at most `wait`.
    ///
    /// `None` means nothing arrived in time, or the writer is gone and the
    /// queue is empty.
    pub fn take(&self, wait: Duration) -> Option<Sample> {
        self.rx.recv_timeout(wait).ok()
    }

    /// Everything queued right now, oldest first.
    pub fn drain(&self) -> Vec<Sample> {
        self.rx.try_iter().collect()
    }

    /// Number of queued samples.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
