//! Line samples and probes
//!
//! A [`Probe`] watches one output line of a model and emits a [`Sample`]
//! over a crossbeam channel each time the line changes. The matching
//! [`Trace`] collects those samples and answers "what was the level at time t"
//! queries.

use super::clock::Edge;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::fmt;

/// Sample representing a line value at a specific time
///
/// This is a run-length encoded representation that is sent only when a line
/// changes. The value remains constant until the next Sample on the same line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sample {
    /// Line value at this timestamp
    pub value: bool,
    /// Timestamp in nanoseconds when this value started
    pub start_time: u64,
}

impl Sample {
    /// Create a new sample
    pub fn new(value: bool, start_time: u64) -> Self {
        Self { value, start_time }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Sample[v={}, t={}]", self.value, self.start_time)
    }
}

/// Sending side of a line monitor
pub struct Probe {
    tx: Sender<Sample>,
    last: Option<bool>,
}

impl Probe {
    /// Create a connected probe/trace pair
    pub fn pair() -> (Probe, Trace) {
        let (tx, rx) = unbounded();
        (
            Probe { tx, last: None },
            Trace {
                rx,
                samples: Vec::new(),
            },
        )
    }

    /// Report the line level at `time_ns`. Only changes are forwarded.
    pub fn observe(&mut self, value: bool, time_ns: u64) {
        if self.last == Some(value) {
            return;
        }
        self.last = Some(value);
        // A dropped trace just means nobody is listening anymore
        let _ = self.tx.send(Sample::new(value, time_ns));
    }
}

/// Receiving side of a line monitor
pub struct Trace {
    rx: Receiver<Sample>,
    samples: Vec<Sample>,
}

impl Trace {
    /// Pull everything the probe has sent so far without blocking
    pub fn collect(&mut self) -> &[Sample] {
        self.samples.extend(self.rx.try_iter());
        &self.samples
    }

    /// Level of the line at `timestamp`.
    ///
    /// A sample is valid from its start_time until the next sample's
    /// start_time; the last sample extends to infinity. Returns None before
    /// the first sample.
    pub fn value_at(&self, timestamp: u64) -> Option<bool> {
        let idx = self
            .samples
            .partition_point(|s| s.start_time <= timestamp);
        idx.checked_sub(1).map(|i| self.samples[i].value)
    }

    /// Timestamps of all edges of the given direction
    pub fn edge_times(&self, edge: Edge) -> Vec<u64> {
        self.samples
            .windows(2)
            .filter(|w| w[0].value != w[1].value && w[1].value == edge.level())
            .map(|w| w[1].start_time)
            .collect()
    }
}
