//! Single-slot latest-value channel from the tracking loop to the frame loop
//!
//! The writer overwrites, the reader peeks. Neither side ever waits on the
//! other, so the two loops can run at unrelated rates.

use tokio::sync::watch;

/// One smoothed, normalized sample plus its publish sequence number
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedSample {
    pub value: f32,
    /// Increases by one per publish
    pub seq: u64,
    /// Reset generation the smoothing history belonged to
    pub generation: u64,
}

/// Create a connected writer/reader pair with an empty slot
pub fn mailbox() -> (SampleWriter, SampleReader) {
    let (tx, rx) = watch::channel(None);
    (
        SampleWriter {
            tx,
            seq: 0,
            generation: 0,
        },
        SampleReader { rx },
    )
}

/// Tracking-loop side
#[derive(Debug)]
pub struct SampleWriter {
    tx: watch::Sender<Option<TrackedSample>>,
    seq: u64,
    generation: u64,
}

impl SampleWriter {
    /// Overwrite the slot with a new value
    pub fn publish(&mut self, value: f32) {
        self.seq += 1;
        self.tx.send_replace(Some(TrackedSample {
            value,
            seq: self.seq,
            generation: self.generation,
        }));
    }

    /// Empty the slot and stamp later publishes with `generation`
    pub fn start_generation(&mut self, generation: u64) {
        self.generation = generation;
        self.clear();
    }

    /// Empty the slot (readers see "no sample yet")
    pub fn clear(&mut self) {
        self.tx.send_replace(None);
    }

    /// All readers are gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Sequence number of the most recent publish
    pub fn seq(&self) -> u64 {
        self.seq
    }
}

/// Frame-loop side
#[derive(Debug, Clone)]
pub struct SampleReader {
    rx: watch::Receiver<Option<TrackedSample>>,
}

impl SampleReader {
    /// Most recent sample, without blocking
    pub fn latest_sample(&self) -> Option<TrackedSample> {
        *self.rx.borrow()
    }

    /// Most recent value, without blocking
    pub fn latest(&self) -> Option<f32> {
        self.latest_sample().map(|s| s.value)
    }
}
