//! Concurrency-safe holder of the latest reading per metric.
//!
//! One producer (the sampler loop) publishes while any number of consumers
//! query. A single mutex over the snapshot serializes writes against reads;
//! every accessor copies out, so a consumer never holds the lock across its
//! own work and never observes a torn write. Readers only ever wait on an
//! in-progress update, never on a future one.

use std::sync::Mutex;

use log::debug;

use crate::error::SampleError;
use crate::metric::{Metric, Reading, Snapshot};

/// Shared store for the most recent reading of each metric.
#[derive(Default)]
pub struct SnapshotStore {
    inner: Mutex<Snapshot>,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish a fresh reading for `metric`, bumping the global sequence.
    pub fn publish(&self, metric: Metric, reading: Reading) {
        let mut snap = self.inner.lock().unwrap();
        snap.record(metric, reading);
        debug!(
            "publish {metric} {:.1}/{:.1} seq={}",
            reading.value,
            reading.capacity,
            snap.sequence()
        );
    }

    /// Mark `metric`'s slot invalid after a failed read, keeping its last
    /// value and capacity untouched. A metric that never published stays
    /// empty, so `query` keeps answering `NoDataYet` for it.
    pub fn mark_invalid(&self, metric: Metric) {
        let mut snap = self.inner.lock().unwrap();
        snap.invalidate(metric);
    }

    /// Latest reading for `metric`, or `NoDataYet` before the first
    /// publish.
    pub fn query(&self, metric: Metric) -> Result<Reading, SampleError> {
        let snap = self.inner.lock().unwrap();
        snap.slot(metric)
            .map(|slot| slot.reading)
            .ok_or(SampleError::NoDataYet(metric))
    }

    /// Clamped percentage view of the latest reading.
    pub fn query_percentage(&self, metric: Metric) -> Result<f64, SampleError> {
        Ok(self.query(metric)?.percentage())
    }

    /// Global sequence number: total store mutations so far.
    pub fn sequence(&self) -> u64 {
        self.inner.lock().unwrap().sequence()
    }

    /// Full copy of the current snapshot.
    pub fn snapshot(&self) -> Snapshot {
        self.inner.lock().unwrap().clone()
    }
}
