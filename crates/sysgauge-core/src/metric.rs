//! Metric identities, readings and the point-in-time snapshot model.
//!
//! A [`Reading`] is a structured value/capacity/validity triple, replacing
//! the ambiguous `(value, capacity)` pairs and `-1.0` error sentinels that
//! ad-hoc probe code tends to grow. Consumers always work with copies of
//! these types, never with references into live store state.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Metric
// ---------------------------------------------------------------------------

/// One of the three tracked utilization channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Aggregate CPU utilization, percent of the full execution-unit set.
    Cpu,
    /// GPU dispatch-latency proxy, percent of a fixed baseline duration.
    Gpu,
    /// Resident memory of the monitored process, megabytes.
    Ram,
}

impl Metric {
    /// All tracked metrics, in sampling order.
    pub const ALL: [Metric; 3] = [Metric::Cpu, Metric::Gpu, Metric::Ram];

    /// Stable slot index for store layout.
    pub(crate) fn index(self) -> usize {
        match self {
            Self::Cpu => 0,
            Self::Gpu => 1,
            Self::Ram => 2,
        }
    }

    /// Unit of the raw reading value (before any percentage view).
    pub fn unit(self) -> &'static str {
        match self {
            Self::Cpu | Self::Gpu => "%",
            Self::Ram => "MB",
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Gpu => write!(f, "gpu"),
            Self::Ram => write!(f, "ram"),
        }
    }
}

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

/// One sampled value for a metric at a point in time.
///
/// `value` is not required to stay within `[0, capacity]`: the synthetic
/// walk drifts freely and oversubscribed CPU can legitimately exceed 100.
/// Anything computing a percentage goes through [`Reading::percentage`],
/// which clamps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    /// Sampled value in the metric's raw unit.
    pub value: f64,
    /// Maximum attainable value, fixed at configuration time.
    pub capacity: f64,
    /// False when the last sampling attempt for this metric failed and
    /// `value` is the previous known-good measurement.
    pub valid: bool,
}

impl Reading {
    /// A fresh, valid reading.
    pub fn new(value: f64, capacity: f64) -> Self {
        Self {
            value,
            capacity,
            valid: true,
        }
    }

    /// Clamped percentage-of-capacity view: `clamp(value, 0, capacity) /
    /// capacity * 100`. Returns 0 when capacity is zero (or nonsensical)
    /// rather than dividing by it.
    pub fn percentage(&self) -> f64 {
        if self.capacity <= 0.0 {
            return 0.0;
        }
        self.value.clamp(0.0, self.capacity) / self.capacity * 100.0
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A metric's slot in the snapshot: the latest reading plus the global
/// sequence number at which it was last touched.
#[derive(Debug, Clone, Copy)]
pub struct MetricSlot {
    pub reading: Reading,
    /// Global store sequence at this slot's last publish or invalidation.
    pub sequence: u64,
}

/// The set of latest readings across all metrics.
///
/// Owned by the snapshot store; consumers get whole copies via
/// [`crate::snapshot::SnapshotStore::snapshot`]. The global sequence bumps
/// on every store mutation, so two copies can be compared for staleness.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    slots: [Option<MetricSlot>; 3],
    sequence: u64,
}

impl Snapshot {
    /// Latest slot for a metric, if anything was ever published for it.
    pub fn slot(&self, metric: Metric) -> Option<MetricSlot> {
        self.slots[metric.index()]
    }

    /// Global sequence number: how many mutations this snapshot has seen.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub(crate) fn record(&mut self, metric: Metric, reading: Reading) {
        self.sequence += 1;
        self.slots[metric.index()] = Some(MetricSlot {
            reading,
            sequence: self.sequence,
        });
    }

    /// Drop the validity flag on a metric's slot, keeping its last value.
    /// A slot that never saw a publish stays empty; invalidating data that
    /// never existed would fabricate a reading.
    pub(crate) fn invalidate(&mut self, metric: Metric) {
        self.sequence += 1;
        if let Some(slot) = &mut self.slots[metric.index()] {
            slot.reading.valid = false;
            slot.sequence = self.sequence;
        }
    }
}
