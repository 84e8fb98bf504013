//! # sysgauge-core
//!
//! **Live CPU, GPU and RAM telemetry for gauge-style displays.**
//!
//! `sysgauge-core` keeps three utilization channels fresh: a background
//! sampler reads a pluggable metric source on a fixed interval and
//! publishes into a concurrency-safe snapshot store, which any number of
//! consumers query without ever blocking the sampler. Probe hiccups mark
//! a channel invalid and keep the rest flowing; a display built on top
//! never sees a crash because one counter misbehaved for a tick.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sysgauge_core::{Metric, MonitorConfig, Session};
//!
//! let session = Session::new(MonitorConfig::default());
//! session.start_monitoring()?;
//!
//! std::thread::sleep(std::time::Duration::from_millis(300));
//! let pct = session.usage_percentage(Metric::Cpu)?;
//! println!("cpu at {pct:.1}%");
//!
//! session.stop_monitoring()?;
//! # Ok::<(), sysgauge_core::SampleError>(())
//! ```
//!
//! ## Architecture
//!
//! Source → Sampler (periodic loop) → SnapshotStore → consumer queries
//!
//! Two source backends implement the [`MetricSource`] trait:
//! - **SyntheticSource**: seedable bounded random walk, runs anywhere; the
//!   demo and test backend.
//! - **NativeProbeSource**: procfs/`ps` CPU and RAM measurement plus a
//!   GPU dispatch-latency proxy. Channels degrade independently when a
//!   platform facility is missing.
//!
//! The `Auto` backend tries native probes and falls back to synthetic, so
//! `Session::start_monitoring` always has something to sample.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod error;
pub mod metric;
pub mod sampler;
pub mod session;
pub mod snapshot;
pub mod source;
pub mod sources;

pub use config::{Backend, DEFAULT_SAMPLE_INTERVAL, MonitorConfig};
pub use error::SampleError;
pub use metric::{Metric, MetricSlot, Reading, Snapshot};
pub use sampler::Sampler;
pub use session::Session;
pub use snapshot::SnapshotStore;
pub use source::{MetricSource, Platform, SourceInfo};
pub use sources::{
    NativeProbeSource, ProbeAvailability, SyntheticSource, build_source, detect_total_ram_mb,
};
