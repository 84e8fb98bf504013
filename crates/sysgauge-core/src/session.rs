//! Monitoring session lifecycle and the consumer-facing query API.
//!
//! A session ties together one snapshot store, one sampler and a config.
//! Starting builds a fresh metric source for the configured backend and
//! hands it to the sampler; stopping joins the loop and releases whatever
//! platform resources the source held. The store outlives start/stop
//! cycles, so the last readings of a stopped session stay queryable.

use std::sync::Arc;

use log::info;
use uuid::Uuid;

use crate::config::MonitorConfig;
use crate::error::SampleError;
use crate::metric::{Metric, Reading, Snapshot};
use crate::sampler::Sampler;
use crate::snapshot::SnapshotStore;
use crate::sources::build_source;

/// Lifecycle controller for one monitoring run.
pub struct Session {
    id: String,
    config: MonitorConfig,
    store: Arc<SnapshotStore>,
    sampler: Sampler,
}

impl Session {
    /// Create an idle session; no source is built until monitoring starts.
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            config,
            store: Arc::new(SnapshotStore::new()),
            sampler: Sampler::new(),
        }
    }

    /// Session identifier used in log lines.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Build the configured source and begin sampling.
    ///
    /// `AlreadyRunning` when monitoring is active; `ProbeUnavailable` when
    /// the native backend is requested on a host that cannot serve it.
    pub fn start_monitoring(&self) -> Result<(), SampleError> {
        if self.sampler.is_running() {
            return Err(SampleError::AlreadyRunning);
        }

        let source = build_source(&self.config)?;
        info!(
            "session {}: starting {} sampling every {:?}",
            self.id,
            source.name(),
            self.config.sample_interval
        );
        self.sampler
            .start(source, Arc::clone(&self.store), self.config.sample_interval)
    }

    /// Stop sampling; the last published readings remain queryable.
    pub fn stop_monitoring(&self) -> Result<(), SampleError> {
        self.sampler.stop()?;
        info!("session {}: monitoring stopped", self.id);
        Ok(())
    }

    /// Whether the sampling loop is currently active.
    pub fn is_running(&self) -> bool {
        self.sampler.is_running()
    }

    /// Latest `(value, capacity)` pair for a metric.
    ///
    /// The caller computes any percentage itself; no unit conversion is
    /// implied.
    pub fn usage(&self, metric: Metric) -> Result<(f64, f64), SampleError> {
        let reading = self.store.query(metric)?;
        Ok((reading.value, reading.capacity))
    }

    /// Latest clamped percentage-of-capacity for a metric.
    pub fn usage_percentage(&self, metric: Metric) -> Result<f64, SampleError> {
        self.store.query_percentage(metric)
    }

    /// Latest full reading for a metric.
    pub fn reading(&self, metric: Metric) -> Result<Reading, SampleError> {
        self.store.query(metric)
    }

    /// Copy of the whole snapshot, sequence numbers included.
    pub fn snapshot(&self) -> Snapshot {
        self.store.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Backend;
    use std::time::{Duration, Instant};

    fn synthetic_config() -> MonitorConfig {
        MonitorConfig {
            backend: Backend::Synthetic,
            sample_interval: Duration::from_millis(1),
            seed: Some(11),
            ..Default::default()
        }
    }

    fn wait_for_data(session: &Session) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while session.reading(Metric::Ram).is_err() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn fresh_session_is_idle_with_no_data() {
        let session = Session::new(synthetic_config());
        assert!(!session.is_running());
        assert_eq!(
            session.usage(Metric::Cpu).unwrap_err(),
            SampleError::NoDataYet(Metric::Cpu)
        );
        assert!(!session.id().is_empty());
    }

    #[test]
    fn stop_before_start_is_rejected() {
        let session = Session::new(synthetic_config());
        assert_eq!(
            session.stop_monitoring().unwrap_err(),
            SampleError::NotRunning
        );
    }

    #[test]
    fn start_query_stop_round_trip() {
        let session = Session::new(synthetic_config());
        session.start_monitoring().unwrap();
        assert!(session.is_running());

        wait_for_data(&session);
        let (value, capacity) = session.usage(Metric::Cpu).unwrap();
        assert!(value.is_finite());
        assert_eq!(capacity, 100.0);

        let pct = session.usage_percentage(Metric::Cpu).unwrap();
        assert!((0.0..=100.0).contains(&pct));

        session.stop_monitoring().unwrap();
        assert!(!session.is_running());

        // Last readings survive the stop.
        assert!(session.usage(Metric::Cpu).is_ok());
    }

    #[test]
    fn double_start_is_rejected_and_loop_survives() {
        let session = Session::new(synthetic_config());
        session.start_monitoring().unwrap();
        assert_eq!(
            session.start_monitoring().unwrap_err(),
            SampleError::AlreadyRunning
        );
        assert!(session.is_running());
        session.stop_monitoring().unwrap();
    }

    #[test]
    fn session_restarts_after_stop() {
        let session = Session::new(synthetic_config());
        for _ in 0..3 {
            session.start_monitoring().unwrap();
            wait_for_data(&session);
            session.stop_monitoring().unwrap();
        }
        assert!(session.snapshot().sequence() > 0);
    }

    #[test]
    fn snapshot_reports_all_metrics_after_a_tick() {
        let session = Session::new(synthetic_config());
        session.start_monitoring().unwrap();
        wait_for_data(&session);
        session.stop_monitoring().unwrap();

        let snap = session.snapshot();
        for metric in Metric::ALL {
            let slot = snap.slot(metric).unwrap();
            assert!(slot.reading.valid);
            assert!(slot.sequence > 0);
        }
    }
}
