//! Error taxonomy for sampling and session control.

use crate::metric::Metric;
use thiserror::Error;

/// Everything that can go wrong between a probe and a consumer.
///
/// Probe-level failures (`ProbeUnavailable`, `ReadFailed`) surface from
/// [`crate::source::MetricSource`] implementations; lifecycle failures
/// (`AlreadyRunning`, `NotRunning`) from the sampler and session; and
/// `NoDataYet` from queries that race ahead of the first publish.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SampleError {
    /// The platform facility backing a probe does not exist or cannot be
    /// acquired on this host.
    #[error("probe unavailable: {0}")]
    ProbeUnavailable(String),

    /// A probe exists but a single read attempt failed.
    #[error("{metric} read failed: {reason}")]
    ReadFailed { metric: Metric, reason: String },

    /// Start was requested while the sampler was already running.
    #[error("sampler is already running")]
    AlreadyRunning,

    /// Stop (or a running-only operation) was requested while idle.
    #[error("sampler is not running")]
    NotRunning,

    /// No reading has ever been published for this metric.
    #[error("no {0} data yet")]
    NoDataYet(Metric),
}

impl SampleError {
    /// Shorthand for the common read-failure case.
    pub fn read_failed(metric: Metric, reason: impl Into<String>) -> Self {
        Self::ReadFailed {
            metric,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_metric() {
        let err = SampleError::read_failed(Metric::Gpu, "dispatch timed out");
        assert_eq!(err.to_string(), "gpu read failed: dispatch timed out");

        let err = SampleError::NoDataYet(Metric::Ram);
        assert_eq!(err.to_string(), "no ram data yet");
    }

    #[test]
    fn lifecycle_errors_are_distinct() {
        assert_ne!(SampleError::AlreadyRunning, SampleError::NotRunning);
    }
}
