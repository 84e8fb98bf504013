//! Metric source implementations and backend selection.

pub mod helpers;

pub mod native;
pub mod synthetic;

pub use native::{NativeProbeSource, ProbeAvailability, detect_total_ram_mb};
pub use synthetic::SyntheticSource;

use log::info;

use crate::config::{Backend, MonitorConfig};
use crate::error::SampleError;
use crate::source::MetricSource;

/// Build the metric source selected by `config.backend`.
///
/// `Auto` tries the native probe first and falls back to the synthetic
/// walk when probe construction reports the backend unavailable.
pub fn build_source(config: &MonitorConfig) -> Result<Box<dyn MetricSource>, SampleError> {
    match config.backend {
        Backend::Synthetic => Ok(Box::new(SyntheticSource::new(config))),
        Backend::Native => Ok(Box::new(NativeProbeSource::new(config)?)),
        Backend::Auto => match NativeProbeSource::new(config) {
            Ok(probe) => Ok(Box::new(probe)),
            Err(err) => {
                info!("native probe unavailable ({err}), falling back to synthetic");
                Ok(Box::new(SyntheticSource::new(config)))
            }
        },
    }
}
