//! Monitoring configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::metric::Metric;

/// Default sampling period. Fast enough that a gauge display feels live,
/// slow enough that the native probes stay cheap.
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(75);

/// Which metric source a session builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Seedable random-walk generator; never fails, runs anywhere.
    Synthetic,
    /// Real platform probes; construction fails where the platform
    /// facilities are missing.
    Native,
    /// Try native probes first, fall back to synthetic.
    #[default]
    Auto,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Synthetic => write!(f, "synthetic"),
            Self::Native => write!(f, "native"),
            Self::Auto => write!(f, "auto"),
        }
    }
}

/// Configuration for a monitoring session.
///
/// Capacities are fixed for the session lifetime; readings scale against
/// them but are never clamped at the source. `variance_factor` only
/// affects the synthetic backend.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// CPU capacity in percent terms (100 per full execution-unit set).
    pub total_cpu: f64,
    /// GPU capacity in percent terms.
    pub total_gpu: f64,
    /// RAM capacity in megabytes.
    pub total_ram: f64,
    /// Base step magnitude for the synthetic walk.
    pub variance_factor: f64,
    /// Period between sampling rounds.
    pub sample_interval: Duration,
    /// Fixed seed for the synthetic walk; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Source selection strategy.
    pub backend: Backend,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            total_cpu: 100.0,
            total_gpu: 100.0,
            total_ram: 8192.0,
            variance_factor: 2.0,
            sample_interval: DEFAULT_SAMPLE_INTERVAL,
            seed: None,
            backend: Backend::Auto,
        }
    }
}

impl MonitorConfig {
    /// Capacity for one metric, from the matching `total_*` field.
    pub fn capacity(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Cpu => self.total_cpu,
            Metric::Gpu => self.total_gpu,
            Metric::Ram => self.total_ram,
        }
    }
}
