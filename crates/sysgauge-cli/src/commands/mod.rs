//! Subcommand implementations and shared flag plumbing.

pub mod probe;
pub mod scan;
pub mod watch;

use std::time::Duration;

use serde::Serialize;
use sysgauge_core::{Backend, Metric, MonitorConfig, Reading, SampleError, detect_total_ram_mb};

/// Parse a backend flag into the enum.
pub fn parse_backend(s: &str) -> Backend {
    match s {
        "synthetic" => Backend::Synthetic,
        "native" => Backend::Native,
        "auto" => Backend::Auto,
        _ => {
            eprintln!("Unknown backend '{s}', using auto");
            Backend::Auto
        }
    }
}

/// Map shared CLI flags onto a `MonitorConfig`.
///
/// RAM capacity takes the explicit flag first, then the host's detected
/// total, then the library default.
pub fn monitor_config(
    backend: &str,
    seed: Option<u64>,
    total_ram: Option<f64>,
    variance: f64,
    interval_ms: Option<u64>,
) -> MonitorConfig {
    let mut config = MonitorConfig {
        backend: parse_backend(backend),
        seed,
        variance_factor: variance,
        ..Default::default()
    };
    if let Some(ms) = interval_ms {
        config.sample_interval = Duration::from_millis(ms);
    }
    if let Some(ram) = total_ram.or_else(detect_total_ram_mb) {
        config.total_ram = ram;
    }
    config
}

/// One metric's row in JSON output, shared by probe and watch.
#[derive(Serialize)]
pub struct MetricRow {
    pub metric: Metric,
    pub unit: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capacity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MetricRow {
    pub fn from_result(metric: Metric, result: Result<Reading, SampleError>) -> Self {
        match result {
            Ok(reading) => Self {
                metric,
                unit: metric.unit(),
                value: Some(reading.value),
                capacity: Some(reading.capacity),
                percent: Some(reading.percentage()),
                valid: reading.valid,
                error: None,
            },
            Err(err) => Self {
                metric,
                unit: metric.unit(),
                value: None,
                capacity: None,
                percent: None,
                valid: false,
                error: Some(err.to_string()),
            },
        }
    }
}
