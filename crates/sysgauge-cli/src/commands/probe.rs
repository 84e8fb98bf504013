//! One-shot read of all three metrics.

use std::time::Duration;

use serde::Serialize;
use sysgauge_core::{Metric, MonitorConfig, build_source};

use super::MetricRow;

#[derive(Serialize)]
struct ProbeReport {
    backend: &'static str,
    metrics: Vec<MetricRow>,
}

pub fn run(config: MonitorConfig, json: bool) {
    let source = match build_source(&config) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    // Delta-based probes need a little headroom between the construction
    // baseline and the first read.
    std::thread::sleep(config.sample_interval.max(Duration::from_millis(100)));

    let rows: Vec<MetricRow> = Metric::ALL
        .iter()
        .map(|&metric| MetricRow::from_result(metric, source.read(metric)))
        .collect();

    if json {
        let report = ProbeReport {
            backend: source.name(),
            metrics: rows,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).expect("probe report serialization")
        );
        return;
    }

    println!("Backend: {} ({})", source.name(), source.info().description);
    if !source.info().caveat.is_empty() {
        println!("Caveat:  {}", source.info().caveat);
    }
    println!();

    for row in &rows {
        match (row.value, row.percent, &row.error) {
            (Some(value), Some(percent), _) => {
                println!(
                    "  {:<4} {:>9.1} {:<3} of {:.1} {:<3} ({:.1}%)",
                    row.metric.to_string(),
                    value,
                    row.unit,
                    row.capacity.unwrap_or(0.0),
                    row.unit,
                    percent
                );
            }
            (_, _, Some(error)) => {
                println!("  {:<4} unavailable ({error})", row.metric.to_string());
            }
            _ => {}
        }
    }
}
