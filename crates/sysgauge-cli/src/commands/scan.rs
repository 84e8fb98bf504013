//! Probe channel availability report.

use serde::Serialize;
use sysgauge_core::{Metric, ProbeAvailability, detect_total_ram_mb};

#[derive(Serialize)]
struct ScanReport {
    cpu: bool,
    gpu: bool,
    ram: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_ram_mb: Option<f64>,
}

pub fn run(json: bool) {
    let avail = ProbeAvailability::detect();
    let total_ram = detect_total_ram_mb();

    if json {
        let report = ScanReport {
            cpu: avail.cpu,
            gpu: avail.gpu,
            ram: avail.ram,
            total_ram_mb: total_ram,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&report).expect("scan report serialization")
        );
        return;
    }

    println!("Native probe channels on this machine:\n");
    for metric in Metric::ALL {
        let marker = if avail.available(metric) {
            "\u{2705} available"
        } else {
            "\u{274C} unavailable"
        };
        println!("  {:<4} {marker}", metric.to_string());
    }

    println!();
    match total_ram {
        Some(mb) => println!("Detected RAM: {mb:.0} MB"),
        None => println!("Detected RAM: unknown"),
    }

    if !avail.any() {
        println!();
        println!("No native facilities found; the auto backend will fall back to synthetic.");
    }
}
