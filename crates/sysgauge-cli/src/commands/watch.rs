//! Continuous watch loop: sample in the background, render at display rate.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;
use sysgauge_core::{Metric, MonitorConfig, Session};

use super::MetricRow;

/// Render period; sampling runs on its own interval underneath.
const DISPLAY_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Serialize)]
struct WatchTick {
    elapsed_s: f64,
    sequence: u64,
    metrics: Vec<MetricRow>,
}

pub fn run(config: MonitorConfig, duration: Option<f64>, json: bool) {
    // from_secs_f64 panics on negative or NaN input.
    let max_duration = duration.map(|secs| Duration::from_secs_f64(secs.max(0.0)));

    let session = Session::new(config);
    if let Err(err) = session.start_monitoring() {
        eprintln!("Error starting monitoring: {err}");
        std::process::exit(1);
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");

    if !json {
        println!(
            "Watching ({} backend, session {})",
            session.config().backend,
            session.id()
        );
        println!(
            "  Interval:  {}ms",
            session.config().sample_interval.as_millis()
        );
        match max_duration {
            Some(max) => println!("  Duration:  {:.0}s", max.as_secs_f64()),
            None => println!("  Duration:  until Ctrl+C"),
        }
        println!();
    }

    let start = Instant::now();
    while running.load(Ordering::SeqCst) {
        if let Some(max) = max_duration
            && start.elapsed() >= max
        {
            break;
        }

        render(&session, start.elapsed(), json);

        let deadline = Instant::now() + DISPLAY_INTERVAL;
        while Instant::now() < deadline && running.load(Ordering::SeqCst) {
            std::thread::sleep(Duration::from_millis(10));
        }
    }

    if let Err(err) = session.stop_monitoring() {
        eprintln!("Error stopping monitoring: {err}");
    }

    if !json {
        println!();
        println!(
            "Stopped after {:.1}s ({} store updates)",
            start.elapsed().as_secs_f64(),
            session.snapshot().sequence()
        );
    }
}

fn render(session: &Session, elapsed: Duration, json: bool) {
    if json {
        let snap = session.snapshot();
        let tick = WatchTick {
            elapsed_s: elapsed.as_secs_f64(),
            sequence: snap.sequence(),
            metrics: Metric::ALL
                .iter()
                .map(|&metric| MetricRow::from_result(metric, session.reading(metric)))
                .collect(),
        };
        println!(
            "{}",
            serde_json::to_string(&tick).expect("watch tick serialization")
        );
        return;
    }

    let cells: Vec<String> = Metric::ALL
        .iter()
        .map(|&metric| format_cell(session, metric))
        .collect();
    println!("[{:7.1}s] {}", elapsed.as_secs_f64(), cells.join("   "));
}

/// One metric cell: clamped percentage, `!` when the last read failed,
/// `--` before any data.
fn format_cell(session: &Session, metric: Metric) -> String {
    match session.reading(metric) {
        Ok(reading) => {
            let marker = if reading.valid { ' ' } else { '!' };
            format!("{metric} {:5.1}%{marker}", reading.percentage())
        }
        Err(_) => format!("{metric}   --  "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sysgauge_core::Backend;

    #[test]
    fn cells_show_placeholder_before_data() {
        let session = Session::new(MonitorConfig {
            backend: Backend::Synthetic,
            ..Default::default()
        });
        let cell = format_cell(&session, Metric::Cpu);
        assert!(cell.contains("--"), "unexpected cell: {cell}");
    }
}
