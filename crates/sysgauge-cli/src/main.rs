//! CLI for sysgauge — live CPU, GPU and RAM telemetry in your terminal.

mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sysgauge")]
#[command(about = "sysgauge — live CPU, GPU and RAM telemetry")]
#[command(version = sysgauge_core::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// One-shot read of all three metrics
    Probe {
        /// Metric backend
        #[arg(long, default_value = "auto", value_parser = ["synthetic", "native", "auto"])]
        backend: String,

        /// Fixed seed for the synthetic walk
        #[arg(long)]
        seed: Option<u64>,

        /// RAM capacity in MB (default: detected, falling back to 8192)
        #[arg(long)]
        total_ram: Option<f64>,

        /// Drift step magnitude for the synthetic walk
        #[arg(long, default_value = "2.0")]
        variance: f64,

        /// Print machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Report which probe channels are available on this machine
    Scan {
        /// Print machine-readable JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Sample continuously and print percentages until Ctrl+C
    Watch {
        /// Sampling period in milliseconds
        #[arg(long, default_value = "75")]
        interval_ms: u64,

        /// Stop after this many seconds (default: run until Ctrl+C)
        #[arg(long)]
        duration: Option<f64>,

        /// Metric backend
        #[arg(long, default_value = "auto", value_parser = ["synthetic", "native", "auto"])]
        backend: String,

        /// Fixed seed for the synthetic walk
        #[arg(long)]
        seed: Option<u64>,

        /// RAM capacity in MB (default: detected, falling back to 8192)
        #[arg(long)]
        total_ram: Option<f64>,

        /// Drift step magnitude for the synthetic walk
        #[arg(long, default_value = "2.0")]
        variance: f64,

        /// Print one JSON object per display tick instead of text lines
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Probe {
            backend,
            seed,
            total_ram,
            variance,
            json,
        } => commands::probe::run(
            commands::monitor_config(&backend, seed, total_ram, variance, None),
            json,
        ),
        Commands::Scan { json } => commands::scan::run(json),
        Commands::Watch {
            interval_ms,
            duration,
            backend,
            seed,
            total_ram,
            variance,
            json,
        } => commands::watch::run(
            commands::monitor_config(&backend, seed, total_ram, variance, Some(interval_ms)),
            duration,
            json,
        ),
    }
}
