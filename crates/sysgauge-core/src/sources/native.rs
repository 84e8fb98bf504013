//! NativeProbeSource — real CPU, GPU and RAM measurement.
//!
//! Availability is decided at runtime, not compile time: each channel
//! checks for its platform facility (`/proc` files, `ps`, `sips`) and a
//! missing facility degrades that one channel to per-read failures while
//! the others keep working.
//!
//! **GPU caveat:** the GPU number is a dispatch-latency proxy. One small
//! image resize is submitted through macOS's `sips` (which dispatches
//! Metal/CoreImage work) and its wall-clock time is expressed as a
//! percentage of a fixed baseline. A busy GPU stretches submission
//! latency, so the number tracks contention, but it is not a hardware
//! occupancy figure and must not be presented as one.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use log::warn;
use tempfile::NamedTempFile;

use crate::config::MonitorConfig;
use crate::error::SampleError;
use crate::metric::{Metric, Reading};
use crate::source::{MetricSource, Platform, SourceInfo};

use super::helpers::{command_exists, run_command};

/// Aggregate CPU tick line in procfs.
const PROC_STAT: &str = "/proc/stat";
/// Resident-memory counters for this process in procfs.
const PROC_STATM: &str = "/proc/self/statm";
/// Path to the sips binary on macOS.
const SIPS_PATH: &str = "/usr/bin/sips";

/// Wall-clock baseline one GPU dispatch is measured against.
const GPU_DISPATCH_BASELINE: Duration = Duration::from_millis(50);

/// Resize targets cycled between dispatches so sips does real work each
/// call instead of hitting a cached result.
const DISPATCH_SIZES: [u32; 4] = [16, 32, 24, 48];

static NATIVE_INFO: SourceInfo = SourceInfo {
    name: "native_probe",
    description: "OS-level CPU, GPU and RAM measurement",
    caveat: "gpu is a dispatch-latency proxy, not hardware occupancy",
    platform: Platform::Any,
    synthetic: false,
};

// ---------------------------------------------------------------------------
// Availability
// ---------------------------------------------------------------------------

/// Which probe channels can work on this host.
///
/// Detection is cheap (path checks and a `which`), so consumers can call
/// it before deciding whether to build a [`NativeProbeSource`] at all.
#[derive(Debug, Clone, Copy)]
pub struct ProbeAvailability {
    pub cpu: bool,
    pub gpu: bool,
    pub ram: bool,
}

impl ProbeAvailability {
    /// Check each channel's platform facility.
    pub fn detect() -> Self {
        let has_procfs = Path::new(PROC_STAT).exists();
        let has_ps = command_exists("ps");
        Self {
            cpu: has_procfs || has_ps,
            gpu: Path::new(SIPS_PATH).exists(),
            ram: Path::new(PROC_STATM).exists() || has_ps,
        }
    }

    /// Availability of a single channel.
    pub fn available(&self, metric: Metric) -> bool {
        match metric {
            Metric::Cpu => self.cpu,
            Metric::Gpu => self.gpu,
            Metric::Ram => self.ram,
        }
    }

    /// True when at least one channel can produce readings.
    pub fn any(&self) -> bool {
        self.cpu || self.gpu || self.ram
    }
}

/// Best-effort detection of total physical RAM in megabytes.
///
/// Linux reads `MemTotal` from `/proc/meminfo`; macOS asks
/// `sysctl hw.memsize`. Consumers that want a real RAM capacity pass the
/// result into [`MonitorConfig::total_ram`] instead of the default.
pub fn detect_total_ram_mb() -> Option<f64> {
    if let Ok(meminfo) = std::fs::read_to_string("/proc/meminfo") {
        let kb: f64 = meminfo
            .lines()
            .find(|line| line.starts_with("MemTotal:"))?
            .split_whitespace()
            .nth(1)?
            .parse()
            .ok()?;
        return Some(kb / 1024.0);
    }
    let bytes: f64 = run_command("sysctl", &["-n", "hw.memsize"])?.trim().parse().ok()?;
    Some(bytes / (1024.0 * 1024.0))
}

// ---------------------------------------------------------------------------
// CPU tick accounting (procfs)
// ---------------------------------------------------------------------------

/// One sample of the aggregate `cpu` line: jiffies spent busy vs. total.
#[derive(Debug, Clone, Copy)]
struct CpuTicks {
    busy: u64,
    total: u64,
}

/// Parse the aggregate jiffy counters from `/proc/stat`.
fn read_cpu_ticks() -> Option<CpuTicks> {
    let stat = std::fs::read_to_string(PROC_STAT).ok()?;
    parse_cpu_line(stat.lines().next()?)
}

fn parse_cpu_line(line: &str) -> Option<CpuTicks> {
    let mut fields = line.split_whitespace();
    if fields.next()? != "cpu" {
        return None;
    }
    let ticks: Vec<u64> = fields.filter_map(|f| f.parse().ok()).collect();
    // user nice system idle at minimum; iowait counts as idle when present.
    if ticks.len() < 4 {
        return None;
    }
    let total: u64 = ticks.iter().sum();
    let idle = ticks[3] + ticks.get(4).copied().unwrap_or(0);
    Some(CpuTicks {
        busy: total - idle,
        total,
    })
}

// ---------------------------------------------------------------------------
// NativeProbeSource
// ---------------------------------------------------------------------------

/// Metric source backed by the real operating environment.
///
/// CPU is utilization across the whole execution-unit set since the last
/// read (procfs jiffy deltas, or summed `ps` percentages normalized by
/// core count where procfs is absent). RAM is this process's resident
/// size in megabytes. GPU is the dispatch-latency proxy described in the
/// module docs.
pub struct NativeProbeSource {
    capacities: [f64; 3],
    /// Previous jiffy sample for delta-based utilization. Stays `None` on
    /// hosts without procfs, where the `ps` path needs no baseline.
    cpu_baseline: Mutex<Option<CpuTicks>>,
    /// Scratch image for GPU dispatch. Owned exclusively by this probe
    /// and deleted when it drops, failure paths included.
    scratch: Option<NamedTempFile>,
    dispatch_round: AtomicU64,
}

impl NativeProbeSource {
    /// Build a probe for this host, or `ProbeUnavailable` when neither a
    /// CPU nor a RAM facility exists.
    ///
    /// A missing GPU facility is not fatal: GPU reads fail per-call and
    /// the other channels keep going.
    pub fn new(config: &MonitorConfig) -> Result<Self, SampleError> {
        let avail = ProbeAvailability::detect();
        if !avail.cpu && !avail.ram {
            return Err(SampleError::ProbeUnavailable(
                "no cpu or ram probe facility on this host".into(),
            ));
        }

        let scratch = if avail.gpu {
            match create_scratch_image() {
                Ok(file) => Some(file),
                Err(err) => {
                    warn!("gpu scratch image setup failed: {err}");
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            capacities: [config.total_cpu, config.total_gpu, config.total_ram],
            cpu_baseline: Mutex::new(read_cpu_ticks()),
            scratch,
            dispatch_round: AtomicU64::new(0),
        })
    }

    fn read_cpu(&self) -> Result<f64, SampleError> {
        if Path::new(PROC_STAT).exists() {
            self.read_cpu_procfs()
        } else {
            read_cpu_ps()
        }
    }

    /// Utilization from jiffy deltas between this read and the previous
    /// one. The first delta after construction can land inside a single
    /// jiffy; that read fails and the next tick recovers.
    fn read_cpu_procfs(&self) -> Result<f64, SampleError> {
        let current = read_cpu_ticks().ok_or_else(|| {
            SampleError::read_failed(Metric::Cpu, format!("cannot parse {PROC_STAT}"))
        })?;

        let mut baseline = self.cpu_baseline.lock().unwrap();
        let previous = baseline.replace(current);
        drop(baseline);

        let Some(previous) = previous else {
            return Err(SampleError::read_failed(Metric::Cpu, "no baseline sample"));
        };

        let total_delta = current.total.saturating_sub(previous.total);
        if total_delta == 0 {
            return Err(SampleError::read_failed(
                Metric::Cpu,
                "no tick delta since last read",
            ));
        }
        let busy_delta = current.busy.saturating_sub(previous.busy);
        Ok(busy_delta as f64 / total_delta as f64 * 100.0)
    }

    fn read_ram(&self) -> Result<f64, SampleError> {
        if Path::new(PROC_STATM).exists() {
            read_ram_statm()
        } else {
            read_ram_ps()
        }
    }

    /// Time one `sips` resize of the scratch image against the fixed
    /// baseline.
    fn read_gpu(&self) -> Result<f64, SampleError> {
        let Some(scratch) = &self.scratch else {
            return Err(SampleError::read_failed(
                Metric::Gpu,
                "no gpu dispatch surface on this host",
            ));
        };

        let round = self.dispatch_round.fetch_add(1, Ordering::Relaxed) as usize;
        let size = DISPATCH_SIZES[round % DISPATCH_SIZES.len()].to_string();

        let started = Instant::now();
        let status = Command::new(SIPS_PATH)
            .args([
                "--resampleWidth",
                &size,
                "--resampleHeight",
                &size,
                scratch.path().to_str().unwrap_or(""),
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|err| {
                SampleError::read_failed(Metric::Gpu, format!("sips dispatch failed: {err}"))
            })?;
        let elapsed = started.elapsed();

        if !status.success() {
            return Err(SampleError::read_failed(Metric::Gpu, "sips exited with failure"));
        }
        Ok(elapsed.as_secs_f64() / GPU_DISPATCH_BASELINE.as_secs_f64() * 100.0)
    }
}

impl MetricSource for NativeProbeSource {
    fn info(&self) -> &SourceInfo {
        &NATIVE_INFO
    }

    fn read(&self, metric: Metric) -> Result<Reading, SampleError> {
        let raw = match metric {
            Metric::Cpu => self.read_cpu(),
            Metric::Gpu => self.read_gpu(),
            Metric::Ram => self.read_ram(),
        }?;

        // A kernel counter wrap or parser slip must not masquerade as data.
        if !raw.is_finite() || raw < 0.0 {
            return Err(SampleError::read_failed(
                metric,
                format!("measurement out of range: {raw}"),
            ));
        }
        Ok(Reading::new(raw, self.capacities[metric.index()]))
    }
}

// ---------------------------------------------------------------------------
// Probe primitives
// ---------------------------------------------------------------------------

/// Summed per-process `%cpu` from `ps`, normalized by core count.
fn read_cpu_ps() -> Result<f64, SampleError> {
    let out = run_command("ps", &["-A", "-o", "%cpu="])
        .ok_or_else(|| SampleError::read_failed(Metric::Cpu, "ps -A -o %cpu failed"))?;
    let sum: f64 = out
        .lines()
        .filter_map(|line| line.trim().parse::<f64>().ok())
        .sum();
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    Ok(sum / cores as f64)
}

/// Resident pages from `/proc/self/statm` times the page size, in MB.
fn read_ram_statm() -> Result<f64, SampleError> {
    let statm = std::fs::read_to_string(PROC_STATM).map_err(|err| {
        SampleError::read_failed(Metric::Ram, format!("cannot read {PROC_STATM}: {err}"))
    })?;
    let resident: f64 = statm
        .split_whitespace()
        .nth(1)
        .and_then(|field| field.parse().ok())
        .ok_or_else(|| SampleError::read_failed(Metric::Ram, "malformed statm line"))?;

    // SAFETY: sysconf(_SC_PAGESIZE) is always safe and returns the page size.
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if page_size <= 0 {
        return Err(SampleError::read_failed(Metric::Ram, "page size unavailable"));
    }
    Ok(resident * page_size as f64 / (1024.0 * 1024.0))
}

/// Resident set size of this process via `ps`, in MB.
fn read_ram_ps() -> Result<f64, SampleError> {
    let pid = std::process::id().to_string();
    let out = run_command("ps", &["-o", "rss=", "-p", &pid])
        .ok_or_else(|| SampleError::read_failed(Metric::Ram, "ps -o rss failed"))?;
    let kb: f64 = out
        .trim()
        .parse()
        .map_err(|_| SampleError::read_failed(Metric::Ram, "malformed rss output"))?;
    Ok(kb / 1024.0)
}

/// Minimal valid BMP (8x8, 24-bit, uncompressed) used as the sips resize
/// target.
fn scratch_bmp() -> Vec<u8> {
    const WIDTH: u32 = 8;
    const HEIGHT: u32 = 8;
    // 24bpp rows are 24 bytes wide here, already 4-byte aligned.
    let pixel_bytes = WIDTH * HEIGHT * 3;
    let file_size = 54 + pixel_bytes;

    let mut bmp = Vec::with_capacity(file_size as usize);
    // File header: magic, size, reserved, pixel-data offset.
    bmp.extend_from_slice(b"BM");
    bmp.extend_from_slice(&file_size.to_le_bytes());
    bmp.extend_from_slice(&[0u8; 4]);
    bmp.extend_from_slice(&54u32.to_le_bytes());
    // BITMAPINFOHEADER.
    bmp.extend_from_slice(&40u32.to_le_bytes());
    bmp.extend_from_slice(&WIDTH.to_le_bytes());
    bmp.extend_from_slice(&HEIGHT.to_le_bytes());
    bmp.extend_from_slice(&1u16.to_le_bytes());
    bmp.extend_from_slice(&24u16.to_le_bytes());
    // Compression, image size, resolution, palette fields all zero.
    bmp.extend_from_slice(&[0u8; 24]);
    // Mid-gray pixels.
    bmp.resize(file_size as usize, 0x80);
    bmp
}

/// Write the scratch BMP into a temp file that lives as long as the probe.
fn create_scratch_image() -> std::io::Result<NamedTempFile> {
    let mut file = NamedTempFile::with_suffix(".bmp")?;
    file.write_all(&scratch_bmp())?;
    file.flush()?;
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_info() {
        assert_eq!(NATIVE_INFO.name, "native_probe");
        assert!(!NATIVE_INFO.synthetic);
        assert!(!NATIVE_INFO.caveat.is_empty());
    }

    #[test]
    fn scratch_bmp_is_valid() {
        let bmp = scratch_bmp();
        assert_eq!(&bmp[0..2], b"BM");
        // Declared file size matches the buffer.
        let size = u32::from_le_bytes([bmp[2], bmp[3], bmp[4], bmp[5]]);
        assert_eq!(size as usize, bmp.len());
        // Pixel data starts at offset 54.
        assert_eq!(bmp.len(), 54 + 8 * 8 * 3);
    }

    #[test]
    fn parse_cpu_line_basic() {
        let ticks = parse_cpu_line("cpu  100 0 50 800 50 0 0 0 0 0").unwrap();
        assert_eq!(ticks.total, 1000);
        // idle + iowait excluded from busy
        assert_eq!(ticks.busy, 150);
    }

    #[test]
    fn parse_cpu_line_short_is_rejected() {
        assert!(parse_cpu_line("cpu 1 2 3").is_none());
        assert!(parse_cpu_line("cpu0 100 0 50 800").is_none());
        assert!(parse_cpu_line("").is_none());
    }

    #[test]
    fn parse_cpu_line_without_iowait() {
        // Minimal 4-field line still parses; idle is field 4 alone.
        let ticks = parse_cpu_line("cpu 10 0 10 80").unwrap();
        assert_eq!(ticks.total, 100);
        assert_eq!(ticks.busy, 20);
    }

    #[test]
    fn availability_detection_runs() {
        let avail = ProbeAvailability::detect();
        // Every channel flag must agree with the per-metric view.
        for metric in Metric::ALL {
            let _ = avail.available(metric);
        }
        assert_eq!(avail.any(), avail.cpu || avail.gpu || avail.ram);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn statm_ram_reads_something() {
        let mb = read_ram_statm().unwrap();
        // A running test binary is at least a megabyte resident.
        assert!(mb > 1.0);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn procfs_cpu_availability() {
        assert!(ProbeAvailability::detect().cpu);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn ram_read_passes_the_range_check() {
        // RAM on procfs is deterministic enough to assert on; the value
        // has been through the wrapper's finite/non-negative validation.
        let probe = NativeProbeSource::new(&MonitorConfig::default()).unwrap();
        let reading = probe.read(Metric::Ram).unwrap();
        assert!(reading.valid);
        assert!(reading.value >= 0.0);
        assert_eq!(reading.capacity, 8192.0);
    }

    #[test]
    #[cfg(target_os = "linux")]
    fn gpu_read_fails_cleanly_without_dispatch_surface() {
        let probe = NativeProbeSource::new(&MonitorConfig::default()).unwrap();
        if probe.scratch.is_none() {
            let err = probe.read(Metric::Gpu).unwrap_err();
            assert!(matches!(err, SampleError::ReadFailed { metric: Metric::Gpu, .. }));
        }
    }

    #[test]
    #[cfg(target_os = "macos")]
    #[ignore] // Requires sips binary and GPU
    fn gpu_dispatch_produces_a_reading() {
        let probe = NativeProbeSource::new(&MonitorConfig::default()).unwrap();
        let reading = probe.read(Metric::Gpu).unwrap();
        assert!(reading.value > 0.0);
    }

    #[test]
    #[ignore] // Requires a real host with cpu accounting
    fn cpu_delta_settles_after_a_tick() {
        let probe = NativeProbeSource::new(&MonitorConfig::default()).unwrap();
        // First delta may land inside one jiffy; wait out a few.
        std::thread::sleep(Duration::from_millis(120));
        let reading = probe.read(Metric::Cpu).unwrap();
        assert!(reading.value >= 0.0);
    }
}
