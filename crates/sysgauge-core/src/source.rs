//! Abstract metric source trait and static source metadata.
//!
//! Every backend implements [`MetricSource`]: one call, one metric, one
//! [`Reading`] or a failure. Sources are `Send + Sync` so a single instance
//! can be driven by the sampler thread while consumers inspect its metadata.

use crate::error::SampleError;
use crate::metric::{Metric, Reading};

/// Platform a source runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Works on any platform.
    Any,
    /// Requires macOS.
    MacOS,
    /// Requires Linux.
    Linux,
}

impl Platform {
    /// Whether the compile-time host matches this requirement.
    pub fn matches_host(self) -> bool {
        match self {
            Self::Any => true,
            Self::MacOS => cfg!(target_os = "macos"),
            Self::Linux => cfg!(target_os = "linux"),
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Any => write!(f, "any"),
            Self::MacOS => write!(f, "macos"),
            Self::Linux => write!(f, "linux"),
        }
    }
}

/// Metadata about a metric source.
///
/// Each source declares its name, a one-line description, the platform it
/// needs, and any measurement caveat a consumer should surface alongside
/// the numbers.
#[derive(Debug, Clone)]
pub struct SourceInfo {
    /// Unique identifier (e.g. `"native_probe"`).
    pub name: &'static str,
    /// One-line human-readable description.
    pub description: &'static str,
    /// Caveat about measurement fidelity; empty when readings are exact.
    pub caveat: &'static str,
    /// Platform requirement.
    pub platform: Platform,
    /// True when readings are generated rather than measured.
    pub synthetic: bool,
}

/// Trait that every metric source must implement.
pub trait MetricSource: Send + Sync {
    /// Source metadata.
    fn info(&self) -> &SourceInfo;

    /// Produce one reading for `metric`.
    ///
    /// A failed underlying measurement returns `Err`, never panics; the
    /// caller decides whether to retry, invalidate, or give up.
    fn read(&self, metric: Metric) -> Result<Reading, SampleError>;

    /// Convenience: name from info.
    fn name(&self) -> &'static str {
        self.info().name
    }
}
