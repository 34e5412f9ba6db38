//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for a benchmark run.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::profiler::DEFAULT_SETTLE_PASSES;
use crate::report::ReportFormat;

/// Root configuration for a benchmark run.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BenchConfig {
    /// Which routers and scenarios run.
    pub selection: SelectionConfig,

    /// Route table memory profiling.
    pub memory: MemoryConfig,

    /// Timing loop settings.
    pub simulator: SimulatorConfig,

    /// Output settings.
    pub report: ReportConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Router and scenario filters. Regular expressions; absent means all.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct SelectionConfig {
    pub routers: Option<String>,
    pub scenarios: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct MemoryConfig {
    /// Profile route-set builds. Requires the tracking allocator.
    pub enabled: bool,

    /// Counter reads on each side of a build before sampling.
    pub settle_passes: u32,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            settle_passes: DEFAULT_SETTLE_PASSES,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Minimum duration of the reported timing run, in milliseconds.
    pub bench_time_ms: u64,

    /// Upper bound on calibrated passes.
    pub max_iterations: u64,

    /// Run exactly this many passes instead of calibrating.
    pub fixed_iterations: Option<u64>,

    /// Untimed passes before calibration.
    pub warmup_passes: u32,

    /// Query string (without `?`) appended to every request.
    pub query: Option<String>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            bench_time_ms: 1000,
            max_iterations: 1_000_000_000,
            fixed_iterations: None,
            warmup_passes: 1,
            query: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ReportConfig {
    pub format: ReportFormat,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level or filter directive; `RUST_LOG` takes precedence.
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
