//! Run results.
//!
//! # Data Flow
//! ```text
//! Harness::run
//!     → Record per (router, fixture, scenario)   memory records use scenario "Build"
//!     → RunReport { run_id, settle_passes, records }
//!     → render.rs (table | json) / observability::metrics (prometheus)
//! ```

pub mod render;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::profiler::MemorySample;
use crate::simulator::TimingSample;

pub use render::{render, render_json, render_table, ReportError};

/// Scenario name carried by memory records.
pub const BUILD_SCENARIO: &str = "Build";

/// Output format of a rendered report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Table,
    Json,
    Prometheus,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            "prometheus" => Ok(Self::Prometheus),
            other => Err(format!("unknown report format: {other} (expected table, json or prometheus)")),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Table => "table",
            Self::Json => "json",
            Self::Prometheus => "prometheus",
        })
    }
}

/// Status of one measurement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok,
    /// The router cannot express the fixture's routes.
    Excluded { reason: String },
    /// Build error, panic, miss or wrong answer.
    Failed { reason: String },
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, Outcome::Ok)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryFigures {
    pub before_bytes: u64,
    pub after_bytes: u64,
    pub delta_bytes: i64,
}

impl From<MemorySample> for MemoryFigures {
    fn from(sample: MemorySample) -> Self {
        Self {
            before_bytes: sample.before,
            after_bytes: sample.after,
            delta_bytes: sample.delta(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingFigures {
    pub iterations: u64,
    pub dispatches: u64,
    pub elapsed_ns: u64,
    pub ns_per_dispatch: f64,
    pub dispatches_per_sec: f64,
    pub allocs_per_dispatch: Option<f64>,
    pub bytes_per_dispatch: Option<f64>,
}

impl From<&TimingSample> for TimingFigures {
    fn from(sample: &TimingSample) -> Self {
        Self {
            iterations: sample.iterations,
            dispatches: sample.dispatches,
            elapsed_ns: u64::try_from(sample.elapsed.as_nanos()).unwrap_or(u64::MAX),
            ns_per_dispatch: sample.ns_per_dispatch(),
            dispatches_per_sec: sample.dispatches_per_sec(),
            allocs_per_dispatch: sample.allocs_per_dispatch(),
            bytes_per_dispatch: sample.bytes_per_dispatch(),
        }
    }
}

/// One (router, fixture, scenario) result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub router: String,
    pub fixture: String,
    pub scenario: String,
    pub outcome: Outcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<MemoryFigures>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingFigures>,
}

impl Record {
    pub fn memory(router: &str, fixture: &str, outcome: Outcome, memory: Option<MemoryFigures>) -> Self {
        Self {
            router: router.to_string(),
            fixture: fixture.to_string(),
            scenario: BUILD_SCENARIO.to_string(),
            outcome,
            memory,
            timing: None,
        }
    }

    pub fn timing(
        router: &str,
        fixture: &str,
        scenario: &str,
        outcome: Outcome,
        timing: Option<TimingFigures>,
    ) -> Self {
        Self {
            router: router.to_string(),
            fixture: fixture.to_string(),
            scenario: scenario.to_string(),
            outcome,
            memory: None,
            timing,
        }
    }

    pub fn is_memory(&self) -> bool {
        self.scenario == BUILD_SCENARIO
    }

    /// `<Router>_<Scenario>`, e.g. `Matchit_GithubAll`.
    pub fn label(&self) -> String {
        let mut chars = self.router.chars();
        let router: String = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        format!("{router}_{}", self.scenario)
    }
}

/// Everything one benchmark run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    /// `None` when memory profiling was disabled.
    pub settle_passes: Option<u32>,
    pub records: Vec<Record>,
}

impl RunReport {
    pub fn new(settle_passes: Option<u32>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            settle_passes,
            records: Vec::new(),
        }
    }

    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    pub fn memory_records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| r.is_memory())
    }

    pub fn timing_records(&self) -> impl Iterator<Item = &Record> {
        self.records.iter().filter(|r| !r.is_memory())
    }

    pub fn find(&self, router: &str, scenario: &str) -> Option<&Record> {
        self.records
            .iter()
            .find(|r| r.router == router && r.scenario == scenario)
    }

    pub fn failures(&self) -> impl Iterator<Item = &Record> {
        self.records
            .iter()
            .filter(|r| matches!(r.outcome, Outcome::Failed { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
        assert_eq!("prometheus".parse::<ReportFormat>(), Ok(ReportFormat::Prometheus));
        assert!("yaml".parse::<ReportFormat>().is_err());
        assert_eq!(ReportFormat::default().to_string(), "table");
    }

    #[test]
    fn test_label() {
        let record = Record::timing("matchit", "github", "GithubAll", Outcome::Ok, None);
        assert_eq!(record.label(), "Matchit_GithubAll");
        assert!(!record.is_memory());
        assert!(Record::memory("axum", "static", Outcome::Ok, None).is_memory());
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(Outcome::Excluded {
            reason: "path parameters unsupported".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "excluded");
        assert_eq!(json["reason"], "path parameters unsupported");
        assert_eq!(serde_json::to_value(Outcome::Ok).unwrap()["status"], "ok");
    }

    #[test]
    fn test_report_queries() {
        let mut report = RunReport::new(Some(4));
        report.push(Record::memory("routefinder", "github", Outcome::Ok, None));
        report.push(Record::timing(
            "routefinder",
            "param1",
            "Param1",
            Outcome::Failed { reason: "miss".into() },
            None,
        ));
        assert_eq!(report.memory_records().count(), 1);
        assert_eq!(report.timing_records().count(), 1);
        assert_eq!(report.failures().count(), 1);
        assert!(report.find("routefinder", "Param1").is_some());
        assert!(report.find("axum", "Param1").is_none());
    }
}
