//! Report rendering.
//!
//! The table mimics `go test -bench` output: one line per timing record,
//! followed by a memory section listing each router's route table cost.

use std::fmt::Write;

use crate::observability::metrics::render_prometheus;
use crate::report::{Outcome, Record, ReportFormat, RunReport};

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to format report: {0}")]
    Format(#[from] std::fmt::Error),
}

pub fn render(report: &RunReport, format: ReportFormat) -> Result<String, ReportError> {
    match format {
        ReportFormat::Table => render_table(report),
        ReportFormat::Json => render_json(report),
        ReportFormat::Prometheus => Ok(render_prometheus(report)),
    }
}

pub fn render_json(report: &RunReport) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(report)?)
}

fn status_note(outcome: &Outcome) -> Option<String> {
    match outcome {
        Outcome::Ok => None,
        Outcome::Excluded { reason } => Some(format!("excluded: {reason}")),
        Outcome::Failed { reason } => Some(format!("FAILED: {reason}")),
    }
}

fn write_timing_line(out: &mut String, width: usize, record: &Record) -> std::fmt::Result {
    let label = record.label();
    if let Some(note) = status_note(&record.outcome) {
        return writeln!(out, "{label:<width$}  {note}");
    }
    let Some(timing) = &record.timing else {
        return writeln!(out, "{label:<width$}  no timing");
    };
    write!(
        out,
        "{label:<width$}  {:>12}  {:>12.1} ns/op",
        timing.iterations, timing.ns_per_dispatch
    )?;
    match (timing.bytes_per_dispatch, timing.allocs_per_dispatch) {
        (Some(bytes), Some(allocs)) => writeln!(out, "  {bytes:>10.0} B/op  {allocs:>8.2} allocs/op"),
        _ => writeln!(out),
    }
}

fn write_memory_line(out: &mut String, record: &Record) -> std::fmt::Result {
    let router = &record.router;
    let fixture = &record.fixture;
    if let Some(note) = status_note(&record.outcome) {
        return writeln!(out, "  {router:<10} {fixture:<10} {note}");
    }
    match &record.memory {
        Some(memory) => writeln!(out, "  {router:<10} {fixture:<10} {:>10} Bytes", memory.delta_bytes),
        None => writeln!(out, "  {router:<10} {fixture:<10} built (memory not measured)"),
    }
}

pub fn render_table(report: &RunReport) -> Result<String, ReportError> {
    let mut out = String::new();
    writeln!(out, "run {}", report.run_id)?;

    let timing: Vec<&Record> = report.timing_records().collect();
    if !timing.is_empty() {
        let width = timing.iter().map(|r| r.label().len()).max().unwrap_or(0);
        writeln!(out)?;
        for record in timing {
            write_timing_line(&mut out, width, record)?;
        }
    }

    let memory: Vec<&Record> = report.memory_records().collect();
    if !memory.is_empty() {
        writeln!(out)?;
        match report.settle_passes {
            Some(passes) => writeln!(out, "route table memory ({passes} settle passes):")?,
            None => writeln!(out, "route table memory:")?,
        }
        for record in memory {
            write_memory_line(&mut out, record)?;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{MemoryFigures, TimingFigures};

    fn sample_report() -> RunReport {
        let mut report = RunReport::new(Some(4));
        report.push(Record::memory(
            "matchit",
            "github",
            Outcome::Ok,
            Some(MemoryFigures {
                before_bytes: 1000,
                after_bytes: 43_000,
                delta_bytes: 42_000,
            }),
        ));
        report.push(Record::memory(
            "literal",
            "github",
            Outcome::Excluded {
                reason: "path parameters unsupported".into(),
            },
            None,
        ));
        report.push(Record::timing(
            "matchit",
            "github",
            "GithubAll",
            Outcome::Ok,
            Some(TimingFigures {
                iterations: 20_000,
                dispatches: 4_060_000,
                elapsed_ns: 1_000_000_000,
                ns_per_dispatch: 246.3,
                dispatches_per_sec: 4_060_000.0,
                allocs_per_dispatch: Some(0.0),
                bytes_per_dispatch: Some(0.0),
            }),
        ));
        report
    }

    #[test]
    fn test_table_contains_sections() {
        let table = render_table(&sample_report()).unwrap();
        assert!(table.contains("Matchit_GithubAll"));
        assert!(table.contains("246.3 ns/op"));
        assert!(table.contains("allocs/op"));
        assert!(table.contains("route table memory (4 settle passes):"));
        assert!(table.contains("42000 Bytes"));
        assert!(table.contains("excluded: path parameters unsupported"));
    }

    #[test]
    fn test_json_round_trips_through_value() {
        let json = render_json(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["settle_passes"], 4);
        assert_eq!(value["records"].as_array().unwrap().len(), 3);
        assert_eq!(value["records"][0]["memory"]["delta_bytes"], 42_000);
        assert!(value["records"][1].get("memory").is_none());
    }
}
