//! Prometheus exposition of run results.
//!
//! # Metrics
//! - `route_bench_heap_delta_bytes` (gauge): route table cost per router and fixture
//! - `route_bench_ns_per_dispatch` (gauge): mean dispatch latency per scenario
//! - `route_bench_dispatches_per_second` (gauge): throughput per scenario
//! - `route_bench_allocs_per_dispatch` (gauge): heap allocations per dispatch
//!
//! # Design Decisions
//! - A local recorder is built per render; no global recorder, no listener
//! - Labels: router, fixture, scenario
//! - Records that are excluded or failed emit nothing

use metrics::{describe_gauge, gauge, Label, Unit};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::report::{Record, RunReport};

pub const HEAP_DELTA_BYTES: &str = "route_bench_heap_delta_bytes";
pub const NS_PER_DISPATCH: &str = "route_bench_ns_per_dispatch";
pub const DISPATCHES_PER_SECOND: &str = "route_bench_dispatches_per_second";
pub const ALLOCS_PER_DISPATCH: &str = "route_bench_allocs_per_dispatch";

fn describe() {
    describe_gauge!(HEAP_DELTA_BYTES, Unit::Bytes, "Live heap growth caused by building the route table");
    describe_gauge!(NS_PER_DISPATCH, Unit::Nanoseconds, "Mean wall time per dispatch");
    describe_gauge!(DISPATCHES_PER_SECOND, "Dispatches completed per second");
    describe_gauge!(ALLOCS_PER_DISPATCH, "Heap allocations per dispatch");
}

fn labels(record: &Record) -> Vec<Label> {
    vec![
        Label::new("router", record.router.clone()),
        Label::new("fixture", record.fixture.clone()),
        Label::new("scenario", record.scenario.clone()),
    ]
}

fn record_gauges(record: &Record) {
    if !record.outcome.is_ok() {
        return;
    }
    if let Some(memory) = &record.memory {
        gauge!(HEAP_DELTA_BYTES, labels(record)).set(memory.delta_bytes as f64);
    }
    if let Some(timing) = &record.timing {
        gauge!(NS_PER_DISPATCH, labels(record)).set(timing.ns_per_dispatch);
        gauge!(DISPATCHES_PER_SECOND, labels(record)).set(timing.dispatches_per_sec);
        if let Some(allocs) = timing.allocs_per_dispatch {
            gauge!(ALLOCS_PER_DISPATCH, labels(record)).set(allocs);
        }
    }
}

/// Render every successful record as Prometheus text exposition.
pub fn render_prometheus(report: &RunReport) -> String {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();
    metrics::with_local_recorder(&recorder, || {
        describe();
        for record in &report.records {
            record_gauges(record);
        }
    });
    handle.render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{MemoryFigures, Outcome, TimingFigures};

    #[test]
    fn test_render_gauges() {
        let mut report = RunReport::new(Some(4));
        report.push(Record::memory(
            "routefinder",
            "github",
            Outcome::Ok,
            Some(MemoryFigures {
                before_bytes: 0,
                after_bytes: 2048,
                delta_bytes: 2048,
            }),
        ));
        report.push(Record::timing(
            "routefinder",
            "param1",
            "Param1",
            Outcome::Ok,
            Some(TimingFigures {
                iterations: 100,
                dispatches: 100,
                elapsed_ns: 2500,
                ns_per_dispatch: 25.0,
                dispatches_per_sec: 40_000_000.0,
                allocs_per_dispatch: None,
                bytes_per_dispatch: None,
            }),
        ));
        report.push(Record::timing(
            "brittle",
            "param1",
            "Param1",
            Outcome::Excluded { reason: "no".into() },
            None,
        ));

        let text = render_prometheus(&report);
        assert!(text.contains(HEAP_DELTA_BYTES));
        assert!(text.contains("router=\"routefinder\""));
        assert!(text.contains("scenario=\"Param1\""));
        assert!(text.contains(NS_PER_DISPATCH));
        assert!(!text.contains("router=\"brittle\""));
    }
}
