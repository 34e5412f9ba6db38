//! Calibrated timing loop.
//!
//! # Responsibilities
//! - Grow the iteration count until a pass lasts at least the target time
//! - Count allocations made inside the timed region
//!
//! # Design Decisions
//! - Only the final, long-enough run is reported
//! - Growth per round is capped at 100x and is always at least +1
//! - Heap counters are read outside `Instant` bracketing

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::adapters::Dispatcher;
use crate::profiler::{self, HeapSnapshot};
use crate::simulator::plan::DispatchPlan;
use crate::simulator::SimulationError;

/// Knobs of the timing loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingConfig {
    pub bench_time: Duration,
    pub max_iterations: u64,
    /// Skip calibration and run exactly this many passes.
    pub fixed_iterations: Option<u64>,
    pub warmup_passes: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            bench_time: Duration::from_secs(1),
            max_iterations: 1_000_000_000,
            fixed_iterations: None,
            warmup_passes: 1,
        }
    }
}

/// Raw outcome of one timed run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimingSample {
    /// Passes over the plan.
    pub iterations: u64,
    /// Individual dispatches, `iterations * plan.len()`, saturating.
    pub dispatches: u64,
    pub elapsed: Duration,
    pub allocations: Option<u64>,
    pub allocated_bytes: Option<u64>,
}

impl TimingSample {
    pub fn ns_per_dispatch(&self) -> f64 {
        if self.dispatches == 0 {
            return 0.0;
        }
        self.elapsed.as_nanos() as f64 / self.dispatches as f64
    }

    pub fn dispatches_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.dispatches as f64 / secs
    }

    pub fn allocs_per_dispatch(&self) -> Option<f64> {
        let allocations = self.allocations?;
        Some(per_dispatch(allocations, self.dispatches))
    }

    pub fn bytes_per_dispatch(&self) -> Option<f64> {
        let bytes = self.allocated_bytes?;
        Some(per_dispatch(bytes, self.dispatches))
    }
}

fn per_dispatch(total: u64, dispatches: u64) -> f64 {
    if dispatches == 0 {
        0.0
    } else {
        total as f64 / dispatches as f64
    }
}

/// Dispatches issued by `iterations` passes over a plan of `per_pass` requests.
fn dispatch_count(iterations: u64, per_pass: usize) -> u64 {
    iterations.saturating_mul(u64::try_from(per_pass).unwrap_or(u64::MAX))
}

/// Predict the next iteration count from the last run.
pub fn next_iterations(previous: u64, elapsed: Duration, target: Duration, max: u64) -> u64 {
    let previous = previous.max(1) as u128;
    let elapsed_ns = elapsed.as_nanos().max(1);
    let mut next = target.as_nanos() * previous / elapsed_ns;
    next += next / 5;
    next = next.min(previous * 100);
    next = next.max(previous + 1);
    next.min(max as u128) as u64
}

/// Drives plans through dispatchers.
#[derive(Debug, Clone)]
pub struct Simulator {
    config: TimingConfig,
    track_allocations: bool,
}

impl Simulator {
    pub fn new(config: TimingConfig) -> Self {
        Self {
            config,
            track_allocations: profiler::tracking_enabled(),
        }
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    /// Warm up, calibrate, and time `plan` against `dispatcher`.
    pub fn measure(&self, plan: &mut DispatchPlan, dispatcher: &dyn Dispatcher) -> Result<TimingSample, SimulationError> {
        for _ in 0..self.config.warmup_passes {
            plan.run_once(dispatcher)?;
        }

        if let Some(iterations) = self.config.fixed_iterations {
            return self.timed(plan, dispatcher, iterations);
        }

        let mut iterations = 1;
        loop {
            let sample = self.timed(plan, dispatcher, iterations)?;
            if sample.elapsed >= self.config.bench_time || iterations >= self.config.max_iterations {
                return Ok(sample);
            }
            iterations = next_iterations(
                iterations,
                sample.elapsed,
                self.config.bench_time,
                self.config.max_iterations,
            );
        }
    }

    fn timed(
        &self,
        plan: &mut DispatchPlan,
        dispatcher: &dyn Dispatcher,
        iterations: u64,
    ) -> Result<TimingSample, SimulationError> {
        let heap_before = HeapSnapshot::now();
        let start = Instant::now();
        for _ in 0..iterations {
            plan.run_once(dispatcher)?;
        }
        let elapsed = start.elapsed();
        let heap_after = HeapSnapshot::now();

        let (allocations, allocated_bytes) = heap_after.allocated_since(&heap_before);
        Ok(TimingSample {
            iterations,
            dispatches: dispatch_count(iterations, plan.len()),
            elapsed,
            allocations: self.track_allocations.then_some(allocations),
            allocated_bytes: self.track_allocations.then_some(allocated_bytes),
        })
    }
}
