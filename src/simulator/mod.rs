//! Request simulation subsystem.
//!
//! # Data Flow
//! ```text
//! Fixture / single request
//!     → plan.rs (one reusable BenchRequest + ResponseSink)
//!     → plan.verify (capture on, compare with Fixture::resolve)
//!     → timing.rs (warmup, calibrate, timed passes, heap counters)
//!     → TimingSample
//! ```
//!
//! # Design Decisions
//! - Nothing is allocated by the harness inside the timed region
//! - A miss inside the timed region fails the whole measurement
//! - Single-threaded; one measurement at a time

pub mod plan;
pub mod timing;

use crate::adapters::DispatchError;
use crate::fixtures::Method;

pub use plan::{DispatchPlan, PlanMode};
pub use timing::{next_iterations, Simulator, TimingConfig, TimingSample};

/// Errors raised while driving a dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimulationError {
    #[error("plan has no requests")]
    EmptyPlan,

    #[error("{method} {path}: {source}")]
    Dispatch {
        method: Method,
        path: String,
        source: DispatchError,
    },

    #[error("{method} {path}: expected {expected}, got {actual}")]
    Mismatch {
        method: Method,
        path: String,
        expected: String,
        actual: String,
    },

    #[error("{method} {path}: no route in the fixture matches this request")]
    Unresolvable { method: Method, path: String },
}
