//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Harness / profiler / simulator produce:
//!     → logging.rs (structured tracing events on stderr)
//!
//! RunReport:
//!     → metrics.rs (gauges through a local Prometheus recorder)
//!     → text exposition on stdout
//! ```
//!
//! # Design Decisions
//! - Structured fields: router, fixture, scenario, bytes, ns_per_op
//! - No events between the two heap reads of a memory sample

pub mod logging;
pub mod metrics;

pub use logging::init_logging;
pub use metrics::render_prometheus;
