//! Comparative benchmarking harness for HTTP request routers.
//!
//! # Architecture Overview
//!
//! ```text
//!   fixtures ──────────────┐
//!   (static, github,       │
//!    param0/1/5/20)        ▼
//!                    ┌───────────┐   build under    ┌───────────┐
//!   adapters ───────▶│  harness  │─────────────────▶│ profiler  │──▶ memory records
//!   (axum, matchit,  │    run    │                  └───────────┘
//!    routefinder,    │           │   dispatch plans ┌───────────┐
//!    regex)          │           │─────────────────▶│ simulator │──▶ timing records
//!                    └───────────┘                  └───────────┘
//!                          │
//!                          ▼
//!                     report (table / json / prometheus)
//! ```
//!
//! Cross-cutting: `config` (TOML + validation), `observability` (tracing,
//! metrics rendering). `http` holds the reusable request/response pair the
//! adapters are driven with.

// Inputs
pub mod fixtures;
pub mod http;

// Engines under test
pub mod adapters;

// Measurement
pub mod harness;
pub mod profiler;
pub mod simulator;

// Cross-cutting concerns
pub mod config;
pub mod observability;
pub mod report;

pub use config::BenchConfig;
pub use harness::{Harness, HarnessError};
pub use profiler::TrackingAllocator;
pub use report::{ReportFormat, RunReport};
