//! In-process request and response representations.
//!
//! # Data Flow
//! ```text
//! DispatchPlan (simulator)
//!     → request.rs (one reusable BenchRequest, rewritten in place)
//!     → Dispatcher::serve
//!     → response.rs (one reusable ResponseSink, discards the body)
//! ```
//!
//! # Design Decisions
//! - Both objects are created once per measurement, never per dispatch
//! - No transport: the sink accepts every write and keeps only counters

pub mod request;
pub mod response;

pub use request::BenchRequest;
pub use response::ResponseSink;
