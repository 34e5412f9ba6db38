//! Memory profiling subsystem.
//!
//! # Data Flow
//! ```text
//! TrackingAllocator (global allocator, atomic counters)
//!     → heap.rs (HeapSnapshot: allocations, bytes in / out)
//!     → memory.rs (settle, sample around one build)
//!     → MemorySample { before, after }
//! ```
//!
//! # Design Decisions
//! - Counters are read directly instead of asking an allocator to collect
//! - Heap statistics missing is fatal for memory runs only

pub mod heap;
pub mod memory;

pub use heap::{tracking_enabled, HeapSnapshot, TrackingAllocator};
pub use memory::{MemoryProfiler, MemorySample, Profiled, DEFAULT_SETTLE_PASSES};

/// Errors raised while setting up memory profiling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileError {
    #[error("heap statistics unavailable: TrackingAllocator is not the global allocator")]
    HeapStatsUnavailable,

    #[error("settle passes must be at least 1")]
    InvalidSettlePasses,
}
