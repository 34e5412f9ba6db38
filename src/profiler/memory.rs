//! Memory cost of building a dispatcher.
//!
//! # Data Flow
//! ```text
//! profile(router, build)
//!     → router not selected? → Skipped (build never runs)
//!     → settle() → before (live bytes)
//!     → build()  (result retained)
//!     → settle() → after (live bytes)
//!     → Measured { value, MemorySample { before, after } }
//! ```
//!
//! # Design Decisions
//! - Both sides use the same settle procedure so residual noise is symmetric
//! - Nothing between the two reads logs, formats or allocates on our side
//! - The pass count is a tunable heuristic, not a guarantee

use std::sync::atomic::{fence, Ordering};
use std::thread;

use serde::Serialize;

use crate::harness::Selection;
use crate::profiler::heap::{self, HeapSnapshot};
use crate::profiler::ProfileError;

/// Default number of settle passes on each side of a build.
pub const DEFAULT_SETTLE_PASSES: u32 = 4;

/// Live heap bytes around one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemorySample {
    pub before: u64,
    pub after: u64,
}

impl MemorySample {
    /// Marginal heap cost of the build. Can be slightly negative from noise.
    pub fn delta(&self) -> i64 {
        self.after as i64 - self.before as i64
    }
}

/// Result of one profiler invocation.
#[derive(Debug)]
pub enum Profiled<T> {
    /// Router outside the selection; nothing ran.
    Skipped,
    Measured { value: T, sample: MemorySample },
}

#[derive(Debug, Clone)]
pub struct MemoryProfiler {
    settle_passes: u32,
    selection: Selection,
}

impl MemoryProfiler {
    /// Fails when heap counters are not available in this process.
    pub fn new(settle_passes: u32, selection: Selection) -> Result<Self, ProfileError> {
        if settle_passes == 0 {
            return Err(ProfileError::InvalidSettlePasses);
        }
        if !heap::tracking_enabled() {
            return Err(ProfileError::HeapStatsUnavailable);
        }
        Ok(Self {
            settle_passes,
            selection,
        })
    }

    pub fn settle_passes(&self) -> u32 {
        self.settle_passes
    }

    /// Read the counters until two consecutive reads agree or passes run out.
    fn settle(&self) -> HeapSnapshot {
        let mut last = HeapSnapshot::now();
        for _ in 1..self.settle_passes {
            fence(Ordering::SeqCst);
            thread::yield_now();
            let next = HeapSnapshot::now();
            if next == last {
                break;
            }
            last = next;
        }
        last
    }

    /// Measure the live-heap growth caused by `build`, keeping its result alive.
    pub fn profile<T>(&self, router: &str, build: impl FnOnce() -> T) -> Profiled<T> {
        if !self.selection.router_selected(router) {
            return Profiled::Skipped;
        }

        let before = self.settle().live_bytes();
        let value = build();
        let after = self.settle().live_bytes();

        Profiled::Measured {
            value,
            sample: MemorySample { before, after },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_is_signed() {
        assert_eq!(MemorySample { before: 100, after: 612 }.delta(), 512);
        assert_eq!(MemorySample { before: 612, after: 600 }.delta(), -12);
    }

    #[test]
    fn test_unavailable_without_tracking_allocator() {
        let err = MemoryProfiler::new(DEFAULT_SETTLE_PASSES, Selection::all()).unwrap_err();
        assert!(matches!(err, ProfileError::HeapStatsUnavailable));
    }

    #[test]
    fn test_zero_passes_rejected() {
        let err = MemoryProfiler::new(0, Selection::all()).unwrap_err();
        assert!(matches!(err, ProfileError::InvalidSettlePasses));
    }
}
