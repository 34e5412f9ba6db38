//! Process-wide heap accounting.
//!
//! # Responsibilities
//! - Wrap the system allocator and count every allocation and release
//! - Expose point-in-time snapshots of the counters
//!
//! # Design Decisions
//! - Counters are relaxed atomics; readers fence before loading
//! - A `realloc` counts as one allocation of the new size and a release of the old
//! - Counting only happens when the binary installs `TrackingAllocator` as
//!   its `#[global_allocator]`; `tracking_enabled` detects whether it did

use std::alloc::{GlobalAlloc, Layout, System};
use std::hint::black_box;
use std::sync::atomic::{fence, AtomicU64, Ordering};

use serde::Serialize;

static ALLOCATIONS: AtomicU64 = AtomicU64::new(0);
static ALLOCATED: AtomicU64 = AtomicU64::new(0);
static DEALLOCATED: AtomicU64 = AtomicU64::new(0);

/// Counting wrapper around [`System`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TrackingAllocator;

impl TrackingAllocator {
    pub const fn new() -> Self {
        Self
    }
}

#[inline]
fn record_alloc(size: usize) {
    ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
    ALLOCATED.fetch_add(size as u64, Ordering::Relaxed);
}

#[inline]
fn record_dealloc(size: usize) {
    DEALLOCATED.fetch_add(size as u64, Ordering::Relaxed);
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc(layout) };
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = unsafe { System.alloc_zeroed(layout) };
        if !ptr.is_null() {
            record_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) };
        record_dealloc(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = unsafe { System.realloc(ptr, layout, new_size) };
        if !new_ptr.is_null() {
            record_alloc(new_size);
            record_dealloc(layout.size());
        }
        new_ptr
    }
}

/// Counter values at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HeapSnapshot {
    pub allocations: u64,
    pub allocated_bytes: u64,
    pub deallocated_bytes: u64,
}

impl HeapSnapshot {
    pub fn now() -> Self {
        fence(Ordering::SeqCst);
        Self {
            allocations: ALLOCATIONS.load(Ordering::Relaxed),
            allocated_bytes: ALLOCATED.load(Ordering::Relaxed),
            deallocated_bytes: DEALLOCATED.load(Ordering::Relaxed),
        }
    }

    /// Bytes currently allocated and not yet released.
    pub fn live_bytes(&self) -> u64 {
        self.allocated_bytes.saturating_sub(self.deallocated_bytes)
    }

    /// Allocations and bytes requested between `earlier` and `self`.
    pub fn allocated_since(&self, earlier: &HeapSnapshot) -> (u64, u64) {
        (
            self.allocations.saturating_sub(earlier.allocations),
            self.allocated_bytes.saturating_sub(earlier.allocated_bytes),
        )
    }
}

/// True when `TrackingAllocator` is the global allocator of this process.
pub fn tracking_enabled() -> bool {
    let before = HeapSnapshot::now();
    drop(black_box(Box::new([0u8; 64])));
    HeapSnapshot::now().allocations > before.allocations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_live_bytes() {
        let snapshot = HeapSnapshot {
            allocations: 3,
            allocated_bytes: 300,
            deallocated_bytes: 120,
        };
        assert_eq!(snapshot.live_bytes(), 180);
    }

    #[test]
    fn test_allocated_since() {
        let earlier = HeapSnapshot {
            allocations: 10,
            allocated_bytes: 1000,
            deallocated_bytes: 0,
        };
        let later = HeapSnapshot {
            allocations: 14,
            allocated_bytes: 1640,
            deallocated_bytes: 500,
        };
        assert_eq!(later.allocated_since(&earlier), (4, 640));
    }

    #[test]
    fn test_unit_tests_run_without_tracking() {
        // The library's unit test binary keeps the system allocator.
        assert!(!tracking_enabled());
    }
}
