//! Behavior of `ExactVec<T>` when the global allocator reports failure.
//!
//! These tests install a custom global allocator, which applies to the whole
//! process, so they live in their own test binary.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use exact_vec::ExactVec;

/// Forwards to the system allocator, failing one allocation after
/// `fail_next_allocation()` arms it.
struct FailingAllocator {
    fail_next: AtomicBool,
}

// SAFETY: All requests forward to the system allocator unchanged; a failure
// is reported by returning null, as the trait contract specifies.
unsafe impl GlobalAlloc for FailingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return std::ptr::null_mut();
        }

        // SAFETY: We forward the call to the system allocator with the
        // caller's contract unchanged.
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        // SAFETY: We forward the call to the system allocator with the
        // caller's contract unchanged.
        unsafe { System.dealloc(ptr, layout) }
    }
}

#[global_allocator]
static ALLOCATOR: FailingAllocator = FailingAllocator {
    fail_next: AtomicBool::new(false),
};

fn fail_next_allocation() {
    ALLOCATOR.fail_next.store(true, Ordering::SeqCst);
}

#[test]
fn failed_reallocation_in_remove_leaves_the_array_intact() {
    struct Droppable {
        id: u32,
        drops: Rc<Cell<usize>>,
    }

    impl Drop for Droppable {
        fn drop(&mut self) {
            self.drops.set(self.drops.get() + 1);
        }
    }

    let drops = Rc::new(Cell::new(0));

    let mut values = ExactVec::new();
    values.push(Droppable {
        id: 1,
        drops: Rc::clone(&drops),
    });
    values.push(Droppable {
        id: 2,
        drops: Rc::clone(&drops),
    });

    let result = catch_unwind(AssertUnwindSafe(|| {
        fail_next_allocation();
        values.remove(0)
    }));

    // The replacement buffer could not be allocated, so the call panicked
    // before touching any element: nothing was dropped, nothing moved.
    assert!(result.is_err());
    assert_eq!(drops.get(), 0);
    assert_eq!(values.len(), 2);
    assert_eq!(values[0].id, 1);
    assert_eq!(values[1].id, 2);

    // Every element still drops exactly once.
    drop(values);
    assert_eq!(drops.get(), 2);
}
