use std::alloc::{Layout, alloc, dealloc};
use std::mem;
use std::ptr::{self, NonNull};

/// A freshly allocated element buffer whose slots are still being initialized.
///
/// Element-wise construction runs caller-supplied code (`Clone::clone`,
/// `Default::default`) once per slot. If one of those calls panics partway
/// through, the guard drops the slots filled so far and releases the
/// allocation during unwinding, so a partially initialized buffer can never
/// leak or be observed as a live array.
///
/// Filling proceeds in ascending slot order starting at the `first_slot`
/// passed to [`allocate()`][Self::allocate]. Slots in front of `first_slot`
/// are reserved for elements the adopting array moves over from its previous
/// buffer; those moves are plain memory copies that cannot panic, so they
/// happen only after the guard has been disarmed via
/// [`into_raw()`][Self::into_raw].
pub(crate) struct FillGuard<T> {
    ptr: NonNull<T>,
    capacity: usize,
    filled_from: usize,
    filled_until: usize,
}

impl<T> FillGuard<T> {
    /// Allocates an uninitialized buffer of exactly `capacity` elements,
    /// with filling to start at slot `first_slot`.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero, if `first_slot` lies beyond `capacity`
    /// or if the allocation cannot be satisfied.
    pub(crate) fn allocate(capacity: usize, first_slot: usize) -> Self {
        assert!(
            capacity > 0,
            "a buffer of zero elements must be represented without an allocation"
        );
        assert!(
            first_slot <= capacity,
            "first slot {first_slot} lies beyond the buffer capacity {capacity}"
        );
        debug_assert!(size_of::<T>() > 0);

        let layout = Layout::array::<T>(capacity)
            .expect("a simple flat array layout must always be calculable");

        // SAFETY: The layout is non-zero-sized because `capacity` is non-zero
        // and zero-sized element types are refused at array construction.
        let allocation = unsafe { alloc(layout) };

        let ptr = NonNull::new(allocation)
            .expect("allocation failure is not a recoverable condition - out of memory is a panic")
            .cast::<T>();

        Self {
            ptr,
            capacity,
            filled_from: first_slot,
            filled_until: first_slot,
        }
    }

    /// The number of element slots in the buffer.
    #[must_use]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Moves `value` into the next unfilled slot.
    ///
    /// # Panics
    ///
    /// Panics if every slot from `first_slot` onwards has already been filled.
    pub(crate) fn fill_next(&mut self, value: T) {
        assert!(
            self.filled_until < self.capacity,
            "every slot of the buffer has already been filled"
        );

        // SAFETY: `filled_until < capacity` is asserted above, so the slot is
        // within the allocation.
        let slot = unsafe { self.ptr.add(self.filled_until) };

        // SAFETY: The slot is past every slot filled so far and is therefore
        // uninitialized, so the write does not overwrite a live element.
        unsafe { slot.write(value) };

        self.filled_until = self
            .filled_until
            .checked_add(1)
            .expect("guarded by the capacity assertion above");
    }

    /// Releases the buffer to the caller once every fallible slot is filled.
    ///
    /// The caller takes over the allocation, the elements in
    /// `first_slot..capacity` and the duty to populate the slots in front of
    /// `first_slot` before the buffer is exposed as a live array.
    ///
    /// # Panics
    ///
    /// Panics if slots from `first_slot` onwards remain unfilled.
    #[must_use]
    pub(crate) fn into_raw(self) -> NonNull<T> {
        assert!(
            self.filled_until == self.capacity,
            "the buffer cannot be adopted while slots remain unfilled"
        );

        let ptr = self.ptr;
        mem::forget(self);
        ptr
    }
}

impl<T> Drop for FillGuard<T> {
    fn drop(&mut self) {
        let filled = self
            .filled_until
            .checked_sub(self.filled_from)
            .expect("slots are filled in ascending order starting at filled_from");

        if filled > 0 {
            // SAFETY: `filled_from + filled <= capacity`, so the range lies
            // within the allocation.
            let first_filled = unsafe { self.ptr.add(self.filled_from) };

            let filled_slots = ptr::slice_from_raw_parts_mut(first_filled.as_ptr(), filled);

            // SAFETY: Exactly these slots were initialized by `fill_next` and
            // ownership was never transferred, so this is their only drop.
            unsafe { ptr::drop_in_place(filled_slots) };
        }

        let layout = Layout::array::<T>(self.capacity)
            .expect("the same layout was already calculated when the buffer was allocated");

        // SAFETY: The allocation was created with this exact layout and is
        // released at most once because `into_raw` forgets the guard.
        unsafe { dealloc(self.ptr.as_ptr().cast::<u8>(), layout) };
    }
}
