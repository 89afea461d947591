use std::alloc::{Layout, dealloc};
use std::fmt;
use std::mem;
use std::ops::{Deref, DerefMut, Index, IndexMut, Range};
use std::ptr::{self, NonNull};
use std::slice;

use crate::{Error, FillGuard, Result};

/// A contiguous growable array whose allocation always holds exactly as many
/// elements as it contains.
///
/// `ExactVec<T>` keeps no spare capacity. The backing buffer is exactly
/// `len()` elements long at all times, so a container that is mutated rarely
/// never carries slack and shrinking returns memory to the allocator
/// immediately. The price is that every length-changing operation replaces
/// the allocation and moves the elements, costing O(len) per call. There is
/// no amortization; if you mutate often and care about append throughput,
/// use `Vec` instead.
///
/// # Value semantics
///
/// Cloning deep-copies the elements into a new independent buffer, and
/// [`take()`][Self::take] transfers the buffer to the caller, leaving the
/// source empty. Two arrays never share storage.
///
/// # The empty state
///
/// An empty array owns no allocation at all. Creating one is free, and any
/// operation that shrinks the array to zero elements releases the buffer
/// entirely rather than keeping a zero-length allocation around.
///
/// # Element type requirements
///
/// Bounds are per operation: constructing, moving, pushing and removing work
/// for any element type, operations that conceptually copy require
/// `T: Clone` and operations that manufacture new elements require
/// `T: Default`. Zero-sized element types are refused at construction.
///
/// # Panics during element construction
///
/// Operations that construct elements run caller-supplied code
/// (`Clone::clone`, `Default::default`) and may observe a panic from it. The
/// array stays valid in that case: elements produced so far are dropped, the
/// buffer under construction is released and no element is ever dropped
/// twice.
///
/// # Examples
///
/// ```
/// use exact_vec::ExactVec;
///
/// let mut values = ExactVec::from_slice(&[1, 2, 4]);
/// values.insert(2, 3);
/// values.push(5);
///
/// assert_eq!(values.as_slice(), &[1, 2, 3, 4, 5]);
///
/// let removed = values.remove(0);
/// assert_eq!(removed, 1);
/// assert_eq!(values.len(), 4);
/// ```
pub struct ExactVec<T> {
    /// Start of the owned buffer; dangling when `len` is zero.
    first: NonNull<T>,

    /// Number of elements, which is also the exact size of the allocation.
    len: usize,
}

impl<T> ExactVec<T> {
    /// Creates an empty array.
    ///
    /// No memory is allocated; the empty state is a dangling pointer and a
    /// zero length.
    ///
    /// # Examples
    ///
    /// ```
    /// use exact_vec::ExactVec;
    ///
    /// let values = ExactVec::<u32>::new();
    ///
    /// assert!(values.is_empty());
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `T` is a zero-sized type.
    #[must_use]
    pub fn new() -> Self {
        assert!(
            size_of::<T>() > 0,
            "ExactVec cannot store zero-sized element types"
        );

        Self {
            first: NonNull::dangling(),
            len: 0,
        }
    }

    /// Creates an array of exactly `count` default-valued elements.
    ///
    /// A count of zero yields the empty state without allocating.
    ///
    /// # Examples
    ///
    /// ```
    /// use exact_vec::ExactVec;
    ///
    /// let values = ExactVec::<u32>::with_len(3);
    ///
    /// assert_eq!(values.as_slice(), &[0, 0, 0]);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `T` is a zero-sized type.
    #[must_use]
    pub fn with_len(count: usize) -> Self
    where
        T: Default,
    {
        let mut values = Self::new();
        values.resize(count);
        values
    }

    /// Creates an array holding a clone of every element of `values`, in
    /// order.
    ///
    /// The elements are cloned into one allocation of exactly `values.len()`
    /// slots; an empty slice yields the empty state without allocating.
    ///
    /// # Examples
    ///
    /// ```
    /// use exact_vec::ExactVec;
    ///
    /// let values = ExactVec::from_slice(&[1, 2, 3]);
    ///
    /// assert_eq!(values.len(), 3);
    /// assert_eq!(values[2], 3);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `T` is a zero-sized type.
    #[must_use]
    pub fn from_slice(values: &[T]) -> Self
    where
        T: Clone,
    {
        let mut array = Self::new();
        array.assign(values);
        array
    }

    /// The number of elements, which is also the exact size of the backing
    /// allocation.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the array holds no elements, and therefore no allocation.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The elements as a slice spanning the whole buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: `first` points at `len` initialized elements whenever
        // `len > 0`, and a dangling pointer with length zero is a valid
        // empty slice.
        unsafe { slice::from_raw_parts(self.first.as_ptr(), self.len) }
    }

    /// The elements as a mutable slice spanning the whole buffer.
    #[must_use]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: As in `as_slice`; the exclusive borrow of `self`
        // guarantees no other reference into the buffer exists.
        unsafe { slice::from_raw_parts_mut(self.first.as_ptr(), self.len) }
    }

    /// Iterates the elements by reference, front to back.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Iterates the elements by mutable reference, front to back.
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, T> {
        self.as_mut_slice().iter_mut()
    }

    /// Bounds-checked access to the element at `index`.
    ///
    /// # Examples
    ///
    /// ```
    /// use exact_vec::ExactVec;
    ///
    /// let values = ExactVec::from_slice(&[1, 2, 3]);
    ///
    /// assert_eq!(values.at(2).unwrap(), &3);
    /// assert!(values.at(3).is_err());
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] when `index >= self.len()`.
    pub fn at(&self, index: usize) -> Result<&T> {
        self.as_slice()
            .get(index)
            .ok_or(Error::OutOfRange {
                index,
                len: self.len,
            })
    }

    /// Bounds-checked mutable access to the element at `index`.
    ///
    /// # Examples
    ///
    /// ```
    /// use exact_vec::ExactVec;
    ///
    /// let mut values = ExactVec::from_slice(&[1, 2, 3]);
    ///
    /// *values.at_mut(0).unwrap() = 9;
    ///
    /// assert_eq!(values.as_slice(), &[9, 2, 3]);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] when `index >= self.len()`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;

        self.as_mut_slice()
            .get_mut(index)
            .ok_or(Error::OutOfRange { index, len })
    }

    /// Moves the contents out, leaving `self` empty.
    ///
    /// The buffer itself changes hands; no element is copied or cloned and
    /// nothing is allocated.
    ///
    /// # Examples
    ///
    /// ```
    /// use exact_vec::ExactVec;
    ///
    /// let mut source = ExactVec::from_slice(&[1, 2, 3]);
    ///
    /// let taken = source.take();
    ///
    /// assert!(source.is_empty());
    /// assert_eq!(taken.as_slice(), &[1, 2, 3]);
    /// ```
    #[must_use]
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Replaces the contents with a clone of every element of `values`.
    ///
    /// The previous elements are dropped and the old buffer is released
    /// before the new contents are built, so assigning an empty slice is the
    /// same as clearing. A fresh buffer of exactly `values.len()` slots is
    /// then allocated and filled in order.
    ///
    /// # Examples
    ///
    /// ```
    /// use exact_vec::ExactVec;
    ///
    /// let mut values = ExactVec::from_slice(&[1, 2, 3]);
    ///
    /// values.assign(&[7, 8]);
    ///
    /// assert_eq!(values.as_slice(), &[7, 8]);
    /// ```
    pub fn assign(&mut self, values: &[T])
    where
        T: Clone,
    {
        self.release();

        if values.is_empty() {
            return;
        }

        let mut fill = FillGuard::allocate(values.len(), 0);

        for value in values {
            fill.fill_next(value.clone());
        }

        self.adopt(fill, 0, 0);
    }

    /// Resizes the array to exactly `count` elements.
    ///
    /// Shrinking moves the surviving front of the old buffer into a fresh
    /// allocation and drops the rest; growing moves every existing element
    /// and fills the new tail with default values. The allocation is
    /// replaced in all cases, including `count == self.len()`, and a count
    /// of zero releases it entirely.
    ///
    /// # Examples
    ///
    /// ```
    /// use exact_vec::ExactVec;
    ///
    /// let mut values = ExactVec::from_slice(&[1, 2, 3]);
    ///
    /// values.resize(1);
    /// assert_eq!(values.as_slice(), &[1]);
    ///
    /// values.resize(3);
    /// assert_eq!(values.as_slice(), &[1, 0, 0]);
    /// ```
    pub fn resize(&mut self, count: usize)
    where
        T: Default,
    {
        if count == 0 {
            self.release();
            return;
        }

        let keep = self.len.min(count);
        let mut fill = FillGuard::allocate(count, keep);

        for _ in keep..count {
            fill.fill_next(T::default());
        }

        self.adopt(fill, keep, self.len);
    }

    /// Appends `value` to the back of the array.
    ///
    /// The buffer is reallocated to exactly `self.len() + 1` slots and every
    /// existing element is moved over.
    ///
    /// # Examples
    ///
    /// ```
    /// use exact_vec::ExactVec;
    ///
    /// let mut values = ExactVec::new();
    ///
    /// values.push("first");
    /// values.push("second");
    ///
    /// assert_eq!(values.len(), 2);
    /// ```
    pub fn push(&mut self, value: T) {
        let new_len = self
            .len
            .checked_add(1)
            .expect("array length cannot exceed usize::MAX");

        let mut fill = FillGuard::allocate(new_len, self.len);
        fill.fill_next(value);

        self.adopt(fill, self.len, self.len);
    }

    /// Inserts `value` at `index`, shifting the elements from `index`
    /// onwards one place to the right.
    ///
    /// The value is appended, which reallocates to the exact new size, and
    /// then rotated back into place so the order of the shifted elements is
    /// preserved. An `index` equal to `self.len()` appends.
    ///
    /// # Examples
    ///
    /// ```
    /// use exact_vec::ExactVec;
    ///
    /// let mut values = ExactVec::from_slice(&[1, 2, 4]);
    ///
    /// values.insert(2, 3);
    ///
    /// assert_eq!(values.as_slice(), &[1, 2, 3, 4]);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `index > self.len()`.
    pub fn insert(&mut self, index: usize, value: T) {
        assert!(
            index <= self.len,
            "insert position {index} is beyond the array length {}",
            self.len
        );

        self.push(value);

        self.as_mut_slice()
            .get_mut(index..)
            .expect("guarded by the bounds assertion above")
            .rotate_right(1);
    }

    /// Inserts a clone of every element of `values` at `index`, preserving
    /// their order and shifting the elements from `index` onwards right by
    /// `values.len()` places.
    ///
    /// The clones are appended one at a time, each append reallocating to
    /// the exact new size, and the whole block is then rotated back into
    /// place in a single step.
    ///
    /// # Examples
    ///
    /// ```
    /// use exact_vec::ExactVec;
    ///
    /// let mut values = ExactVec::from_slice(&[1, 5]);
    ///
    /// values.insert_from_slice(1, &[2, 3, 4]);
    ///
    /// assert_eq!(values.as_slice(), &[1, 2, 3, 4, 5]);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `index > self.len()`.
    pub fn insert_from_slice(&mut self, index: usize, values: &[T])
    where
        T: Clone,
    {
        assert!(
            index <= self.len,
            "insert position {index} is beyond the array length {}",
            self.len
        );

        for value in values {
            self.push(value.clone());
        }

        self.as_mut_slice()
            .get_mut(index..)
            .expect("guarded by the bounds assertion above")
            .rotate_right(values.len());
    }

    /// Removes and returns the element at `index`, shifting the elements
    /// after it one place to the left.
    ///
    /// The element is rotated to the back of the buffer, moved out and the
    /// buffer is reallocated to exactly `self.len() - 1` slots. Removing the
    /// only element releases the buffer entirely.
    ///
    /// # Examples
    ///
    /// ```
    /// use exact_vec::ExactVec;
    ///
    /// let mut values = ExactVec::from_slice(&['a', 'b', 'c']);
    ///
    /// let removed = values.remove(1);
    ///
    /// assert_eq!(removed, 'b');
    /// assert_eq!(values.as_slice(), &['a', 'c']);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    pub fn remove(&mut self, index: usize) -> T {
        assert!(
            index < self.len,
            "remove position {index} is beyond the array length {}",
            self.len
        );

        let remaining = self
            .len
            .checked_sub(1)
            .expect("guarded by the bounds assertion above");

        if remaining == 0 {
            // SAFETY: `index` can only be 0, so this reads out the sole
            // element, transferring ownership to `value`.
            let value = unsafe { self.first.read() };

            // SAFETY: The buffer was allocated for exactly one element,
            // which has just been moved out.
            unsafe { dealloc(self.first.as_ptr().cast::<u8>(), Self::layout_for(self.len)) };

            self.first = NonNull::dangling();
            self.len = 0;

            return value;
        }

        // The replacement buffer is allocated up front: allocation is the
        // only step here that can panic, and it must not panic once the
        // read below has duplicated ownership of the removed element.
        let fill = FillGuard::allocate(remaining, remaining);

        // Rotate the victim to the back so the survivors keep their order.
        self.as_mut_slice()
            .get_mut(index..)
            .expect("guarded by the bounds assertion above")
            .rotate_left(1);

        // SAFETY: `remaining` indexes the last slot of the allocation.
        let victim = unsafe { self.first.add(remaining) };

        // SAFETY: The rotation left the removed element in the last slot;
        // reading it out transfers ownership to `value`, and `adopt` moves
        // over only the `remaining` slots in front of it, dropping nothing.
        let value = unsafe { victim.read() };

        self.adopt(fill, remaining, remaining);

        value
    }

    /// Removes the elements in `range`, shifting the elements after it left
    /// by `range.len()` places.
    ///
    /// The positions are removed one at a time, front to back, so the buffer
    /// is reallocated once per removed element and the removed elements are
    /// dropped immediately. An empty range leaves the array untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use exact_vec::ExactVec;
    ///
    /// let mut values = ExactVec::from_slice(&[1, 2, 3, 4, 5]);
    ///
    /// values.remove_range(1..4);
    ///
    /// assert_eq!(values.as_slice(), &[1, 5]);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the range is decreasing or if `range.end > self.len()`.
    pub fn remove_range(&mut self, range: Range<usize>) {
        let Range { start, end } = range;

        assert!(
            start <= end && end <= self.len,
            "remove range {start}..{end} does not fit the array length {}",
            self.len
        );

        let count = end
            .checked_sub(start)
            .expect("guarded by the range assertion above");

        // Each removal closes the gap, so the next victim is at `start` again.
        for _ in 0..count {
            _ = self.remove(start);
        }
    }

    /// Drops all elements and returns the array to the unallocated empty
    /// state.
    fn release(&mut self) {
        if self.len == 0 {
            return;
        }

        let first = self.first;
        let len = self.len;

        // Detach the buffer before touching element destructors so a panic
        // inside one of them cannot lead back into the dead buffer.
        self.first = NonNull::dangling();
        self.len = 0;

        let elements = ptr::slice_from_raw_parts_mut(first.as_ptr(), len);

        // SAFETY: `first` and `len` described an owned buffer of `len`
        // initialized elements, the fields were cleared above and nothing
        // else can reach them, so this is their only drop.
        unsafe { ptr::drop_in_place(elements) };

        // SAFETY: The buffer was allocated with the layout of exactly `len`
        // elements, which is the layout being released.
        unsafe { dealloc(first.as_ptr().cast::<u8>(), Self::layout_for(len)) };
    }

    /// Replaces the backing buffer with the fully filled `fill`, moving the
    /// first `keep` old elements into its unfilled front slots.
    ///
    /// Old elements in `keep..old_live` are dropped; elements beyond
    /// `old_live`, if any, have already been moved out by the caller. The
    /// old allocation, when one exists, is released.
    fn adopt(&mut self, fill: FillGuard<T>, keep: usize, old_live: usize) {
        debug_assert!(keep <= old_live);
        debug_assert!(old_live <= self.len);

        let old_first = self.first;
        let old_len = self.len;

        let new_len = fill.capacity();
        let new_first = fill.into_raw();

        if keep > 0 {
            // SAFETY: The buffers are distinct allocations of at least
            // `keep` elements each and the destination front is unfilled by
            // the guard's contract, so this moves the surviving prefix
            // without overlap or overwrite.
            unsafe { ptr::copy_nonoverlapping(old_first.as_ptr(), new_first.as_ptr(), keep) };
        }

        self.first = new_first;
        self.len = new_len;

        if old_len == 0 {
            // There was no old buffer, only the dangling empty state.
            return;
        }

        let dead = old_live
            .checked_sub(keep)
            .expect("guarded by the debug assertions above");

        if dead > 0 {
            // SAFETY: `keep + dead <= old_len`, so the range lies within the
            // old allocation.
            let dead_start = unsafe { old_first.add(keep) };

            let dead_slots = ptr::slice_from_raw_parts_mut(dead_start.as_ptr(), dead);

            // SAFETY: These slots hold the initialized elements the new
            // buffer did not take over; `self` no longer references the old
            // buffer, so this is their only drop.
            unsafe { ptr::drop_in_place(dead_slots) };
        }

        // SAFETY: The old buffer was allocated with the layout of exactly
        // `old_len` elements.
        unsafe { dealloc(old_first.as_ptr().cast::<u8>(), Self::layout_for(old_len)) };
    }

    /// Layout of a buffer of exactly `count` elements.
    fn layout_for(count: usize) -> Layout {
        Layout::array::<T>(count).expect("a simple flat array layout must always be calculable")
    }
}

impl<T: Clone> Clone for ExactVec<T> {
    fn clone(&self) -> Self {
        Self::from_slice(self.as_slice())
    }

    fn clone_from(&mut self, source: &Self) {
        self.assign(source.as_slice());
    }
}

impl<T> Default for ExactVec<T> {
    /// Creates the empty state, equivalent to [`ExactVec::new()`].
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ExactVec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl<T> Drop for ExactVec<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T: PartialEq> PartialEq for ExactVec<T> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for ExactVec<T> {}

impl<T> Index<usize> for ExactVec<T> {
    type Output = T;

    fn index(&self, index: usize) -> &T {
        assert!(
            index < self.len,
            "position {index} is beyond the array length {}",
            self.len
        );

        self.as_slice()
            .get(index)
            .expect("guarded by the bounds assertion above")
    }
}

impl<T> IndexMut<usize> for ExactVec<T> {
    fn index_mut(&mut self, index: usize) -> &mut T {
        assert!(
            index < self.len,
            "position {index} is beyond the array length {}",
            self.len
        );

        self.as_mut_slice()
            .get_mut(index)
            .expect("guarded by the bounds assertion above")
    }
}

impl<T> Deref for ExactVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for ExactVec<T> {
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: Clone> From<&[T]> for ExactVec<T> {
    fn from(value: &[T]) -> Self {
        Self::from_slice(value)
    }
}

impl<T, const N: usize> From<[T; N]> for ExactVec<T> {
    /// Moves the array's elements into a new `ExactVec` of exactly `N`
    /// slots.
    fn from(value: [T; N]) -> Self {
        let mut values = Self::new();

        if N == 0 {
            return values;
        }

        let mut fill = FillGuard::allocate(N, 0);

        for element in value {
            fill.fill_next(element);
        }

        values.adopt(fill, 0, 0);
        values
    }
}

impl<T> FromIterator<T> for ExactVec<T> {
    /// Collects an iterator, growing by one element at a time.
    ///
    /// Every item reallocates the buffer, so collecting n items costs
    /// O(n^2) element moves; prefer [`ExactVec::from_slice()`] or
    /// `From<[T; N]>` when the source is already materialized.
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut values = Self::new();

        for value in iter {
            values.push(value);
        }

        values
    }
}

impl<'a, T> IntoIterator for &'a ExactVec<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T> IntoIterator for &'a mut ExactVec<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

// SAFETY: The buffer is exclusively owned and reached only through `&self`
// or `&mut self`, so the array can change threads whenever its elements can.
unsafe impl<T: Send> Send for ExactVec<T> {}

// SAFETY: Shared access hands out only `&T` and the array adds no interior
// mutability, so sharing it across threads is sharing the elements.
unsafe impl<T: Sync> Sync for ExactVec<T> {}
