#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A contiguous growable array that always allocates exactly as much as it
//! holds.
//!
//! This crate provides [`ExactVec`], a dynamic array in the spirit of `Vec`
//! with one deliberate difference: there is no spare capacity, ever. The
//! backing allocation is exactly as long as the element count, so a container
//! that is mutated rarely never carries slack and shrinking hands memory back
//! to the allocator immediately.
//!
//! The price of the exact fit is that every length-changing operation
//! (`push`, `insert`, `remove`, `resize`, `assign`) replaces the allocation
//! and moves the elements, costing O(len) per call with no amortization.
//! Prefer `Vec` when you mutate often and care about append throughput;
//! consider [`ExactVec`] when you hold many mostly-immutable sequences and
//! care about footprint.
//!
//! # Key properties
//!
//! * **Exact-fit storage**: the allocation size equals the element count at
//!   all times, and the empty state allocates nothing at all.
//! * **Value semantics**: cloning deep-copies into an independent buffer and
//!   [`ExactVec::take()`] transfers the buffer, leaving the source empty.
//! * **Order-preserving editing**: insertion and removal at arbitrary
//!   positions keep the surrounding elements in their original order.
//! * **Bounds-checked access**: [`ExactVec::at()`] reports an out-of-range
//!   position as an error value instead of panicking.
//! * **Per-operation bounds**: only cloning operations require `T: Clone`
//!   and only default-filling ones require `T: Default`.
//!
//! # Example
//!
//! ```
//! use exact_vec::ExactVec;
//!
//! let mut tags = ExactVec::from_slice(&["alpha", "gamma"]);
//!
//! tags.insert(1, "beta");
//! tags.push("delta");
//! assert_eq!(tags.as_slice(), &["alpha", "beta", "gamma", "delta"]);
//!
//! let removed = tags.remove(2);
//! assert_eq!(removed, "gamma");
//!
//! // Out-of-range access is an error value, not a panic.
//! assert!(tags.at(10).is_err());
//! ```

mod error;
mod exact_vec;
mod fill_guard;

pub use error::*;
pub use exact_vec::*;
pub(crate) use fill_guard::*;
