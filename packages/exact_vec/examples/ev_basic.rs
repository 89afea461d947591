//! Basic usage of the `exact_vec` crate:
//!
//! * Creating arrays.
//! * Inserting and removing elements at arbitrary positions.
//! * Resizing under the exact-fit allocation policy.
//! * Bounds-checked access.

use exact_vec::ExactVec;

fn main() {
    let mut scores = ExactVec::from_slice(&[90, 75, 88]);

    println!("initial scores: {scores:?} ({} elements)", scores.len());

    // Every mutation reallocates to the exact new size; there is never any
    // spare capacity to grow into.
    scores.push(61);
    scores.insert(1, 99);
    println!("after push and insert: {scores:?}");

    // Removal returns the element and shifts the tail left, preserving order.
    let removed = scores.remove(2);
    println!("removed {removed}, leaving {scores:?}");

    // Resizing fills new slots with default values and truncates from the
    // back when shrinking.
    scores.resize(6);
    println!("after growing to 6: {scores:?}");

    scores.resize(2);
    println!("after shrinking to 2: {scores:?}");

    // Out-of-range positions are reported as error values.
    match scores.at(10) {
        Ok(score) => println!("score at position 10: {score}"),
        Err(error) => println!("no score at position 10: {error}"),
    }

    // Moving the contents out leaves the source empty but fully usable.
    let taken = scores.take();
    println!(
        "taken: {taken:?}, source is now empty: {}",
        scores.is_empty()
    );
}
