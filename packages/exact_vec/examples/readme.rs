//! Example that demonstrates the exact usage shown in the README.md file.
//!
//! This shows the core editing and access operations of `ExactVec`.

use exact_vec::ExactVec;

fn main() {
    println!("=== ExactVec README Example ===");

    let mut values = ExactVec::from_slice(&[1, 2, 4]);

    // Order-preserving editing at arbitrary positions.
    values.insert(2, 3);
    values.push(5);
    assert_eq!(values.as_slice(), &[1, 2, 3, 4, 5]);

    // The allocation always holds exactly `len()` elements.
    let removed = values.remove(0);
    assert_eq!(removed, 1);
    assert_eq!(values.len(), 4);

    // Out-of-range access is an error value, not a panic.
    assert!(values.at(100).is_err());

    println!("final contents: {values:?}");
    println!("README example completed successfully!");
}
