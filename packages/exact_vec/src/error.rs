use thiserror::Error;

/// Errors that can occur when accessing array elements by position.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The caller asked for a position at or beyond the end of the array.
    #[error("position {index} is out of range for an array of {len} elements")]
    OutOfRange {
        /// The position the caller asked for.
        index: usize,

        /// The number of elements in the array at the time of the call.
        len: usize,
    },
}

/// A specialized `Result` type for bounds-checked element access, returning
/// the crate's [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
