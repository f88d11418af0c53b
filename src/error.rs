//! Unified error types for buffer operations.
//!
//! Every positional operation validates its offsets up front and reports
//! violations to the caller immediately. Offsets are never silently
//! clamped: a truncated slice would corrupt the source positions of the
//! generated output downstream.

use thiserror::Error;

/// Main error type for buffer operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Offset or length outside the buffer
    #[error("range out of bounds: offset {start} with length {len} exceeds buffer length {available}")]
    OutOfRange {
        start: usize,
        len: usize,
        available: usize,
    },

    /// Offset falls inside a multi-byte character
    #[error("offset {offset} is not a character boundary")]
    NotCharBoundary { offset: usize },

    /// Empty search pattern passed to a replace operation
    #[error("search pattern must not be empty")]
    EmptyPattern,
}

/// Result type for buffer operations.
pub type Result<T> = std::result::Result<T, Error>;
