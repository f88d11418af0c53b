//! Longan - zero-copy segmented text buffers for code emission
//!
//! This library provides the buffer type a template compiler pushes all
//! of its text through: an immutable, possibly-segmented character
//! buffer optimized to avoid copying and allocation while still
//! supporting string-like operations (slice, search, insert, remove,
//! replace, equality, enumeration).
//!
//! # Features
//!
//! - **Zero-copy values**: leaves borrow source text or share
//!   refcounted allocations; clone, sub-slice, and concatenation are
//!   O(1) and never copy characters
//! - **Shape-independent semantics**: equality, hashing, searching, and
//!   slicing see only the flattened character sequence, never the
//!   internal segmentation
//! - **Cross-boundary search**: find/replace matches that straddle
//!   internal segment boundaries
//! - **Stack-safe flattening**: nested values are traversed with an
//!   explicit frame stack, so nesting depth cannot overflow the call
//!   stack
//! - **Allocation-free emission**: values stream leaf by leaf into any
//!   writer, and integers render through a precomputed digit-group
//!   table
//!
//! # Example - Assembling and emitting a line
//!
//! ```
//! use longan::{Content, ContentBuilder};
//!
//! let mut builder = ContentBuilder::with_capacity(3);
//! builder.append_str("writer.Write(");
//! builder.append_owned(String::from("\"Hello\""));
//! builder.append_str(");");
//! let line = builder.finish();
//!
//! let mut out = String::new();
//! line.write_to(&mut out).unwrap();
//! assert_eq!(out, "writer.Write(\"Hello\");");
//! ```
//!
//! # Example - Shape-independent equality
//!
//! ```
//! use longan::Content;
//!
//! let whole = Content::from("Hello, World!");
//! let pieces = Content::from("Hel") + Content::from("lo, ") + Content::from("World!");
//! assert_eq!(whole, pieces);
//! ```
//!
//! # Example - Editing without copying untouched text
//!
//! ```
//! use longan::Content;
//!
//! let content = Content::from_parts([
//!     Content::from("ab"),
//!     Content::from("cd"),
//!     Content::from("ef"),
//! ]);
//! assert_eq!(content.find_char('d'), Some(3));
//! assert_eq!(content.slice(2, 3).unwrap().to_string(), "cde");
//! assert_eq!(content.replace("bcde", "-").unwrap().to_string(), "a-f");
//! ```

/// Immutable segmented buffer values, their builder, and the
/// positional algorithms over the flattened sequence.
pub mod content;

/// Allocation-free decimal rendering for emitted integers.
pub mod decimal;

/// Unified error types for buffer operations.
pub mod error;

/// Borrowed and shared runs of contiguous text.
pub mod segment;

// Re-export commonly used types for convenience
pub use content::{Bytes, Chars, Content, ContentBuilder, Part, Segments};
pub use error::{Error, Result};
pub use segment::{Segment, SharedStr};

#[cfg(test)]
mod tests {
    use super::*;

    // Values are immutable after construction; reads need no locking.
    #[test]
    fn values_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Content<'static>>();
        assert_send_sync::<Segment<'static>>();
    }

    #[test]
    fn end_to_end_emission() {
        let source = "@page \"/index\"";
        let directive = Content::from(&source[0..5]);
        let literal = Content::from(&source[6..]);
        let line = directive + Content::from(" -> ") + literal;

        let mut out = String::new();
        line.write_to(&mut out).unwrap();
        assert_eq!(out, "@page -> \"/index\"");
        assert_eq!(out.len(), line.len());
    }
}
