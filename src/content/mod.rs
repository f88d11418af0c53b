//! Immutable, possibly-segmented text values.
//!
//! `Content` is the value type every literal, identifier, and generated
//! fragment flows through on its way to the output writer. A value is
//! either empty, a single contiguous run, or an ordered tree of parts
//! whose leaves are runs. The storage shape is an implementation
//! detail: equality, hashing, searching, and slicing are all defined
//! over the flattened character sequence, never over the tree.
//!
//! # Performance
//!
//! - Clone is O(1) for every shape (refcount bumps only)
//! - `len` and `segment_count` are O(1) regardless of nesting depth
//! - Concatenation is O(1) and never copies characters
//! - Flattening walks leaves lazily with an explicit stack, so
//!   pathological nesting depth cannot exhaust the call stack
//!
//! # Examples
//!
//! ```
//! use longan::Content;
//!
//! let greeting = Content::from("Hello, ") + Content::from("World!");
//! assert_eq!(greeting.len(), 13);
//! assert_eq!(greeting.to_string(), "Hello, World!");
//!
//! let rusty = greeting.replace("World", "Rust").unwrap();
//! assert_eq!(rusty.to_string(), "Hello, Rust!");
//! ```

mod builder;
mod iter;
mod ops;

pub use builder::ContentBuilder;
pub use iter::{Bytes, Chars, Segments};

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign};
use std::sync::Arc;

use smallvec::SmallVec;

use crate::segment::Segment;

/// Staging buffer for assembling part lists without heap allocation in
/// the common small cases.
pub(crate) type PartBuf<'a> = SmallVec<[Part<'a>; 8]>;

/// Internal storage of a buffer value.
#[derive(Debug, Clone)]
pub(crate) enum Repr<'a> {
    /// No characters
    Empty,
    /// Exactly one contiguous run
    Single(Segment<'a>),
    /// Two or more parts, possibly nested
    Parts {
        parts: Arc<[Part<'a>]>,
        /// Total byte length across all leaves
        len: usize,
        /// Number of leaf segments after full flattening
        segments: usize,
    },
}

/// A direct child of a multi-part value.
#[derive(Debug, Clone)]
pub enum Part<'a> {
    /// An indivisible run of characters
    Leaf(Segment<'a>),
    /// A nested value contributing its own leaves
    Group(Content<'a>),
}

impl Part<'_> {
    /// Total byte length contributed by this part.
    #[inline]
    pub fn len(&self) -> usize {
        match self {
            Part::Leaf(segment) => segment.len(),
            Part::Group(content) => content.len(),
        }
    }

    /// Check if the part contributes no characters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of leaf segments contributed by this part.
    #[inline]
    pub fn segment_count(&self) -> usize {
        match self {
            Part::Leaf(segment) => usize::from(!segment.is_empty()),
            Part::Group(content) => content.segment_count(),
        }
    }
}

/// An immutable, possibly-segmented text value.
///
/// Values are created once and read-only for their entire lifetime;
/// every transforming operation returns a new value and leaves the
/// receiver untouched. Borrowed leaves carry the lifetime of the text
/// they view, shared leaves keep their backing allocation alive.
#[derive(Debug, Clone, Default)]
pub struct Content<'a> {
    pub(crate) repr: Repr<'a>,
}

impl Default for Repr<'_> {
    #[inline]
    fn default() -> Self {
        Repr::Empty
    }
}

impl<'a> Content<'a> {
    /// Create an empty value.
    #[inline]
    pub const fn new() -> Self {
        Self { repr: Repr::Empty }
    }

    /// Total length of the flattened character sequence, in bytes.
    ///
    /// O(1) for every storage shape.
    #[inline]
    pub fn len(&self) -> usize {
        match &self.repr {
            Repr::Empty => 0,
            Repr::Single(segment) => segment.len(),
            Repr::Parts { len, .. } => *len,
        }
    }

    /// Check if the value contains no characters.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of leaf segments after full flattening.
    ///
    /// O(1) for every storage shape: 0 for an empty value, 1 for a
    /// single run, 2 or more otherwise. Useful for presizing buffers
    /// without a flattening pass.
    #[inline]
    pub fn segment_count(&self) -> usize {
        match &self.repr {
            Repr::Empty => 0,
            Repr::Single(_) => 1,
            Repr::Parts { segments, .. } => *segments,
        }
    }

    /// Build a value from an ordered sequence of already-built values.
    ///
    /// Empty children are dropped; a single surviving child is returned
    /// as-is rather than wrapped, so trivial composition never grows
    /// nesting depth.
    pub fn from_parts<I>(parts: I) -> Self
    where
        I: IntoIterator<Item = Content<'a>>,
    {
        let mut buf = PartBuf::new();
        for content in parts {
            push_part(&mut buf, Part::Group(content));
        }
        from_part_buf(buf)
    }

    /// Concatenate two values without copying characters.
    ///
    /// Either side being empty returns the other side unchanged.
    pub fn concat(&self, other: &Content<'a>) -> Content<'a> {
        if self.is_empty() {
            return other.clone();
        }
        if other.is_empty() {
            return self.clone();
        }
        let mut buf = PartBuf::new();
        push_part(&mut buf, Part::Group(self.clone()));
        push_part(&mut buf, Part::Group(other.clone()));
        from_part_buf(buf)
    }

    /// Stream every leaf, in order, into a formatting sink.
    ///
    /// This is the emission hot path: no intermediate string is
    /// materialized, each leaf is written as-is.
    pub fn write_to<W: fmt::Write + ?Sized>(&self, writer: &mut W) -> fmt::Result {
        for segment in self.segments() {
            writer.write_str(segment.as_str())?;
        }
        Ok(())
    }

    /// Copy the flattened bytes into `dest`, returning whether they fit.
    ///
    /// The non-panicking counterpart to [`copy_to`](Self::copy_to); on a
    /// too-small destination nothing is written and `false` is returned.
    pub fn try_copy_to(&self, dest: &mut [u8]) -> bool {
        if dest.len() < self.len() {
            return false;
        }
        let mut at = 0;
        for segment in self.segments() {
            let bytes = segment.as_str().as_bytes();
            dest[at..at + bytes.len()].copy_from_slice(bytes);
            at += bytes.len();
        }
        true
    }

    /// Copy the flattened bytes into `dest`.
    ///
    /// # Panics
    ///
    /// Panics if `dest` is shorter than [`len`](Self::len). Callers that
    /// have not validated capacity should use
    /// [`try_copy_to`](Self::try_copy_to).
    pub fn copy_to(&self, dest: &mut [u8]) {
        assert!(
            self.try_copy_to(dest),
            "destination buffer too small: {} < {}",
            dest.len(),
            self.len()
        );
    }

    /// Check whether `index` falls on a character boundary of the
    /// flattened sequence.
    ///
    /// Offsets at the very start and end are always boundaries, as is
    /// any offset landing between two leaves.
    pub fn is_char_boundary(&self, index: usize) -> bool {
        if index == 0 || index == self.len() {
            return true;
        }
        if index > self.len() {
            return false;
        }
        let mut consumed = 0;
        for segment in self.segments() {
            let next = consumed + segment.len();
            if index < next {
                return segment.as_str().is_char_boundary(index - consumed);
            }
            consumed = next;
        }
        false
    }

    /// Round `index` down to the nearest character boundary.
    ///
    /// Used by emitters that must split an oversized literal: a split
    /// point inside a multi-byte character backs off to just before it.
    /// Offsets past the end clamp to the total length.
    pub fn floor_char_boundary(&self, index: usize) -> usize {
        let total = self.len();
        if index >= total {
            return total;
        }
        let mut consumed = 0;
        for segment in self.segments() {
            let next = consumed + segment.len();
            if index < next {
                let text = segment.as_str();
                let mut local = index - consumed;
                while !text.is_char_boundary(local) {
                    local -= 1;
                }
                return consumed + local;
            }
            consumed = next;
        }
        total
    }
}

/// Append a part to a staging buffer, normalizing as it goes: empty
/// parts are dropped, single-run groups collapse to plain leaves, and
/// only genuinely multi-part groups stay nested.
pub(crate) fn push_part<'a>(buf: &mut PartBuf<'a>, part: Part<'a>) {
    match part {
        Part::Leaf(segment) => {
            if !segment.is_empty() {
                buf.push(Part::Leaf(segment));
            }
        },
        Part::Group(content) => match content.repr {
            Repr::Empty => {},
            Repr::Single(segment) => buf.push(Part::Leaf(segment)),
            repr @ Repr::Parts { .. } => buf.push(Part::Group(Content { repr })),
        },
    }
}

/// Freeze a staging buffer into a value.
///
/// Metadata is summed from the children's own cached metadata, so this
/// is O(number of direct parts), not O(total leaves).
pub(crate) fn from_part_buf(buf: PartBuf<'_>) -> Content<'_> {
    if buf.len() >= 2 {
        let mut len = 0;
        let mut segments = 0;
        for part in &buf {
            len += part.len();
            segments += part.segment_count();
        }
        let parts: Arc<[Part<'_>]> = Arc::from(buf.into_vec());
        return Content {
            repr: Repr::Parts {
                parts,
                len,
                segments,
            },
        };
    }
    match buf.into_iter().next() {
        None => Content::new(),
        Some(Part::Leaf(segment)) => Content {
            repr: Repr::Single(segment),
        },
        Some(Part::Group(content)) => content,
    }
}

impl<'a> From<Segment<'a>> for Content<'a> {
    #[inline]
    fn from(segment: Segment<'a>) -> Self {
        if segment.is_empty() {
            Content::new()
        } else {
            Content {
                repr: Repr::Single(segment),
            }
        }
    }
}

impl<'a> From<&'a str> for Content<'a> {
    #[inline]
    fn from(text: &'a str) -> Self {
        Content::from(Segment::from(text))
    }
}

impl From<String> for Content<'_> {
    #[inline]
    fn from(text: String) -> Self {
        Content::from(Segment::from(text))
    }
}

impl From<Arc<str>> for Content<'_> {
    #[inline]
    fn from(text: Arc<str>) -> Self {
        Content::from(Segment::from(text))
    }
}

impl From<char> for Content<'_> {
    #[inline]
    fn from(ch: char) -> Self {
        Content::from(Segment::from(ch))
    }
}

impl<'a> FromIterator<Content<'a>> for Content<'a> {
    fn from_iter<I: IntoIterator<Item = Content<'a>>>(iter: I) -> Self {
        Content::from_parts(iter)
    }
}

impl<'a> Add for Content<'a> {
    type Output = Content<'a>;

    #[inline]
    fn add(self, rhs: Content<'a>) -> Content<'a> {
        self.concat(&rhs)
    }
}

impl<'a> Add<&Content<'a>> for Content<'a> {
    type Output = Content<'a>;

    #[inline]
    fn add(self, rhs: &Content<'a>) -> Content<'a> {
        self.concat(rhs)
    }
}

impl<'a> AddAssign for Content<'a> {
    #[inline]
    fn add_assign(&mut self, rhs: Content<'a>) {
        *self = self.concat(&rhs);
    }
}

impl fmt::Display for Content<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f)
    }
}

impl From<&Content<'_>> for String {
    /// Materialize the flattened text in a single presized allocation.
    fn from(content: &Content<'_>) -> String {
        let mut out = String::with_capacity(content.len());
        for segment in content.segments() {
            out.push_str(segment.as_str());
        }
        out
    }
}

impl<'a, 'b> PartialEq<Content<'b>> for Content<'a> {
    /// Equality over the flattened character sequence.
    ///
    /// Two values with different internal segmentation but identical
    /// characters are equal. Length mismatch rejects in O(1); otherwise
    /// both leaf sequences are walked in lockstep comparing overlapping
    /// windows, without materializing either side.
    fn eq(&self, other: &Content<'b>) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let mut left_iter = self.segments();
        let mut right_iter = other.segments();
        let mut left: &[u8] = &[];
        let mut right: &[u8] = &[];
        loop {
            if left.is_empty() {
                match left_iter.next() {
                    Some(segment) => left = segment.as_str().as_bytes(),
                    // Same total length, so the right side is spent too.
                    None => return true,
                }
            }
            if right.is_empty() {
                match right_iter.next() {
                    Some(segment) => right = segment.as_str().as_bytes(),
                    None => return true,
                }
            }
            let step = left.len().min(right.len());
            if left[..step] != right[..step] {
                return false;
            }
            left = &left[step..];
            right = &right[step..];
        }
    }
}

impl Eq for Content<'_> {}

impl PartialEq<str> for Content<'_> {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        *self == Content::from(other)
    }
}

impl PartialEq<&str> for Content<'_> {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        *self == Content::from(*other)
    }
}

impl Hash for Content<'_> {
    /// Hash over the flattened character sequence.
    ///
    /// Bytes are staged through a fixed-size block so the hasher
    /// observes an identical write sequence for identical flattened
    /// text, regardless of how the leaves are segmented. Equal values
    /// therefore hash equally.
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut block = [0u8; 64];
        let mut filled = 0;
        for segment in self.segments() {
            let mut bytes = segment.as_str().as_bytes();
            while !bytes.is_empty() {
                let take = (block.len() - filled).min(bytes.len());
                block[filled..filled + take].copy_from_slice(&bytes[..take]);
                filled += take;
                bytes = &bytes[take..];
                if filled == block.len() {
                    state.write(&block);
                    filled = 0;
                }
            }
        }
        if filled > 0 {
            state.write(&block[..filled]);
        }
        state.write_u8(0xff);
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Content<'_> {
    /// Serializes as the flattened text, streamed leaf by leaf.
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Content<'static> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Ok(Content::from(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(content: &Content<'_>) -> u64 {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn empty_value() {
        let empty = Content::new();
        assert_eq!(empty.len(), 0);
        assert_eq!(empty.segment_count(), 0);
        assert!(empty.is_empty());
        assert_eq!(empty.to_string(), "");
    }

    #[test]
    fn single_run() {
        let content = Content::from("hello");
        assert_eq!(content.len(), 5);
        assert_eq!(content.segment_count(), 1);
        assert_eq!(content.to_string(), "hello");
    }

    #[test]
    fn from_parts_drops_empties_and_unwraps_singles() {
        let content = Content::from_parts([
            Content::new(),
            Content::from("only"),
            Content::from(""),
        ]);
        assert_eq!(content.segment_count(), 1);
        assert_eq!(content.to_string(), "only");

        let empty = Content::from_parts([Content::new(), Content::from("")]);
        assert!(empty.is_empty());
        assert_eq!(empty.segment_count(), 0);
    }

    #[test]
    fn metadata_sums_through_nesting() {
        let inner = Content::from_parts([Content::from("ab"), Content::from("cd")]);
        let outer = Content::from_parts([inner, Content::from("ef")]);
        assert_eq!(outer.len(), 6);
        assert_eq!(outer.segment_count(), 3);
        assert_eq!(outer.to_string(), "abcdef");
    }

    #[test]
    fn concat_is_zero_copy_and_identity_on_empty() {
        let left = Content::from("left");
        let joined = left.concat(&Content::new());
        assert_eq!(joined, left);
        let joined = Content::new().concat(&left);
        assert_eq!(joined, left);

        let both = Content::from("ab") + Content::from("cd");
        assert_eq!(both.to_string(), "abcd");
        assert_eq!(both.segment_count(), 2);
    }

    #[test]
    fn concatenation_is_associative() {
        let (a, b, c) = (Content::from("one"), Content::from("two"), Content::from("three"));
        let left = (a.clone() + b.clone()) + c.clone();
        let right = a + (b + c);
        assert_eq!(left, right);
        assert_eq!(left.to_string(), "onetwothree");
    }

    #[test]
    fn equality_ignores_segmentation() {
        let whole = Content::from("Hello, World!");
        let thirds = Content::from_parts([
            Content::from("Hello"),
            Content::from(", Wor"),
            Content::from("ld!"),
        ]);
        assert_eq!(whole, thirds);
        assert_eq!(hash_of(&whole), hash_of(&thirds));
    }

    #[test]
    fn inequality_on_content_and_length() {
        assert_ne!(Content::from("abc"), Content::from("abd"));
        assert_ne!(Content::from("abc"), Content::from("abcd"));
        assert_ne!(Content::from("abc"), Content::new());
    }

    #[test]
    fn display_matches_length() {
        let content = Content::from_parts([Content::from("héllo"), Content::from(" wörld")]);
        assert_eq!(content.to_string().len(), content.len());
    }

    #[test]
    fn copy_to_round_trip() {
        let content = Content::from_parts([Content::from("ab"), Content::from("cd")]);
        let mut buf = [0u8; 4];
        assert!(content.try_copy_to(&mut buf));
        assert_eq!(&buf, b"abcd");

        let mut small = [0u8; 3];
        assert!(!content.try_copy_to(&mut small));
        assert_eq!(&small, &[0u8; 3], "failed copy must not write");
    }

    #[test]
    #[should_panic(expected = "destination buffer too small")]
    fn copy_to_panics_when_short() {
        let content = Content::from("abcd");
        let mut small = [0u8; 2];
        content.copy_to(&mut small);
    }

    #[test]
    fn char_boundaries_across_leaves() {
        let content = Content::from_parts([Content::from("aé"), Content::from("b")]);
        // Layout: a=0, é=1..3, b=3..4
        assert!(content.is_char_boundary(0));
        assert!(content.is_char_boundary(1));
        assert!(!content.is_char_boundary(2));
        assert!(content.is_char_boundary(3));
        assert!(content.is_char_boundary(4));
        assert!(!content.is_char_boundary(5));

        assert_eq!(content.floor_char_boundary(2), 1);
        assert_eq!(content.floor_char_boundary(3), 3);
        assert_eq!(content.floor_char_boundary(99), 4);
    }

    #[test]
    fn string_conversion_is_presized() {
        let content = Content::from_parts([Content::from("ab"), Content::from("cd")]);
        let text = String::from(&content);
        assert_eq!(text, "abcd");
        assert_eq!(text.capacity(), content.len());
    }
}
