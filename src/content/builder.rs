//! Transient accumulator for assembling buffer values.
//!
//! The builder is the write-side counterpart to the immutable value: a
//! single-owner, append-only part list that freezes into a value
//! exactly once. Freezing consumes the builder by value, so appending
//! after finalization or finalizing twice is rejected at compile time
//! rather than at run time.

use std::sync::Arc;

use super::{Content, Part, Repr};
use crate::segment::Segment;

/// Accumulates segments and values, then freezes into a [`Content`].
///
/// Length and leaf-count metadata are tracked incrementally on every
/// append, so [`finish`](Self::finish) does no flattening pass.
///
/// # Examples
///
/// ```
/// use longan::ContentBuilder;
///
/// let mut builder = ContentBuilder::with_capacity(3);
/// builder.append_str("let ");
/// builder.append_owned(String::from("answer"));
/// builder.append_str(" = 42;");
/// let content = builder.finish();
/// assert_eq!(content.to_string(), "let answer = 42;");
/// assert_eq!(content.segment_count(), 3);
/// ```
#[derive(Debug, Default)]
pub struct ContentBuilder<'a> {
    parts: Vec<Part<'a>>,
    len: usize,
    segments: usize,
    flatten: bool,
}

impl<'a> ContentBuilder<'a> {
    /// Create an empty builder.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty builder presized for `parts` appends.
    #[inline]
    pub fn with_capacity(parts: usize) -> Self {
        Self {
            parts: Vec::with_capacity(parts),
            ..Self::default()
        }
    }

    /// Switch the builder into flattening mode.
    ///
    /// In flattening mode an appended multi-part value is copied leaf
    /// by leaf (O(1) clones each) into the builder's own part list
    /// instead of nesting, trading a little work per append for flat
    /// storage in the finished value.
    #[inline]
    pub fn flattening(mut self) -> Self {
        self.flatten = true;
        self
    }

    /// Total byte length accumulated so far.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if nothing has been accumulated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of leaf segments accumulated so far.
    #[inline]
    pub fn segment_count(&self) -> usize {
        self.segments
    }

    /// Append a value. Empty values are dropped.
    pub fn append(&mut self, value: impl Into<Content<'a>>) -> &mut Self {
        let content = value.into();
        match content.repr {
            Repr::Empty => {},
            Repr::Single(segment) => self.push_segment(segment),
            repr @ Repr::Parts { .. } => {
                let content = Content { repr };
                if self.flatten {
                    for segment in content.segments() {
                        self.push_segment(segment.clone());
                    }
                } else {
                    self.len += content.len();
                    self.segments += content.segment_count();
                    self.parts.push(Part::Group(content));
                }
            },
        }
        self
    }

    /// Append a borrowed run.
    #[inline]
    pub fn append_str(&mut self, text: &'a str) -> &mut Self {
        self.push_segment(Segment::from(text));
        self
    }

    /// Append an owned run, converting it into shared storage.
    #[inline]
    pub fn append_owned(&mut self, text: String) -> &mut Self {
        self.push_segment(Segment::from(text));
        self
    }

    /// Append a single character.
    #[inline]
    pub fn append_char(&mut self, ch: char) -> &mut Self {
        self.push_segment(Segment::from(ch));
        self
    }

    /// Append a segment directly.
    #[inline]
    pub fn append_segment(&mut self, segment: Segment<'a>) -> &mut Self {
        self.push_segment(segment);
        self
    }

    fn push_segment(&mut self, segment: Segment<'a>) {
        if segment.is_empty() {
            return;
        }
        self.len += segment.len();
        self.segments += 1;
        self.parts.push(Part::Leaf(segment));
    }

    /// Freeze the accumulated parts into an immutable value.
    ///
    /// Consumes the builder: the accumulated part list becomes the
    /// value's storage without copying, and no further appends can be
    /// expressed.
    pub fn finish(self) -> Content<'a> {
        match self.parts.len() {
            0 => Content::new(),
            1 => {
                let mut parts = self.parts;
                match parts.pop() {
                    Some(Part::Leaf(segment)) => Content {
                        repr: Repr::Single(segment),
                    },
                    Some(Part::Group(content)) => content,
                    None => Content::new(),
                }
            },
            _ => Content {
                repr: Repr::Parts {
                    parts: Arc::from(self.parts),
                    len: self.len,
                    segments: self.segments,
                },
            },
        }
    }
}

impl<'a> Extend<Content<'a>> for ContentBuilder<'a> {
    fn extend<I: IntoIterator<Item = Content<'a>>>(&mut self, iter: I) {
        for content in iter {
            self.append(content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_builder_finishes_empty() {
        let content = ContentBuilder::new().finish();
        assert!(content.is_empty());
        assert_eq!(content.segment_count(), 0);
    }

    #[test]
    fn single_append_unwraps() {
        let mut builder = ContentBuilder::new();
        builder.append_str("only");
        let content = builder.finish();
        assert_eq!(content.segment_count(), 1);
        assert_eq!(content.to_string(), "only");
    }

    #[test]
    fn empty_appends_are_dropped() {
        let mut builder = ContentBuilder::new();
        builder
            .append_str("")
            .append(Content::new())
            .append_owned(String::new())
            .append_str("kept");
        let content = builder.finish();
        assert_eq!(content.segment_count(), 1);
        assert_eq!(content.to_string(), "kept");
    }

    #[test]
    fn metadata_tracked_incrementally() {
        let nested = Content::from_parts([Content::from("cd"), Content::from("ef")]);
        let mut builder = ContentBuilder::with_capacity(2);
        builder.append_str("ab").append(nested);
        assert_eq!(builder.len(), 6);
        assert_eq!(builder.segment_count(), 3);
        let content = builder.finish();
        assert_eq!(content.len(), 6);
        assert_eq!(content.segment_count(), 3);
        assert_eq!(content.to_string(), "abcdef");
    }

    #[test]
    fn flattening_mode_copies_leaves() {
        let nested = Content::from_parts([Content::from("cd"), Content::from("ef")]);

        let mut plain = ContentBuilder::new();
        plain.append_str("ab").append(nested.clone());
        let kept_nested = plain.finish();

        let mut flat = ContentBuilder::new().flattening();
        flat.append_str("ab").append(nested);
        let flattened = flat.finish();

        // Same flattened text and leaf count either way; only the
        // storage shape differs.
        assert_eq!(kept_nested, flattened);
        assert_eq!(flattened.segment_count(), 3);
        assert_eq!(flattened.to_string(), "abcdef");
    }

    #[test]
    fn extend_appends_each_value() {
        let mut builder = ContentBuilder::new();
        builder.extend([Content::from("a"), Content::from("b"), Content::from("c")]);
        assert_eq!(builder.finish().to_string(), "abc");
    }

    #[test]
    fn mixed_append_kinds() {
        let mut builder = ContentBuilder::new();
        builder
            .append_str("n = ")
            .append_char('4')
            .append_owned(String::from("2"));
        let content = builder.finish();
        assert_eq!(content.to_string(), "n = 42");
        assert_eq!(content.segment_count(), 3);
    }
}
