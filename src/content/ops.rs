//! Positional operations over the flattened character sequence.
//!
//! Every operation here addresses the value by absolute byte offsets
//! into the flattened sequence, independent of how the leaves happen to
//! be segmented. Searching and replacing must therefore handle matches
//! whose bytes straddle a leaf boundary: each leaf is scanned with the
//! fast in-leaf searcher first, then the leaf tail is probed for
//! matches that continue character-for-character into the following
//! leaves.
//!
//! # Performance
//!
//! - Fast paths return the receiver or a single sub-slice without
//!   touching the part tree
//! - General paths walk leaves once, reusing untouched leaves as-is
//! - Transient staging lives in stack-allocated buffers sized from the
//!   known segment count

use memchr::memmem;
use smallvec::SmallVec;

use super::{Content, Part, PartBuf, Repr, from_part_buf, push_part};
use crate::error::{Error, Result};
use crate::segment::Segment;

impl<'a> Content<'a> {
    /// Return a new value covering `start..start + len` of the
    /// flattened sequence.
    ///
    /// A zero-length slice is the empty value; the full range returns
    /// the receiver unchanged (no copy); slicing a single run yields a
    /// single sub-run. The general path walks leaves, skipping those
    /// before the window, sub-slicing the two boundary leaves, and
    /// reusing every whole leaf in between.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when the window exceeds the value,
    /// [`Error::NotCharBoundary`] when an endpoint splits a multi-byte
    /// character.
    pub fn slice(&self, start: usize, len: usize) -> Result<Content<'a>> {
        let total = self.len();
        let end = match start.checked_add(len) {
            Some(end) if end <= total => end,
            _ => {
                return Err(Error::OutOfRange {
                    start,
                    len,
                    available: total,
                });
            },
        };
        if len == 0 {
            return Ok(Content::new());
        }
        if start == 0 && end == total {
            return Ok(self.clone());
        }
        if let Repr::Single(segment) = &self.repr {
            return segment.slice(start, len).map(Content::from);
        }
        let mut out = PartBuf::new();
        let mut consumed = 0;
        for segment in self.segments() {
            let seg_start = consumed;
            let seg_end = consumed + segment.len();
            consumed = seg_end;
            if seg_end <= start {
                continue;
            }
            if seg_start >= end {
                break;
            }
            let from = start.max(seg_start) - seg_start;
            let to = end.min(seg_end) - seg_start;
            let piece = if from == 0 && to == segment.len() {
                segment.clone()
            } else {
                slice_leaf(segment, from, to - from, seg_start)?
            };
            push_part(&mut out, Part::Leaf(piece));
        }
        Ok(from_part_buf(out))
    }

    /// Return a new value with `value` spliced in at `index`.
    ///
    /// Inserting at offset 0 or at the end is a pure concatenation; a
    /// mid-leaf index splits exactly that one leaf into a before/after
    /// pair. Inserting an empty value returns the receiver unchanged.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when `index` exceeds the length,
    /// [`Error::NotCharBoundary`] when it splits a multi-byte
    /// character.
    pub fn insert(&self, index: usize, value: impl Into<Content<'a>>) -> Result<Content<'a>> {
        let total = self.len();
        if index > total {
            return Err(Error::OutOfRange {
                start: index,
                len: 0,
                available: total,
            });
        }
        let value = value.into();
        if value.is_empty() {
            return Ok(self.clone());
        }
        if index == 0 {
            return Ok(value.concat(self));
        }
        if index == total {
            return Ok(self.concat(&value));
        }
        let mut out = PartBuf::new();
        let mut inserted = false;
        let mut consumed = 0;
        for segment in self.segments() {
            let next = consumed + segment.len();
            if !inserted && index < next {
                let local = index - consumed;
                if local == 0 {
                    // Index falls exactly between two leaves: no split.
                    push_part(&mut out, Part::Group(value.clone()));
                    push_part(&mut out, Part::Leaf(segment.clone()));
                } else {
                    let before = slice_leaf(segment, 0, local, consumed)?;
                    let after = slice_leaf(segment, local, segment.len() - local, consumed)?;
                    push_part(&mut out, Part::Leaf(before));
                    push_part(&mut out, Part::Group(value.clone()));
                    push_part(&mut out, Part::Leaf(after));
                }
                inserted = true;
            } else {
                push_part(&mut out, Part::Leaf(segment.clone()));
            }
            consumed = next;
        }
        Ok(from_part_buf(out))
    }

    /// Return a new value with `start..start + count` removed.
    ///
    /// Removal from the very front or very back degenerates to a plain
    /// slice; interior removal walks leaves once, keeping only the
    /// fragments outside the removed window.
    ///
    /// # Errors
    ///
    /// [`Error::OutOfRange`] when the window exceeds the value,
    /// [`Error::NotCharBoundary`] when an endpoint splits a multi-byte
    /// character.
    pub fn remove(&self, start: usize, count: usize) -> Result<Content<'a>> {
        let total = self.len();
        let end = match start.checked_add(count) {
            Some(end) if end <= total => end,
            _ => {
                return Err(Error::OutOfRange {
                    start,
                    len: count,
                    available: total,
                });
            },
        };
        if count == 0 {
            return Ok(self.clone());
        }
        if start == 0 && end == total {
            return Ok(Content::new());
        }
        if start == 0 {
            return self.slice(end, total - end);
        }
        if end == total {
            return self.slice(0, start);
        }
        let mut out = PartBuf::new();
        let mut consumed = 0;
        for segment in self.segments() {
            let seg_start = consumed;
            let seg_end = consumed + segment.len();
            consumed = seg_end;
            if seg_end <= start || seg_start >= end {
                push_part(&mut out, Part::Leaf(segment.clone()));
                continue;
            }
            if start > seg_start {
                push_part(
                    &mut out,
                    Part::Leaf(slice_leaf(segment, 0, start - seg_start, seg_start)?),
                );
            }
            if end < seg_end {
                push_part(
                    &mut out,
                    Part::Leaf(slice_leaf(segment, end - seg_start, seg_end - end, seg_start)?),
                );
            }
        }
        Ok(from_part_buf(out))
    }

    /// Return a new value with every non-overlapping occurrence of
    /// `old` replaced by `new`, including occurrences whose bytes
    /// straddle leaf boundaries.
    ///
    /// Comparison is ordinal (byte-wise). When `old` does not occur the
    /// receiver is returned unchanged, so callers can detect the no-op
    /// cheaply.
    ///
    /// # Errors
    ///
    /// [`Error::EmptyPattern`] when `old` is empty; an empty pattern
    /// has no well-defined match semantics.
    pub fn replace(&self, old: &str, new: impl Into<Content<'a>>) -> Result<Content<'a>> {
        if old.is_empty() {
            return Err(Error::EmptyPattern);
        }
        if old.len() > self.len() {
            return Ok(self.clone());
        }
        let replacement = new.into();
        let pattern = old.as_bytes();
        let finder = memmem::Finder::new(pattern);
        let leaves: SmallVec<[&Segment<'a>; 8]> = self.segments().collect();
        let mut out = PartBuf::new();
        let mut cursor = (0, 0);
        let mut kept = (0, 0);
        let mut found = false;
        while let Some(at) = next_match(&leaves, pattern, &finder, cursor.0, cursor.1) {
            found = true;
            emit_leaves(&mut out, &leaves, kept, at)?;
            push_part(&mut out, Part::Group(replacement.clone()));
            cursor = advance(&leaves, at.0, at.1, pattern.len());
            kept = cursor;
        }
        if !found {
            return Ok(self.clone());
        }
        emit_leaves(&mut out, &leaves, kept, (leaves.len(), 0))?;
        Ok(from_part_buf(out))
    }

    /// Find the first occurrence of `pattern` in the flattened
    /// sequence, returning its byte offset.
    ///
    /// Matches straddling leaf boundaries are found. An empty pattern
    /// matches at offset 0, as with [`str::find`].
    pub fn find(&self, pattern: &str) -> Option<usize> {
        if pattern.is_empty() {
            return Some(0);
        }
        if pattern.len() > self.len() {
            return None;
        }
        let bytes = pattern.as_bytes();
        let finder = memmem::Finder::new(bytes);
        let leaves: SmallVec<[&Segment<'a>; 8]> = self.segments().collect();
        let (leaf, offset) = next_match(&leaves, bytes, &finder, 0, 0)?;
        let mut global = offset;
        for segment in &leaves[..leaf] {
            global += segment.len();
        }
        Some(global)
    }

    /// Find the first occurrence of a character, returning its byte
    /// offset in the flattened sequence.
    pub fn find_char(&self, ch: char) -> Option<usize> {
        if ch.is_ascii() {
            let needle = ch as u8;
            let mut consumed = 0;
            for segment in self.segments() {
                if let Some(found) = memchr::memchr(needle, segment.as_str().as_bytes()) {
                    return Some(consumed + found);
                }
                consumed += segment.len();
            }
            return None;
        }
        // Leaves are whole UTF-8 runs, so a multi-byte character never
        // straddles a boundary; the run search covers it.
        let mut buf = [0u8; 4];
        self.find(ch.encode_utf8(&mut buf))
    }

    /// Find the first occurrence of any character in `set`, returning
    /// its byte offset in the flattened sequence.
    pub fn find_any(&self, set: &[char]) -> Option<usize> {
        if set.is_empty() {
            return None;
        }
        let mut consumed = 0;
        for segment in self.segments() {
            let text = segment.as_str();
            for (at, ch) in text.char_indices() {
                if set.contains(&ch) {
                    return Some(consumed + at);
                }
            }
            consumed += text.len();
        }
        None
    }

    /// Check whether `pattern` occurs anywhere in the flattened
    /// sequence, including across leaf boundaries.
    #[inline]
    pub fn contains(&self, pattern: &str) -> bool {
        self.find(pattern).is_some()
    }

    /// Check whether the character occurs anywhere in the flattened
    /// sequence.
    #[inline]
    pub fn contains_char(&self, ch: char) -> bool {
        self.find_char(ch).is_some()
    }
}

/// Sub-slice a leaf, remapping boundary errors from leaf-local offsets
/// to flattened offsets.
fn slice_leaf<'a>(
    segment: &Segment<'a>,
    start: usize,
    len: usize,
    base: usize,
) -> Result<Segment<'a>> {
    segment.slice(start, len).map_err(|err| match err {
        Error::NotCharBoundary { offset } => Error::NotCharBoundary {
            offset: base + offset,
        },
        other => other,
    })
}

/// Find the next match at or after `(leaf, offset)`, in leaf-local
/// coordinates.
///
/// Each leaf is searched with the in-leaf finder first; an in-leaf
/// match always precedes any straddling candidate in the same leaf, so
/// results come out leftmost-first. Only when the tail of the leaf is
/// too short to hold a full match are straddling candidates probed,
/// anchored on the pattern's first byte.
fn next_match(
    leaves: &[&Segment<'_>],
    pattern: &[u8],
    finder: &memmem::Finder<'_>,
    mut leaf: usize,
    mut offset: usize,
) -> Option<(usize, usize)> {
    while leaf < leaves.len() {
        let hay = leaves[leaf].as_str().as_bytes();
        if offset < hay.len() {
            if let Some(found) = finder.find(&hay[offset..]) {
                return Some((leaf, offset + found));
            }
            if leaf + 1 < leaves.len() {
                let tail = (hay.len() + 1).saturating_sub(pattern.len()).max(offset);
                let mut at = tail;
                while at < hay.len() {
                    match memchr::memchr(pattern[0], &hay[at..]) {
                        Some(delta) => at += delta,
                        None => break,
                    }
                    if matches_across(leaves, leaf, at, pattern) {
                        return Some((leaf, at));
                    }
                    at += 1;
                }
            }
        }
        leaf += 1;
        offset = 0;
    }
    None
}

/// Check whether `pattern` matches byte-for-byte starting at the given
/// leaf-local position, continuing across subsequent leaves as needed.
fn matches_across(leaves: &[&Segment<'_>], leaf: usize, offset: usize, pattern: &[u8]) -> bool {
    let mut rest = pattern;
    let mut index = leaf;
    let mut local = offset;
    while !rest.is_empty() {
        let Some(segment) = leaves.get(index) else {
            return false;
        };
        let hay = &segment.as_str().as_bytes()[local..];
        let take = hay.len().min(rest.len());
        if hay[..take] != rest[..take] {
            return false;
        }
        rest = &rest[take..];
        index += 1;
        local = 0;
    }
    true
}

/// Advance a leaf-local cursor by `n` bytes.
fn advance(leaves: &[&Segment<'_>], mut leaf: usize, mut offset: usize, mut n: usize) -> (usize, usize) {
    while n > 0 {
        let available = leaves[leaf].len() - offset;
        if n < available {
            return (leaf, offset + n);
        }
        n -= available;
        leaf += 1;
        offset = 0;
    }
    (leaf, offset)
}

/// Emit the retained leaf range `[from, to)` (leaf-local coordinates)
/// into the staging buffer, sub-slicing the two edge leaves and
/// reusing whole leaves in between.
fn emit_leaves<'a>(
    out: &mut PartBuf<'a>,
    leaves: &[&Segment<'a>],
    from: (usize, usize),
    to: (usize, usize),
) -> Result<()> {
    let (from_leaf, from_offset) = from;
    let (to_leaf, to_offset) = to;
    let mut index = from_leaf;
    while index < to_leaf.min(leaves.len()) {
        let segment = leaves[index];
        let local = if index == from_leaf { from_offset } else { 0 };
        if segment.len() > local {
            let piece = if local == 0 {
                segment.clone()
            } else {
                segment.slice(local, segment.len() - local)?
            };
            push_part(out, Part::Leaf(piece));
        }
        index += 1;
    }
    if to_leaf < leaves.len() && to_offset > 0 {
        let segment = leaves[to_leaf];
        let local = if to_leaf == from_leaf { from_offset } else { 0 };
        if to_offset > local {
            let piece = if local == 0 && to_offset == segment.len() {
                segment.clone()
            } else {
                segment.slice(local, to_offset - local)?
            };
            push_part(out, Part::Leaf(piece));
        }
    }
    Ok(())
}
