//! Span scanner.
//!
//! Finds hidden link occurrences in one line (or one bounded container) of
//! text. Matches come out in order and never overlap: after each match the
//! search resumes at its end, with the leftmost-first, non-greedy semantics of
//! the compiled [`LinkPattern`].
//!
//! All offsets are byte offsets. `base_offset` is the absolute position of the
//! scanned text inside the document, so produced ranges can be used directly
//! as document ranges.

use std::ops::Range;

use regex::Regex;

use super::pattern::LinkPattern;

/// One located occurrence of the hidden link syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HiddenLink {
    /// Absolute offset of the first byte of the start delimiter
    pub start: usize,
    /// Absolute offset one past the last byte of the end delimiter
    pub end: usize,
    /// Hidden text, trimmed
    pub payload: String,
    /// Visible text, trimmed
    pub display: String,
}

impl HiddenLink {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    /// True if `offset` lies in `[start, end]`. Both edges count, so a caret
    /// sitting right before or right after the syntax is "on" the link.
    pub fn contains_inclusive(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    /// True if the half-open range `from..to` strictly overlaps this link.
    pub fn overlaps(&self, from: usize, to: usize) -> bool {
        self.start < to && self.end > from
    }
}

/// Lazy iterator over the hidden links of a text.
///
/// Cheap to clone; a clone continues from the clone point, and [`scan`] can be
/// called again at any time to restart from the beginning.
#[derive(Debug, Clone)]
pub struct Scan<'p, 't> {
    regex: Option<&'p Regex>,
    text: &'t str,
    /// Byte position in `text` where the next search starts
    cursor: usize,
    base_offset: usize,
}

impl Iterator for Scan<'_, '_> {
    type Item = HiddenLink;

    fn next(&mut self) -> Option<HiddenLink> {
        let regex = self.regex?;
        while self.cursor <= self.text.len() {
            let caps = regex.captures_at(self.text, self.cursor)?;
            let whole = caps.get(0)?;

            if whole.is_empty() {
                // Only reachable with degenerate patterns; step past one char.
                self.cursor = next_char_boundary(self.text, whole.end());
                continue;
            }
            self.cursor = whole.end();

            let (Some(payload), Some(display)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            return Some(HiddenLink {
                start: self.base_offset + whole.start(),
                end: self.base_offset + whole.end(),
                payload: payload.as_str().trim().to_string(),
                display: display.as_str().trim().to_string(),
            });
        }
        None
    }
}

impl std::iter::FusedIterator for Scan<'_, '_> {}

fn next_char_boundary(text: &str, offset: usize) -> usize {
    text[offset..]
        .chars()
        .next()
        .map_or(text.len() + 1, |c| offset + c.len_utf8())
}

/// Scan `text`, whose first byte sits at `base_offset` in the document.
pub fn scan<'p, 't>(text: &'t str, base_offset: usize, pattern: &'p LinkPattern) -> Scan<'p, 't> {
    Scan {
        regex: pattern.regex(),
        text,
        cursor: 0,
        base_offset,
    }
}

/// Find the first link whose inclusive range `[start, end]` contains `offset`.
pub fn find_at(
    text: &str,
    base_offset: usize,
    pattern: &LinkPattern,
    offset: usize,
) -> Option<HiddenLink> {
    scan(text, base_offset, pattern)
        .take_while(|link| link.start <= offset)
        .find(|link| link.contains_inclusive(offset))
}

/// All links that strictly overlap the half-open range `from..to`.
pub fn find_overlapping(
    text: &str,
    base_offset: usize,
    pattern: &LinkPattern,
    from: usize,
    to: usize,
) -> Vec<HiddenLink> {
    scan(text, base_offset, pattern)
        .take_while(|link| link.start < to)
        .filter(|link| link.overlaps(from, to))
        .collect()
}
