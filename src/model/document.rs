//! Line-indexed document text.
//!
//! The editing surface owns the text; this is the read-only view the
//! decoration builder and interaction controller need: line count, per-line
//! text with its absolute start offset, and offset → line lookup.
//!
//! Lines are numbered from 1. Line text never includes its terminator
//! (`\n` or `\r\n`).

use std::ops::Range;

/// One line of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    /// 1-based line number
    pub number: usize,
    /// Absolute byte offset of the first byte of the line
    pub from: usize,
    /// Line text without terminator
    pub text: &'a str,
}

impl Line<'_> {
    /// Absolute offset one past the last byte of the text (before the terminator)
    pub fn to(&self) -> usize {
        self.from + self.text.len()
    }
}

/// Immutable document snapshot with a line start index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    /// Byte offset of the start of each line; always non-empty
    line_starts: Vec<usize>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        Self { text, line_starts }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of lines. An empty document has one (empty) line.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Get a line by 1-based number.
    pub fn line(&self, number: usize) -> Option<Line<'_>> {
        let index = number.checked_sub(1)?;
        let from = *self.line_starts.get(index)?;
        let raw_end = self
            .line_starts
            .get(index + 1)
            .map_or(self.text.len(), |next| next - 1);
        let text = &self.text[from..raw_end];
        let text = text.strip_suffix('\r').unwrap_or(text);
        Some(Line { number, from, text })
    }

    /// The line containing `offset`. Offsets past the end resolve to the last line.
    pub fn line_at(&self, offset: usize) -> Line<'_> {
        let offset = offset.min(self.text.len());
        let index = match self.line_starts.binary_search(&offset) {
            Ok(i) => i,
            Err(i) => i - 1,
        };
        // index < line_starts.len() by construction
        self.line(index + 1).unwrap_or(Line {
            number: 1,
            from: 0,
            text: "",
        })
    }

    /// Iterate all lines in order.
    pub fn lines(&self) -> impl Iterator<Item = Line<'_>> + '_ {
        (1..=self.line_count()).filter_map(move |n| self.line(n))
    }

    /// Text in a byte range, or `None` if the range is out of bounds or not on
    /// character boundaries.
    pub fn slice(&self, range: Range<usize>) -> Option<&str> {
        self.text.get(range)
    }
}

impl From<&str> for Document {
    fn from(text: &str) -> Self {
        Document::new(text)
    }
}
