//! Selection state reported by the editing surface.

use std::ops::Range;

/// A normalized selection: `from <= to`, both absolute byte offsets.
/// `from == to` is a bare caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    pub from: usize,
    pub to: usize,
}

impl Selection {
    /// Build a selection from two endpoints in any order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            from: a.min(b),
            to: a.max(b),
        }
    }

    /// A caret with no range.
    pub fn caret(pos: usize) -> Self {
        Self { from: pos, to: pos }
    }

    pub fn is_caret(&self) -> bool {
        self.from == self.to
    }

    pub fn range(&self) -> Range<usize> {
        self.from..self.to
    }

    /// Smallest selection covering both `self` and `other`.
    pub fn union(&self, other: Selection) -> Selection {
        Selection {
            from: self.from.min(other.from),
            to: self.to.max(other.to),
        }
    }

    /// Clamp both endpoints to a document length.
    pub fn clamp(&self, len: usize) -> Selection {
        Selection {
            from: self.from.min(len),
            to: self.to.min(len),
        }
    }
}

impl From<Range<usize>> for Selection {
    fn from(range: Range<usize>) -> Self {
        Selection::new(range.start, range.end)
    }
}

/// Who caused a selection change.
///
/// Only user-originated changes are corrected by selection auto-expansion;
/// programmatic ones (including the correction itself) are left alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionOrigin {
    /// Mouse drag, shift+arrow, select-all, ...
    User,
    /// Set by the system, e.g. a corrective selection command
    Programmatic,
}
