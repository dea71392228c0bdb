//! Live decoration builder
//!
//! Produces the decoration set an editable surface renders on top of its
//! document: a replace decoration for every collapsed hidden link (the raw
//! syntax is swapped for its display text) and a mark decoration for every
//! expanded one (raw text is kept and styled as a link).
//!
//! ## Architecture
//!
//! The set is rebuilt from scratch whenever the document or the selection
//! changes. Nothing is carried over between builds, so there is no marker
//! bookkeeping and no stale range can survive an edit:
//! 1. Take a settings snapshot and compile the pattern
//! 2. Scan every line, resolve each link against the selection
//! 3. Emit decorations in document order
//!
//! Lines are disjoint and matches within a line never overlap, so the result
//! is ordered and non-overlapping by construction.

use std::ops::Range;

use crate::config::HiddenLinkSettings;
use crate::model::document::{Document, Line};
use crate::model::selection::Selection;
use crate::primitives::pattern::LinkPattern;
use crate::primitives::scanner::{scan, HiddenLink};

use super::visibility::{resolve, SpanState};

/// Class of the element rendered for a collapsed link.
pub const LINK_CLASS: &str = "hidden-link";

/// Class applied to the raw text of an expanded link.
pub const EXPANDED_CLASS: &str = "hidden-link-expanded";

/// What a decoration does to its range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecorationKind {
    /// Replace the range with `display`
    Replace { display: String },
    /// Keep the text, apply `class`
    Mark { class: &'static str },
}

/// A decoration over an absolute byte range of the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub range: Range<usize>,
    pub kind: DecorationKind,
    /// Hidden payload, available to hover/click handlers in both states
    pub payload: String,
}

impl Decoration {
    fn for_link(link: HiddenLink, state: SpanState) -> Self {
        let kind = match state {
            SpanState::Collapsed => DecorationKind::Replace {
                display: link.display,
            },
            SpanState::Expanded => DecorationKind::Mark {
                class: EXPANDED_CLASS,
            },
        };
        Self {
            range: link.start..link.end,
            kind,
            payload: link.payload,
        }
    }

    pub fn is_replace(&self) -> bool {
        matches!(self.kind, DecorationKind::Replace { .. })
    }

    pub fn state(&self) -> SpanState {
        if self.is_replace() {
            SpanState::Collapsed
        } else {
            SpanState::Expanded
        }
    }

    /// True if `offset` lies in the range, both edges included.
    pub fn contains_inclusive(&self, offset: usize) -> bool {
        self.range.start <= offset && offset <= self.range.end
    }
}

/// Ordered, non-overlapping decorations for a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecorationSet {
    decorations: Vec<Decoration>,
}

impl DecorationSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decorations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Decoration> {
        self.decorations.iter()
    }

    /// Decorations overlapping the half-open range `start..end`, in order.
    pub fn query_viewport(&self, start: usize, end: usize) -> &[Decoration] {
        let first = self.decorations.partition_point(|d| d.range.end <= start);
        let last = self.decorations.partition_point(|d| d.range.start < end);
        if first >= last {
            return &[];
        }
        &self.decorations[first..last]
    }

    /// The first decoration whose range contains `offset` (inclusive).
    pub fn at(&self, offset: usize) -> Option<&Decoration> {
        let first = self.decorations.partition_point(|d| d.range.end < offset);
        self.decorations[first..]
            .iter()
            .take_while(|d| d.range.start <= offset)
            .find(|d| d.contains_inclusive(offset))
    }

    /// The visible text of a line after applying decorations: replaced ranges
    /// show their display text, marked ranges keep the raw text.
    pub fn render_line(&self, line: &Line<'_>) -> String {
        let mut out = String::with_capacity(line.text.len());
        let mut cursor = line.from;

        for decoration in self.query_viewport(line.from, line.to()) {
            let DecorationKind::Replace { display } = &decoration.kind else {
                continue;
            };
            let start = decoration.range.start.max(cursor);
            out.push_str(&line.text[cursor - line.from..start - line.from]);
            out.push_str(display);
            cursor = decoration.range.end.min(line.to());
        }

        out.push_str(&line.text[cursor - line.from..]);
        out
    }

    /// Render every line of `document`, joined by `\n`.
    pub fn render_document(&self, document: &Document) -> String {
        document
            .lines()
            .map(|line| self.render_line(&line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl<'a> IntoIterator for &'a DecorationSet {
    type Item = &'a Decoration;
    type IntoIter = std::slice::Iter<'a, Decoration>;

    fn into_iter(self) -> Self::IntoIter {
        self.decorations.iter()
    }
}

/// Build the full decoration set for a document and selection.
pub fn build_decorations(
    document: &Document,
    selection: Selection,
    pattern: &LinkPattern,
) -> DecorationSet {
    let mut decorations = Vec::new();

    for number in 1..=document.line_count() {
        let Some(line) = document.line(number) else {
            continue;
        };
        for link in scan(line.text, line.from, pattern) {
            let state = resolve(&link, selection);
            decorations.push(Decoration::for_link(link, state));
        }
    }

    debug_assert!(decorations
        .windows(2)
        .all(|w| w[0].range.end <= w[1].range.start));

    DecorationSet { decorations }
}

/// What changed since the last notification from the editing surface.
#[derive(Debug, Clone, Copy)]
pub struct ViewUpdate<'a> {
    pub document: &'a Document,
    pub selection: Selection,
    pub doc_changed: bool,
    pub selection_set: bool,
}

/// Keeps the decoration set of one editable surface current.
#[derive(Debug, Clone, Default)]
pub struct LiveDecorator {
    decorations: DecorationSet,
}

impl LiveDecorator {
    /// Build the initial decorations.
    pub fn new(document: &Document, selection: Selection, settings: &HiddenLinkSettings) -> Self {
        let mut decorator = Self::default();
        decorator.rebuild(document, selection, settings);
        decorator
    }

    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    /// React to a surface update. Rebuilds when the document or the
    /// selection changed (a bare caret move counts) and returns whether it did.
    pub fn update(&mut self, update: &ViewUpdate<'_>, settings: &HiddenLinkSettings) -> bool {
        if !(update.doc_changed || update.selection_set) {
            return false;
        }
        self.rebuild(update.document, update.selection, settings);
        true
    }

    /// Rebuild unconditionally, e.g. after a settings change.
    pub fn rebuild(
        &mut self,
        document: &Document,
        selection: Selection,
        settings: &HiddenLinkSettings,
    ) {
        let pattern = LinkPattern::compile(&settings.delimiters());
        let selection = selection.clamp(document.len());
        self.decorations = build_decorations(document, selection, &pattern);

        if !self.decorations.is_empty() {
            let collapsed = self.decorations.iter().filter(|d| d.is_replace()).count();
            tracing::debug!(
                "[hidden-link] rebuilt {} decorations ({} collapsed) for {} lines",
                self.decorations.len(),
                collapsed,
                document.line_count()
            );
        }
    }
}
