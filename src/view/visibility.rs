//! Collapsed/expanded decision for a single hidden link.
//!
//! A link under the caret, or touched by the selection, shows its raw syntax
//! so it can be edited; every other link collapses to its display text. The
//! decision is a pure function of the link and the current selection and is
//! recomputed on every rebuild.

use crate::model::selection::Selection;
use crate::primitives::scanner::HiddenLink;

/// How a hidden link renders on the live surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpanState {
    /// Only the display text is shown
    Collapsed,
    /// The raw syntax is shown, styled as a link
    Expanded,
}

impl SpanState {
    pub fn is_collapsed(self) -> bool {
        self == SpanState::Collapsed
    }
}

/// Decide whether `link` is collapsed or expanded for `selection`.
///
/// Expanded when the selection's `from` endpoint lies in `[start, end]`, or
/// when the selection range touches the link
/// (`from <= end && to >= start`). Both bounds are inclusive.
pub fn resolve(link: &HiddenLink, selection: Selection) -> SpanState {
    let caret_inside = link.contains_inclusive(selection.from);
    let touches = selection.from <= link.end && selection.to >= link.start;

    if caret_inside || touches {
        SpanState::Expanded
    } else {
        SpanState::Collapsed
    }
}
