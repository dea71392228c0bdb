//! Static replacement builder.
//!
//! Rewrites a read-only rendered container so every hidden link becomes a
//! single `span.hidden-link` element showing the display text and carrying
//! the payload in `data-payload`. There is no selection here, so every link
//! is collapsed.
//!
//! Work is split in two phases:
//! 1. [`plan`] scans the container and resolves each match to the text
//!    leaves owning its first and last byte. The result is an immutable list
//!    of (range, replacement) pairs.
//! 2. [`apply`] splices the replacements in, highest offset first, so an
//!    applied replacement never shifts the position of one still pending.
//!
//! Two scanning strategies exist. [`Strategy::Container`] flattens all text
//! of the container and scans it once, which finds links whose delimiters are
//! split across formatting boundaries (`::a|<em>b</em>::`).
//! [`Strategy::PerTextNode`] scans every text leaf on its own and misses
//! those.
//!
//! The flattened text carries a line break at every block boundary and in
//! place of every produced link element. No leaf owns those bytes and the
//! pattern never matches across a line break, so a link never spans two
//! paragraphs or wraps around an earlier link. Text inside a produced link
//! is never scanned again, so running the builder on its own output is a
//! no-op.

use std::ops::Range;

use crate::model::content::{Element, Node, NodePath, TextSegment};
use crate::primitives::pattern::LinkPattern;
use crate::primitives::scanner::{scan, HiddenLink};

use super::decoration::LINK_CLASS;

/// Attribute holding the hidden payload on produced link elements.
pub const PAYLOAD_ATTRIBUTE: &str = "data-payload";

/// How the container text is scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Strategy {
    /// Flatten the container text, scan once, map offsets back to leaves
    #[default]
    Container,
    /// Scan each text leaf independently
    PerTextNode,
}

/// What replaces a matched range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkReplacement {
    pub display: String,
    pub payload: String,
}

impl LinkReplacement {
    /// The interactive element inserted into the rendered output.
    pub fn to_element(&self) -> Element {
        Element::new("span")
            .with_class(LINK_CLASS)
            .with_attribute(PAYLOAD_ATTRIBUTE, self.payload.clone())
            .with_text(self.display.clone())
    }
}

/// A byte position inside one text leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LeafPosition {
    /// Index into the plan's leaf list
    leaf: usize,
    /// Byte offset inside that leaf's text
    offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PlannedReplacement {
    /// Range in the flattened container text
    range: Range<usize>,
    replacement: LinkReplacement,
    start: LeafPosition,
    end: LeafPosition,
}

/// Replacements to apply to one container, in ascending offset order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacementPlan {
    leaves: Vec<NodePath>,
    entries: Vec<PlannedReplacement>,
}

impl ReplacementPlan {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Planned (range, replacement) pairs in ascending order.
    pub fn replacements(&self) -> impl Iterator<Item = (Range<usize>, &LinkReplacement)> {
        self.entries
            .iter()
            .map(|e| (e.range.clone(), &e.replacement))
    }
}

fn is_link_element(element: &Element) -> bool {
    element.has_class(LINK_CLASS)
}

/// Scan `container` and plan its replacements without touching it.
pub fn plan(container: &Node, pattern: &LinkPattern, strategy: Strategy) -> ReplacementPlan {
    // Start offset of each leaf in the flattened text
    let mut leaves = Vec::new();
    let mut leaf_starts = Vec::new();
    let mut flattened = String::new();
    for segment in container.text_segments(&is_link_element) {
        match segment {
            TextSegment::Leaf(path, text) => {
                leaf_starts.push(flattened.len());
                flattened.push_str(text);
                leaves.push((path, text));
            }
            TextSegment::Break => flattened.push('\n'),
        }
    }

    let mut entries = Vec::new();
    match strategy {
        Strategy::Container => {
            for link in scan(&flattened, 0, pattern) {
                match locate(&leaf_starts, &leaves, &link) {
                    Some((start, end)) => entries.push(planned(link, start, end)),
                    None => tracing::warn!(
                        "skipping hidden link at {}..{}: range does not map onto text nodes",
                        link.start,
                        link.end
                    ),
                }
            }
        }
        Strategy::PerTextNode => {
            for (leaf, (_, text)) in leaves.iter().enumerate() {
                let base = leaf_starts[leaf];
                for link in scan(text, base, pattern) {
                    let start = LeafPosition {
                        leaf,
                        offset: link.start - base,
                    };
                    let end = LeafPosition {
                        leaf,
                        offset: link.end - base,
                    };
                    entries.push(planned(link, start, end));
                }
            }
        }
    }

    ReplacementPlan {
        leaves: leaves.into_iter().map(|(path, _)| path).collect(),
        entries,
    }
}

fn planned(link: HiddenLink, start: LeafPosition, end: LeafPosition) -> PlannedReplacement {
    PlannedReplacement {
        range: link.start..link.end,
        replacement: LinkReplacement {
            display: link.display,
            payload: link.payload,
        },
        start,
        end,
    }
}

/// Find the leaves owning the first byte and the last byte of `link`.
fn locate(
    leaf_starts: &[usize],
    leaves: &[(NodePath, &str)],
    link: &HiddenLink,
) -> Option<(LeafPosition, LeafPosition)> {
    // Leaf whose text contains byte `link.start`: last leaf starting at or
    // before it that is long enough to hold it.
    let start_leaf = leaf_starts
        .partition_point(|&s| s <= link.start)
        .checked_sub(1)?;
    let start_leaf = (start_leaf..leaves.len())
        .find(|&i| link.start < leaf_starts[i] + leaves[i].1.len())?;

    // Leaf whose text contains byte `link.end - 1`.
    let last_byte = link.end.checked_sub(1)?;
    let end_leaf = leaf_starts
        .partition_point(|&s| s <= last_byte)
        .checked_sub(1)?;
    if end_leaf < start_leaf || last_byte >= leaf_starts[end_leaf] + leaves[end_leaf].1.len() {
        return None;
    }

    Some((
        LeafPosition {
            leaf: start_leaf,
            offset: link.start - leaf_starts[start_leaf],
        },
        LeafPosition {
            leaf: end_leaf,
            offset: link.end - leaf_starts[end_leaf],
        },
    ))
}

/// Apply a plan to the container it was made from. Returns the number of
/// replacements applied; entries that can not be applied are logged and
/// skipped.
pub fn apply(container: &mut Node, plan: &ReplacementPlan) -> usize {
    let mut applied = 0;

    for entry in plan.entries.iter().rev() {
        match apply_one(container, &plan.leaves, entry) {
            Ok(()) => applied += 1,
            Err(reason) => tracing::warn!(
                "failed to replace hidden link at {}..{}: {}",
                entry.range.start,
                entry.range.end,
                reason
            ),
        }
    }

    container.prune_empty();
    applied
}

fn leaf_text_mut<'a>(container: &'a mut Node, path: &[usize]) -> Result<&'a mut String, String> {
    match container.node_at_mut(path) {
        Some(Node::Text(text)) => Ok(text),
        Some(Node::Element(_)) => Err(format!("node at {path:?} is no longer a text node")),
        None => Err(format!("no node at {path:?}")),
    }
}

fn apply_one(
    container: &mut Node,
    leaves: &[NodePath],
    entry: &PlannedReplacement,
) -> Result<(), String> {
    let start_path = leaves
        .get(entry.start.leaf)
        .ok_or_else(|| format!("unknown leaf {}", entry.start.leaf))?;
    let end_path = leaves
        .get(entry.end.leaf)
        .ok_or_else(|| format!("unknown leaf {}", entry.end.leaf))?;
    let (parent_path, index) = match start_path.split_last() {
        Some((index, parent)) => (parent, *index),
        None => return Err("container itself is a text node".to_string()),
    };

    // Validate both ends before mutating anything.
    let start_text = leaf_text_mut(container, start_path)?;
    if !start_text.is_char_boundary(entry.start.offset) {
        return Err(format!("offset {} out of range", entry.start.offset));
    }
    let end_text = leaf_text_mut(container, end_path)?;
    if !end_text.is_char_boundary(entry.end.offset) {
        return Err(format!("offset {} out of range", entry.end.offset));
    }

    let mut inserted = vec![Node::Element(entry.replacement.to_element())];

    if entry.start.leaf == entry.end.leaf {
        let text = leaf_text_mut(container, start_path)?;
        if entry.end.offset < entry.start.offset {
            return Err("inverted range".to_string());
        }
        let after = text.split_off(entry.end.offset);
        text.truncate(entry.start.offset);
        inserted.push(Node::Text(after));
    } else {
        // Later leaves first: inserting after the start leaf may shift them.
        let end_text = leaf_text_mut(container, end_path)?;
        end_text.replace_range(..entry.end.offset, "");
        for path in &leaves[entry.start.leaf + 1..entry.end.leaf] {
            leaf_text_mut(container, path)?.clear();
        }
        leaf_text_mut(container, start_path)?.truncate(entry.start.offset);
    }

    let siblings = container
        .children_at_mut(parent_path)
        .ok_or_else(|| format!("no parent element at {parent_path:?}"))?;
    let at = (index + 1).min(siblings.len());
    for (i, node) in inserted.into_iter().enumerate() {
        siblings.insert(at + i, node);
    }
    Ok(())
}

/// Replace every hidden link in `container`. Returns the number of links
/// substituted.
pub fn render_container(container: &mut Node, pattern: &LinkPattern, strategy: Strategy) -> usize {
    let plan = plan(container, pattern, strategy);
    if plan.is_empty() {
        return 0;
    }
    apply(container, &plan)
}

/// The link element at or above `path`, if any. Used by the delegated
/// interaction handler of a static surface.
pub fn link_at<'a>(container: &'a Node, path: &[usize]) -> Option<&'a Element> {
    (0..=path.len())
        .rev()
        .filter_map(|len| container.node_at(&path[..len])?.as_element())
        .find(|e| is_link_element(e))
}
