//! Read-only rendered content tree.
//!
//! The static rendering surface hands over a container of already rendered
//! content (paragraphs, emphasis, code spans, ...). The tree here is the
//! minimal shape needed to find text, splice in link elements and print the
//! result: elements with a tag, classes, attributes and children, and text
//! leaves.
//!
//! Nodes are addressed by a path of child indices from the container.

use std::fmt::Write as _;

/// A node in the rendered content tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Element(Element),
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    pub tag: String,
    pub classes: Vec<String>,
    /// Attributes in insertion order
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

/// Path of child indices from a container to a node.
pub type NodePath = Vec<usize>;

/// One step of a text walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSegment<'a> {
    Leaf(NodePath, &'a str),
    /// Boundary that no text run continues across
    Break,
}

const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tbody", "td",
    "tfoot", "th", "thead", "tr", "ul",
];

fn push_break(segments: &mut Vec<TextSegment<'_>>) {
    if !matches!(segments.last(), Some(TextSegment::Break)) {
        segments.push(TextSegment::Break);
    }
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_child(Node::Text(text.into()))
    }

    /// True for elements that start a new line of text.
    pub fn is_block(&self) -> bool {
        BLOCK_TAGS.contains(&self.tag.to_ascii_lowercase().as_str())
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    /// Concatenated text of every leaf below this node, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => e.children.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// Resolve a path to a node.
    pub fn node_at(&self, path: &[usize]) -> Option<&Node> {
        path.iter().try_fold(self, |node, &index| match node {
            Node::Element(e) => e.children.get(index),
            Node::Text(_) => None,
        })
    }

    /// Resolve a path to a mutable node.
    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        let mut node = self;
        for &index in path {
            node = match node {
                Node::Element(e) => e.children.get_mut(index)?,
                Node::Text(_) => return None,
            };
        }
        Some(node)
    }

    /// Children of the element at `path`.
    pub fn children_at_mut(&mut self, path: &[usize]) -> Option<&mut Vec<Node>> {
        match self.node_at_mut(path)? {
            Node::Element(e) => Some(&mut e.children),
            Node::Text(_) => None,
        }
    }

    /// Text leaves in document order, with a [`TextSegment::Break`] wherever
    /// text on either side must not be read as one line: at the edges of
    /// block elements below this node, and in place of every subtree that
    /// `opaque` accepts. Opaque subtrees are not descended into. Consecutive
    /// breaks collapse into one.
    pub fn text_segments(&self, opaque: &dyn Fn(&Element) -> bool) -> Vec<TextSegment<'_>> {
        let mut segments = Vec::new();
        let mut path = Vec::new();
        match self {
            // The container's own edges are not boundaries inside it
            Node::Element(e) => {
                for (i, child) in e.children.iter().enumerate() {
                    path.push(i);
                    child.walk_text(&mut path, opaque, &mut segments);
                    path.pop();
                }
            }
            Node::Text(_) => self.walk_text(&mut path, opaque, &mut segments),
        }
        segments
    }

    fn walk_text<'a>(
        &'a self,
        path: &mut NodePath,
        opaque: &dyn Fn(&Element) -> bool,
        segments: &mut Vec<TextSegment<'a>>,
    ) {
        match self {
            Node::Text(t) => segments.push(TextSegment::Leaf(path.clone(), t.as_str())),
            Node::Element(e) if opaque(e) => push_break(segments),
            Node::Element(e) => {
                let block = e.is_block();
                if block {
                    push_break(segments);
                }
                for (i, child) in e.children.iter().enumerate() {
                    path.push(i);
                    child.walk_text(path, opaque, segments);
                    path.pop();
                }
                if block {
                    push_break(segments);
                }
            }
        }
    }

    /// Remove empty text leaves, and elements left without children once
    /// theirs are removed. Elements that had no children to begin with
    /// (`<br>`, an empty cell) are kept.
    pub fn prune_empty(&mut self) {
        let Node::Element(e) = self else {
            return;
        };
        e.children.retain_mut(|child| {
            let had_children = matches!(child, Node::Element(inner) if !inner.children.is_empty());
            child.prune_empty();
            match child {
                Node::Text(t) => !t.is_empty(),
                Node::Element(inner) => !(had_children && inner.children.is_empty()),
            }
        });
    }

    /// Serialize as HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(t) => out.push_str(&escape_html(t)),
            Node::Element(e) => {
                let _ = write!(out, "<{}", e.tag);
                if !e.classes.is_empty() {
                    let _ = write!(out, " class=\"{}\"", escape_html(&e.classes.join(" ")));
                }
                for (name, value) in &e.attributes {
                    let _ = write!(out, " {}=\"{}\"", name, escape_html(value));
                }
                out.push('>');
                e.children.iter().for_each(|c| c.write_html(out));
                let _ = write!(out, "</{}>", e.tag);
            }
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
