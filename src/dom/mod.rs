/*!
 * Abstract document tree.
 *
 * The components never touch a browser DOM directly. They work against the
 * `DocumentTree` trait, which exposes just what page glue needs: node kind,
 * tag, parent/children, text, attributes and a few mutations. Queries use a
 * small CSS-like `Selector` (tag, `#id`, `.class`, `[attr]`, descendant
 * combinator and comma lists).
 *
 * - `memory`: arena-backed implementation used by the CLI and the tests
 * - `text_nodes`: pluggable extraction of visible text nodes
 */

use parking_lot::Mutex;
use std::sync::Arc;

pub mod memory;
pub mod text_nodes;

pub use self::memory::MemoryDocument;
pub use self::text_nodes::{TextExtractor, VisibleTextExtractor};

/// Index of a node inside a document
pub type NodeId = usize;

/// Document shared between components and their background tasks
pub type SharedDocument<D = MemoryDocument> = Arc<Mutex<D>>;

/// Kind of a document node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    Comment,
}

/// Minimal document interface the page glue is written against
pub trait DocumentTree {
    /// The document element (`<html>`)
    fn root(&self) -> NodeId;

    /// Kind of a node
    fn kind(&self, node: NodeId) -> NodeKind;

    /// Lowercase tag name for elements
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    /// Parent of a node, `None` for the root and detached nodes
    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// Children of a node in document order
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    /// Own text of a text or comment node
    fn node_text(&self, node: NodeId) -> Option<&str>;

    /// Replace the own text of a text or comment node
    fn set_node_text(&mut self, node: NodeId, text: &str);

    /// Attribute value
    fn attr(&self, node: NodeId, name: &str) -> Option<&str>;

    /// Set or replace an attribute
    fn set_attr(&mut self, node: NodeId, name: &str, value: &str);

    /// Create a detached element
    fn create_element(&mut self, tag: &str) -> NodeId;

    /// Create a detached text node
    fn create_text(&mut self, text: &str) -> NodeId;

    /// Append `child` as the last child of `parent`, detaching it first
    fn append_child(&mut self, parent: NodeId, child: NodeId);

    /// Remove a node (and its subtree) from its parent
    fn detach(&mut self, node: NodeId);

    /// First child element of the root with the given tag
    fn root_child(&self, tag: &str) -> Option<NodeId> {
        self.children(self.root())
            .into_iter()
            .find(|&child| self.tag_name(child) == Some(tag))
    }

    /// The `<body>` element
    fn body(&self) -> Option<NodeId> {
        self.root_child("body")
    }

    /// The `<head>` element
    fn head(&self) -> Option<NodeId> {
        self.root_child("head")
    }

    /// Whether the node is reachable from the root
    fn is_attached(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.root() {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// Concatenated text of a node and all its descendants
    fn text_content(&self, node: NodeId) -> String {
        match self.kind(node) {
            NodeKind::Text => self.node_text(node).unwrap_or_default().to_string(),
            NodeKind::Comment => String::new(),
            NodeKind::Element => self
                .children(node)
                .into_iter()
                .map(|child| self.text_content(child))
                .collect(),
        }
    }

    /// Replace a node's content with a single text node
    fn set_text_content(&mut self, node: NodeId, text: &str) {
        if self.kind(node) != NodeKind::Element {
            self.set_node_text(node, text);
            return;
        }
        for child in self.children(node) {
            self.detach(child);
        }
        let text_node = self.create_text(text);
        self.append_child(node, text_node);
    }

    /// Classes of an element
    fn classes(&self, node: NodeId) -> Vec<String> {
        self.attr(node, "class")
            .map(|value| value.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Whether an element carries a class
    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attr(node, "class")
            .is_some_and(|value| value.split_whitespace().any(|c| c == class))
    }

    /// Add a class if missing
    fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        let mut classes = self.classes(node);
        classes.push(class.to_string());
        self.set_attr(node, "class", &classes.join(" "));
    }

    /// Remove a class if present
    fn remove_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            return;
        }
        let classes: Vec<String> = self
            .classes(node)
            .into_iter()
            .filter(|c| c != class)
            .collect();
        self.set_attr(node, "class", &classes.join(" "));
    }

    /// Descendants of a node in document order, excluding the node itself
    fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).into_iter().rev().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).into_iter().rev());
        }
        out
    }

    /// Elements under `scope` matching the selector, in document order
    fn query_all_within(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&id| selector.matches(self, id))
            .collect()
    }

    /// Elements in the document matching the selector
    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        let root = self.root();
        let mut out = Vec::new();
        if selector.matches(self, root) {
            out.push(root);
        }
        out.extend(self.query_all_within(root, selector));
        out
    }

    /// First element in the document matching the selector
    fn query(&self, selector: &Selector) -> Option<NodeId> {
        self.query_all(selector).into_iter().next()
    }

    /// First element under `scope` matching the selector
    fn query_within(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&id| selector.matches(self, id))
    }

    /// The node itself or its nearest ancestor matching the selector
    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(id) = current {
            if selector.matches(self, id) {
                return Some(id);
            }
            current = self.parent(id);
        }
        None
    }
}

/// One compound selector such as `input.form-control[placeholder]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<String>,
}

impl Compound {
    fn parse(token: &str) -> Self {
        let mut compound = Compound::default();
        let mut rest = token;

        let tag_end = rest.find(['#', '.', '[']).unwrap_or(rest.len());
        if tag_end > 0 && &rest[..tag_end] != "*" {
            compound.tag = Some(rest[..tag_end].to_ascii_lowercase());
        }
        rest = &rest[tag_end..];

        while let Some(marker) = rest.chars().next() {
            let body = &rest[1..];
            match marker {
                '[' => {
                    let end = body.find(']').unwrap_or(body.len());
                    compound.attrs.push(body[..end].trim().to_string());
                    rest = body.get(end + 1..).unwrap_or("");
                }
                _ => {
                    let end = body.find(['#', '.', '[']).unwrap_or(body.len());
                    let name = body[..end].to_string();
                    if marker == '#' {
                        compound.id = Some(name);
                    } else {
                        compound.classes.push(name);
                    }
                    rest = &body[end..];
                }
            }
        }

        compound
    }

    fn matches<D: DocumentTree + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        if doc.kind(node) != NodeKind::Element {
            return false;
        }
        if let Some(tag) = &self.tag {
            if doc.tag_name(node) != Some(tag.as_str()) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if doc.attr(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|class| doc.has_class(node, class))
            && self.attrs.iter().all(|attr| doc.attr(node, attr).is_some())
    }
}

/// CSS-like selector supporting compound selectors, the descendant
/// combinator and comma separated alternatives
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Vec<Compound>>,
}

impl Selector {
    /// Parse a selector such as `.navbar .nav-link, input[placeholder]`
    pub fn parse(selector: &str) -> Self {
        let alternatives = selector
            .split(',')
            .map(|alt| alt.split_whitespace().map(Compound::parse).collect::<Vec<_>>())
            .filter(|chain| !chain.is_empty())
            .collect();
        Self { alternatives }
    }

    /// Whether the node matches any alternative
    pub fn matches<D: DocumentTree + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        self.alternatives
            .iter()
            .any(|chain| chain_matches(doc, node, chain))
    }
}

fn chain_matches<D: DocumentTree + ?Sized>(doc: &D, node: NodeId, chain: &[Compound]) -> bool {
    let Some((last, ancestors)) = chain.split_last() else {
        return false;
    };
    if !last.matches(doc, node) {
        return false;
    }

    let mut remaining = ancestors;
    let mut current = doc.parent(node);
    while let Some((wanted, rest)) = remaining.split_last() {
        let Some(id) = current else {
            return false;
        };
        if wanted.matches(doc, id) {
            remaining = rest;
        }
        current = doc.parent(id);
    }
    true
}
