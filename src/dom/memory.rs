/*!
 * Arena-backed in-memory document.
 *
 * Nodes live in a vector and refer to each other by index. Detached nodes stay
 * in the arena; they are simply unreachable from the root.
 */

use parking_lot::Mutex;
use std::sync::Arc;

use super::{DocumentTree, NodeId, NodeKind, SharedDocument};
use crate::render::html::escape_html;

/// Storage for one node of the arena
#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    tag: Option<String>,
    text: String,
    attrs: Vec<(String, String)>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element,
            tag: Some(tag.to_ascii_lowercase()),
            text: String::new(),
            attrs: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    fn leaf(kind: NodeKind, text: &str) -> Self {
        Self {
            kind,
            tag: None,
            text: text.to_string(),
            attrs: Vec::new(),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Arena-backed document. Detached nodes stay in the arena but are
/// unreachable from the root.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    nodes: Vec<NodeData>,
    root: NodeId,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

/// Elements serialized without a closing tag
const VOID_ELEMENTS: [&str; 6] = ["img", "input", "br", "hr", "meta", "link"];

impl MemoryDocument {
    /// Create `<html><head></head><body></body></html>`
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![NodeData::element("html")],
            root: 0,
        };
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.append_child(0, head);
        doc.append_child(0, body);
        doc
    }

    /// Append a new element with attributes under `parent`
    pub fn element(&mut self, parent: NodeId, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let id = self.create_element(tag);
        for (name, value) in attrs {
            self.set_attr(id, name, value);
        }
        self.append_child(parent, id);
        id
    }

    /// Append a new text node under `parent`
    pub fn text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.create_text(text);
        self.append_child(parent, id);
        id
    }

    /// Append a new comment node under `parent`
    pub fn comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(NodeData::leaf(NodeKind::Comment, text));
        self.append_child(parent, id);
        id
    }

    /// Wrap the document for sharing with components
    pub fn into_shared(self) -> SharedDocument<Self> {
        Arc::new(Mutex::new(self))
    }

    /// Serialize a subtree to HTML
    pub fn to_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let data = &self.nodes[node];
        match data.kind {
            NodeKind::Text => out.push_str(&escape_html(&data.text)),
            NodeKind::Comment => {
                out.push_str("<!--");
                out.push_str(&data.text);
                out.push_str("-->");
            }
            NodeKind::Element => {
                let tag = data.tag.as_deref().unwrap_or("div");
                out.push('<');
                out.push_str(tag);
                for (name, value) in &data.attrs {
                    out.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&tag) {
                    return;
                }
                for &child in &data.children {
                    self.write_html(child, out);
                }
                out.push_str(&format!("</{}>", tag));
            }
        }
    }
}

impl DocumentTree for MemoryDocument {
    fn root(&self) -> NodeId {
        self.root
    }

    fn kind(&self, node: NodeId) -> NodeKind {
        self.nodes[node].kind
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.nodes[node].tag.as_deref()
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node].parent
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes[node].children.clone()
    }

    fn node_text(&self, node: NodeId) -> Option<&str> {
        match self.nodes[node].kind {
            NodeKind::Element => None,
            _ => Some(self.nodes[node].text.as_str()),
        }
    }

    fn set_node_text(&mut self, node: NodeId, text: &str) {
        if self.nodes[node].kind != NodeKind::Element {
            self.nodes[node].text = text.to_string();
        }
    }

    fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes[node]
            .attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let attrs = &mut self.nodes[node].attrs;
        match attrs.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => attrs.push((name.to_string(), value.to_string())),
        }
    }

    fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(NodeData::element(tag));
        self.nodes.len() - 1
    }

    fn create_text(&mut self, text: &str) -> NodeId {
        self.nodes.push(NodeData::leaf(NodeKind::Text, text));
        self.nodes.len() - 1
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node].parent.take() {
            self.nodes[parent].children.retain(|&c| c != node);
        }
    }
}
