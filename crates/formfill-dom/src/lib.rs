//! # formfill-dom
//!
//! A small arena-backed element tree with the operations the formfill
//! engine needs from a document: attribute get/set/has/remove, text
//! content access, parent/child navigation, tree-order traversal and a
//! compound attribute selector (`input[type='radio'][name]`).
//!
//! This is deliberately not a general-purpose DOM. Nodes are either
//! elements or text, the arena owns every node for the lifetime of the
//! document, and handles (`NodeId`) are plain copyable indices.

mod parser;
mod selector;

pub use parser::ParseError;
pub use selector::{Selector, SelectorError};

// ============================================================================
// Core Types
// ============================================================================

/// Copyable handle into the document arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Element {
        tag: String,
        /// Attributes in document order. Names are stored lowercase.
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    data: NodeData,
}

/// Owns every node. Detached or removed nodes stay allocated until the
/// document is dropped; handles never dangle.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document with a synthetic root element.
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element {
                tag: "#document".to_string(),
                attrs: Vec::new(),
            },
        };

        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Parse an HTML fragment into a document.
    ///
    /// Supports the subset the engine's fixtures need: elements with
    /// quoted/unquoted attributes, void elements, comments, a doctype
    /// and the basic named character entities.
    pub fn parse(html: &str) -> Result<Self, ParseError> {
        parser::parse(html)
    }

    /// The synthetic root element.
    pub fn root(&self) -> NodeId {
        self.root
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    // ========================================================================
    // Construction and structure
    // ========================================================================

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeData::Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        })
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::Text(text.to_string()))
    }

    /// Append `child` as the last child of `parent`, detaching it from
    /// any previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);
        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
    }

    /// Insert `node` as the next sibling of `reference`.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };

        self.detach(node);
        self.node_mut(node).parent = Some(parent);

        let siblings = &mut self.node_mut(parent).children;
        let at = siblings
            .iter()
            .position(|&id| id == reference)
            .map(|i| i + 1)
            .unwrap_or(siblings.len());
        siblings.insert(at, node);
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.node(node).parent {
            self.node_mut(parent).children.retain(|&id| id != node);
            self.node_mut(node).parent = None;
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    pub fn first_element_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .find(|&id| self.is_element(id))
    }

    // ========================================================================
    // Element access
    // ========================================================================

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.node(node).data, NodeData::Element { .. })
    }

    /// Tag name of an element (lowercase), or `None` for text nodes.
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.node(node).data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        match &self.node(node).data {
            NodeData::Element { attrs, .. } => attrs
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str()),
            NodeData::Text(_) => None,
        }
    }

    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    /// Set an attribute, replacing any existing value.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();

        if let NodeData::Element { attrs, .. } = &mut self.node_mut(node).data {
            match attrs.iter_mut().find(|(key, _)| *key == name) {
                Some((_, existing)) => *existing = value.to_string(),
                None => attrs.push((name, value.to_string())),
            }
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        if let NodeData::Element { attrs, .. } = &mut self.node_mut(node).data {
            attrs.retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        }
    }

    // ========================================================================
    // Text content
    // ========================================================================

    /// Concatenated text of the node and all its descendants. For a
    /// text node this is its own content.
    pub fn text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.node(node).data {
            NodeData::Text(text) => out.push_str(text),
            NodeData::Element { .. } => {
                for &child in self.children(node) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Replace the node's children with a single text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        let children = std::mem::take(&mut self.node_mut(node).children);
        for child in children {
            self.node_mut(child).parent = None;
        }

        let text_node = self.create_text(text);
        self.append_child(node, text_node);
    }

    // ========================================================================
    // Traversal and queries
    // ========================================================================

    /// All descendants of `node` in tree (document) order, excluding
    /// `node` itself.
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(node).to_vec();
        stack.reverse();

        Descendants {
            document: self,
            stack,
        }
    }

    /// Descendant elements of `from` matching the selector, in tree order.
    pub fn select(&self, from: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(from)
            .filter(|&id| selector.matches(self, id))
            .collect()
    }

    /// First descendant element of `from` matching the selector.
    pub fn select_first(&self, from: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(from)
            .find(|&id| selector.matches(self, id))
    }
}

/// Tree-order iterator over a subtree, see [`Document::descendants`].
pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = self.stack.pop()?;

        for &child in self.document.children(next).iter().rev() {
            self.stack.push(child);
        }

        Some(next)
    }
}
