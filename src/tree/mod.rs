//! Arena-based XML document tree.
//!
//! All nodes live in a `Vec<NodeData>` owned by the `Document` and are
//! addressed by `NodeId`, a newtype over `NonZeroU32`. Parent and sibling
//! links are arena indices, so moving a node only rewrites links: the node's
//! payload and its `NodeId` stay put. The sorting passes rely on this to
//! reorder siblings without cloning anything.

mod node;

pub use node::{Attribute, NodeKind};

pub(crate) use node::qualified_name;

use std::borrow::Cow;
use std::num::NonZeroU32;

use crate::error::{ParseDiagnostic, ParseError};

/// A typed index into the document's node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    /// # Panics
    ///
    /// Panics if `index` is 0 or does not fit in a `u32`.
    #[allow(clippy::expect_used)]
    fn from_index(index: usize) -> Self {
        let raw = u32::try_from(index).expect("node arena exceeds u32::MAX entries");
        Self(NonZeroU32::new(raw).expect("NodeId index must be non-zero"))
    }

    fn as_index(self) -> usize {
        self.0.get() as usize
    }
}

/// Storage for a single node in the arena.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            prev_sibling: None,
        }
    }
}

/// An XML document.
///
/// Navigation goes through `&Document`, mutation through `&mut Document`.
///
/// ```
/// use sortxml::Document;
///
/// let doc = Document::parse_str("<root a=\"1\"/>").unwrap();
/// let root = doc.root_element().unwrap();
/// assert_eq!(doc.node_name(root).as_deref(), Some("root"));
/// assert_eq!(doc.attribute(root, "a"), Some("1"));
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    /// Index 0 is a placeholder so that ids can be non-zero.
    nodes: Vec<NodeData>,
    root: NodeId,
    /// XML version from the declaration; `None` when the input had none.
    pub version: Option<String>,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
    /// Diagnostics recorded while parsing in recovery mode.
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl Document {
    /// Creates an empty document containing only the document node.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(64);
        nodes.push(NodeData::new(NodeKind::Document));
        nodes.push(NodeData::new(NodeKind::Document));
        Self {
            nodes,
            root: NodeId::from_index(1),
            version: None,
            encoding: None,
            standalone: None,
            diagnostics: Vec::new(),
        }
    }

    /// Parses an XML string with default options.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the input is not well-formed XML.
    pub fn parse_str(input: &str) -> Result<Self, ParseError> {
        crate::parser::parse_str(input)
    }

    /// Parses raw bytes, detecting the encoding first.
    ///
    /// # Errors
    ///
    /// Returns `ParseError` if the bytes cannot be decoded or the decoded
    /// text is not well-formed XML.
    pub fn parse_bytes(input: &[u8]) -> Result<Self, ParseError> {
        let text = crate::encoding::decode_to_utf8(input).map_err(|e| ParseError {
            message: e.message,
            location: crate::error::SourceLocation::default(),
            diagnostics: Vec::new(),
        })?;
        crate::parser::parse_str(&text)
    }

    /// Returns the document node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Returns the document element, if there is one.
    #[must_use]
    pub fn root_element(&self) -> Option<NodeId> {
        self.children(self.root).find(|&id| self.is_element(id))
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this document.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.as_index()]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.as_index()]
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.node(id).kind.is_element()
    }

    /// Returns the qualified name of an element or the target of a PI.
    #[must_use]
    pub fn node_name(&self, id: NodeId) -> Option<Cow<'_, str>> {
        match &self.node(id).kind {
            NodeKind::Element { name, prefix, .. } => Some(qualified_name(prefix.as_deref(), name)),
            NodeKind::ProcessingInstruction { target, .. } => Some(Cow::Borrowed(target)),
            _ => None,
        }
    }

    /// Returns the concatenated text of a node and its descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.node(id).kind {
            NodeKind::Text { content } | NodeKind::CData { content } => out.push_str(content),
            _ => {
                for child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
        }
    }

    /// Returns the attribute list of a node.
    ///
    /// Elements always have a list (possibly empty); every other node kind
    /// has none, which is distinct from an empty list.
    #[must_use]
    pub fn attribute_list(&self, id: NodeId) -> Option<&[Attribute]> {
        match &self.node(id).kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Returns the attributes of a node, or an empty slice for non-elements.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[Attribute] {
        self.attribute_list(id).unwrap_or(&[])
    }

    /// Returns mutable access to an element's attribute list.
    pub fn attributes_mut(&mut self, id: NodeId) -> Option<&mut Vec<Attribute>> {
        match &mut self.node_mut(id).kind {
            NodeKind::Element { attributes, .. } => Some(attributes),
            _ => None,
        }
    }

    /// Looks up an attribute value by qualified name.
    #[must_use]
    pub fn attribute(&self, id: NodeId, qname: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|a| a.qualified_name() == qname)
            .map(|a| a.value.as_str())
    }

    // --- Navigation ---

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).first_child
    }

    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).last_child
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).next_sibling
    }

    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).prev_sibling
    }

    /// Returns an iterator over the children of a node.
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            doc: self,
            next: self.node(id).first_child,
        }
    }

    /// Returns an iterator over the element children of a node.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id).filter(move |&c| self.is_element(c))
    }

    // --- Mutation ---

    /// Allocates a detached node in the arena.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let index = self.nodes.len();
        self.nodes.push(NodeData::new(kind));
        NodeId::from_index(index)
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// `child` must be detached.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        debug_assert!(
            self.node(child).parent.is_none(),
            "child already has a parent; detach it first"
        );
        self.node_mut(child).parent = Some(parent);
        match self.node(parent).last_child {
            Some(last) => {
                self.node_mut(last).next_sibling = Some(child);
                self.node_mut(child).prev_sibling = Some(last);
            }
            None => self.node_mut(parent).first_child = Some(child),
        }
        self.node_mut(parent).last_child = Some(child);
    }

    /// Inserts the detached node `new_child` immediately before `reference`.
    ///
    /// Does nothing if `reference` has no parent.
    pub fn insert_before(&mut self, reference: NodeId, new_child: NodeId) {
        debug_assert!(
            self.node(new_child).parent.is_none(),
            "new_child already has a parent; detach it first"
        );
        let Some(parent) = self.node(reference).parent else {
            return;
        };
        self.node_mut(new_child).parent = Some(parent);
        match self.node(reference).prev_sibling {
            Some(prev) => {
                self.node_mut(prev).next_sibling = Some(new_child);
                self.node_mut(new_child).prev_sibling = Some(prev);
            }
            None => self.node_mut(parent).first_child = Some(new_child),
        }
        self.node_mut(new_child).next_sibling = Some(reference);
        self.node_mut(reference).prev_sibling = Some(new_child);
    }

    /// Unlinks a node from its parent. The node and its subtree stay in the
    /// arena and keep their `NodeId`s.
    pub fn detach(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).parent else {
            return;
        };
        let prev = self.node(id).prev_sibling;
        let next = self.node(id).next_sibling;
        match prev {
            Some(p) => self.node_mut(p).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }
        let node = self.node_mut(id);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
    }

    /// Returns the number of allocated nodes, the document node included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len() - 1
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node.
pub struct Children<'a> {
    doc: &'a Document,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.doc.node(current).next_sibling;
        Some(current)
    }
}
