//! Arena-backed document tree storage.
//!
//! Nodes live in a single `Vec` owned by the [`Tree`]; structural links are
//! [`NodeId`] indices rather than references, so navigation is O(1) in every
//! direction without ownership cycles. The tree is built by a grammar engine
//! through [`Tree::add_node`] and [`Tree::append_child`] and is read-only
//! afterwards; dropping the `Tree` releases every node and payload at once.

use crate::iter::TreeIter;
use crate::node::{Kind, NodeValue};
use crate::types::Span;

/// Handle to a node stored in a [`Tree`].
///
/// Ids are only meaningful for the tree that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    /// Position of the node in its tree's arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single element of the document tree.
#[derive(Debug, PartialEq)]
pub struct Node {
    /// Kind plus per-kind payload
    pub value: NodeValue,
    /// Source location covered by this node
    pub span: Span,
    parent: Option<NodeId>,
    first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
}

impl Node {
    /// The node's kind, derived from its payload.
    pub fn kind(&self) -> Kind {
        self.value.kind()
    }

    /// Parent node, `None` for the document root.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// First child, `None` for leaves.
    pub fn first_child(&self) -> Option<NodeId> {
        self.first_child
    }

    /// Last child, `None` for leaves.
    pub fn last_child(&self) -> Option<NodeId> {
        self.last_child
    }

    /// Previous sibling, `None` for a first sibling.
    pub fn prev_sibling(&self) -> Option<NodeId> {
        self.prev_sibling
    }

    /// Next sibling, `None` for a last sibling.
    pub fn next_sibling(&self) -> Option<NodeId> {
        self.next_sibling
    }
}

/// An owned document tree.
///
/// The root always has kind [`Kind::Document`], no parent, and no siblings.
#[derive(Debug, PartialEq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// Create a tree holding only a document root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                value: NodeValue::Document,
                span: Span::default(),
                parent: None,
                first_child: None,
                last_child: None,
                prev_sibling: None,
                next_sibling: None,
            }],
        }
    }

    /// The document root.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Look up a node. Returns `None` for an id this tree never issued.
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    /// Mutable lookup, for grammar engines filling in payloads and spans.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    /// The kind of a node, `None` if the id is not part of this tree.
    pub fn kind(&self, id: NodeId) -> Option<Kind> {
        self.get(id).map(Node::kind)
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree is never empty; it always holds at least the root.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Create a detached node. It becomes part of the document once
    /// [`Tree::append_child`] links it in.
    pub fn add_node(&mut self, value: NodeValue, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            value,
            span,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        });
        id
    }

    /// Link `child` as the last child of `parent`.
    ///
    /// Keeps sibling links consistent in both directions. `child` must be
    /// detached; out-of-range ids are ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent.index() >= self.nodes.len() || child.index() >= self.nodes.len() {
            return;
        }
        let prev = self.nodes[parent.index()].last_child;
        {
            let c = &mut self.nodes[child.index()];
            c.parent = Some(parent);
            c.prev_sibling = prev;
            c.next_sibling = None;
        }
        if let Some(prev) = prev {
            self.nodes[prev.index()].next_sibling = Some(child);
        } else {
            self.nodes[parent.index()].first_child = Some(child);
        }
        self.nodes[parent.index()].last_child = Some(child);
    }

    /// Preorder Enter/Exit iterator over the whole tree.
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter::new(self)
    }

    /// The kinds of all Enter events in preorder. Handy for assertions.
    pub fn kind_sequence(&self) -> Vec<Kind> {
        self.iter()
            .filter(|(event, _)| *event == crate::iter::IterEvent::Enter)
            .filter_map(|(_, id)| self.kind(id))
            .collect()
    }
}

impl std::ops::Index<NodeId> for Tree {
    type Output = Node;

    fn index(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }
}
