//! Stateful, non-recursive preorder traversal.
//!
//! Every node, leaves included, is visited exactly twice: once with
//! [`IterEvent::Enter`] and once with [`IterEvent::Exit`]. For a leaf the
//! two events are adjacent; for a container every descendant event falls
//! strictly between its Enter and its Exit. Traversal state is a single
//! (event, node) cursor, so depth of nesting never touches the call stack.

use crate::tree::{NodeId, Tree};

/// Traversal event attached to each yielded node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IterEvent {
    /// Yielded before a node's children
    Enter,
    /// Yielded after a node's children
    Exit,
}

/// Preorder cursor over a [`Tree`].
///
/// Exhaustion is terminal: once `next()` returns `None` it keeps
/// returning `None`.
#[derive(Debug)]
pub struct TreeIter<'a> {
    tree: &'a Tree,
    upcoming: Option<(IterEvent, NodeId)>,
    current: Option<(IterEvent, NodeId)>,
}

impl<'a> TreeIter<'a> {
    /// Start a traversal at the tree's root.
    pub fn new(tree: &'a Tree) -> Self {
        Self {
            tree,
            upcoming: Some((IterEvent::Enter, tree.root())),
            current: None,
        }
    }

    /// The last yielded event and node.
    ///
    /// `None` before the first `next()` call and after exhaustion the value
    /// stays at the final event.
    pub fn current(&self) -> Option<(IterEvent, NodeId)> {
        self.current
    }
}

impl Iterator for TreeIter<'_> {
    type Item = (IterEvent, NodeId);

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.upcoming.take()?;
        self.current = Some(item);
        self.upcoming = advance(self.tree, item);
        Some(item)
    }
}

/// Cursor advance rules: Enter descends into the first child or flips to
/// Exit on a leaf; Exit moves to the next sibling's Enter or the parent's
/// Exit. The root's Exit has no successor.
fn advance(tree: &Tree, (event, id): (IterEvent, NodeId)) -> Option<(IterEvent, NodeId)> {
    let node = tree.get(id)?;
    match event {
        IterEvent::Enter => match node.first_child() {
            Some(child) => Some((IterEvent::Enter, child)),
            None => Some((IterEvent::Exit, id)),
        },
        IterEvent::Exit => match node.next_sibling() {
            Some(sibling) => Some((IterEvent::Enter, sibling)),
            None => node.parent().map(|parent| (IterEvent::Exit, parent)),
        },
    }
}
