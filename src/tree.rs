//! The parsed tree: an arena of nodes plus a borrowing handle type for
//! ergonomic traversal (§3 Data Model).
//!
//! The teacher represents a parsed document as a `rowan::GreenNode` wrapped
//! in newtypes (`Deb822`, `Paragraph`, `Entry`) that expose `children()` /
//! `parent()` / ancestor iteration over a lossless concrete syntax tree.
//! This crate keeps that newtype-over-handle shape - `Tree` owns the data,
//! `Node<'a>` borrows from it and exposes the same family of iterators - but
//! backs it with a plain arena instead of `rowan`'s green/red tree, because
//! node values here are a genuinely open, host-extensible [`crate::value::Value`]
//! domain rather than rowan's fixed text tokens.

use crate::value::Value;

/// An index into a [`Tree`]'s arena. Stable for the lifetime of the tree;
/// never reused even after [`Tree::detach`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Construct a `NodeId` from a raw arena index. Exposed for tests and
    /// for hosts that persist ids across calls; not meaningful across
    /// different `Tree` instances.
    pub fn from_raw(index: usize) -> Self {
        NodeId(index)
    }

    /// The raw arena index backing this id.
    pub fn raw(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) name: String,
    pub(crate) value: Option<Value>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

/// An arena of parsed nodes, rooted at [`Tree::root`].
///
/// A tree may also hold detached subtrees reachable only via a
/// [`Value::NodeRef`] produced by the `node` built-in type (§6.2); those
/// subtrees have no parent and are not children of the root.
#[derive(Debug, Clone)]
pub struct Tree {
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) root: NodeId,
}

impl Tree {
    /// Construct a tree whose only node is an unnamed root with no value.
    pub(crate) fn with_root(name: impl Into<String>) -> Self {
        let root = NodeData {
            name: name.into(),
            value: None,
            parent: None,
            children: Vec::new(),
        };
        Tree {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    /// Append a new child of `parent`, returning the new node's id.
    pub(crate) fn push_child(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        value: Option<Value>,
    ) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            name: name.into(),
            value,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    /// Append a new detached node (no parent), returning its id. Used for
    /// `node`-typed values, whose nested tree lives in the same arena as the
    /// document that embeds it but is not part of its child structure.
    pub(crate) fn push_detached(&mut self, name: impl Into<String>, value: Option<Value>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            name: name.into(),
            value,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// The root node handle.
    pub fn root(&self) -> Node<'_> {
        self.node(self.root)
    }

    /// Borrow the node at `id` as a handle. Panics if `id` was not produced
    /// by this tree.
    pub fn node(&self, id: NodeId) -> Node<'_> {
        Node { tree: self, id }
    }
}

/// A borrowing handle to one node of a [`Tree`], with traversal methods
/// mirroring the teacher's `rowan::ast::AstNode` ergonomics (`children`,
/// `parent`, ancestor walking) generalized over this crate's arena.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> Node<'a> {
    /// This node's id, stable within its tree.
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// The node's name (the token before `:` or the bare line text).
    pub fn name(&self) -> &'a str {
        &self.tree.nodes[self.id.0].name
    }

    /// The node's typed value, if it has one.
    pub fn value(&self) -> Option<&'a Value> {
        self.tree.nodes[self.id.0].value.as_ref()
    }

    /// Direct children, in source order.
    pub fn children(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let tree = self.tree;
        tree.nodes[self.id.0]
            .children
            .iter()
            .map(move |&id| Node { tree, id })
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.tree.nodes[self.id.0].children.is_empty()
    }

    /// The immediate parent, or `None` at the root or a detached subtree
    /// root.
    pub fn parent(&self) -> Option<Node<'a>> {
        self.tree.nodes[self.id.0]
            .parent
            .map(|id| Node { tree: self.tree, id })
    }

    /// This node followed by every ancestor up to (and including) the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let tree = self.tree;
        let mut next = Some(self.id);
        std::iter::from_fn(move || {
            let id = next?;
            next = tree.nodes[id.0].parent;
            Some(Node { tree, id })
        })
    }

    /// Every descendant in depth-first pre-order, not including this node.
    pub fn descendants(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let tree = self.tree;
        let mut stack: Vec<NodeId> = tree.nodes[self.id.0]
            .children
            .iter()
            .rev()
            .copied()
            .collect();
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            for &child in tree.nodes[id.0].children.iter().rev() {
                stack.push(child);
            }
            Some(Node { tree, id })
        })
    }

    /// Siblings before this node, nearest first.
    pub fn preceding_siblings(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let tree = self.tree;
        let siblings = self.sibling_list();
        let own_index = siblings.iter().position(|&id| id == self.id);
        let preceding: Vec<NodeId> = match own_index {
            Some(i) => siblings[..i].iter().rev().copied().collect(),
            None => Vec::new(),
        };
        preceding.into_iter().map(move |id| Node { tree, id })
    }

    /// Siblings after this node, nearest first.
    pub fn following_siblings(&self) -> impl Iterator<Item = Node<'a>> + 'a {
        let tree = self.tree;
        let siblings = self.sibling_list();
        let own_index = siblings.iter().position(|&id| id == self.id);
        let following: Vec<NodeId> = match own_index {
            Some(i) => siblings[i + 1..].to_vec(),
            None => Vec::new(),
        };
        following.into_iter().map(move |id| Node { tree, id })
    }

    fn sibling_list(&self) -> Vec<NodeId> {
        match self.tree.nodes[self.id.0].parent {
            Some(parent) => self.tree.nodes[parent.0].children.clone(),
            None => vec![self.id],
        }
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Tree {
        let mut tree = Tree::with_root("root");
        let a = tree.push_child(tree.root, "a", None);
        tree.push_child(a, "a1", None);
        tree.push_child(a, "a2", None);
        tree.push_child(tree.root, "b", None);
        tree
    }

    #[test]
    fn children_are_in_source_order() {
        let tree = sample();
        let names: Vec<&str> = tree.root().children().map(|n| n.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn ancestors_walk_to_root_inclusive() {
        let tree = sample();
        let a = tree.root().children().next().unwrap();
        let a1 = a.children().next().unwrap();
        let names: Vec<&str> = a1.ancestors().map(|n| n.name()).collect();
        assert_eq!(names, vec!["a1", "a", "root"]);
    }

    #[test]
    fn descendants_are_preorder() {
        let tree = sample();
        let names: Vec<&str> = tree.root().descendants().map(|n| n.name()).collect();
        assert_eq!(names, vec!["a", "a1", "a2", "b"]);
    }

    #[test]
    fn sibling_iteration_excludes_self() {
        let tree = sample();
        let a = tree.root().children().next().unwrap();
        let a2 = a.children().nth(1).unwrap();
        let preceding: Vec<&str> = a2.preceding_siblings().map(|n| n.name()).collect();
        assert_eq!(preceding, vec!["a1"]);
        assert!(a2.following_siblings().next().is_none());
    }

    #[test]
    fn detached_node_has_no_parent_or_siblings() {
        let mut tree = sample();
        let detached = tree.push_detached("orphan", None);
        let node = tree.node(detached);
        assert!(node.parent().is_none());
        assert!(node.preceding_siblings().next().is_none());
    }
}
