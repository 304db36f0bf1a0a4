//! Read-only arena trees.
//!
//! Nodes are stored in pre-order. Besides kind, span and label, every node
//! carries the data the matcher asks for over and over:
//! - `size`: node count of the subtree (descendants are `id+1 .. id+size`)
//! - `height`: 1 for leaves, 1 + tallest child otherwise
//! - `hash`: structural hash of kind, label and child hashes
//!
//! Children of a node are stored contiguously in a side table.

use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use smallvec::SmallVec;

use crate::kind::NodeKind;
use crate::label::Labeler;
use crate::node_id::NodeId;
use crate::span::Span;
use crate::stack::ensure_sufficient_stack;
use crate::syntax::SyntaxNode;

#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    span: Span,
    label: Option<Box<str>>,
    parent: Option<NodeId>,
    /// Start of this node's children in `Tree::child_ids`.
    children_start: u32,
    children_len: u32,
    size: u32,
    height: u32,
    hash: u64,
}

/// One script version as a labeled arena tree.
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    child_ids: Vec<NodeId>,
}

impl Tree {
    /// Build a tree, labeling nodes with `labeler`.
    pub fn build(root: &SyntaxNode, labeler: &Labeler<'_>) -> Tree {
        Tree::build_with(root, |node| labeler.label(node))
    }

    /// Build a tree with a custom labeling function.
    pub fn build_with(
        root: &SyntaxNode,
        mut label: impl FnMut(&SyntaxNode) -> Option<String>,
    ) -> Tree {
        let count = root.count();
        let mut tree = Tree {
            nodes: Vec::with_capacity(count),
            child_ids: Vec::with_capacity(count.saturating_sub(1)),
        };
        tree.push(root, None, &mut label);
        tracing::trace!(nodes = tree.len(), "built tree");
        tree
    }

    fn push(
        &mut self,
        syntax: &SyntaxNode,
        parent: Option<NodeId>,
        label: &mut impl FnMut(&SyntaxNode) -> Option<String>,
    ) -> NodeId {
        ensure_sufficient_stack(|| {
            let id = NodeId::new(self.nodes.len() as u32);
            let label_text = label(syntax).map(String::into_boxed_str);
            self.nodes.push(Node {
                kind: syntax.kind,
                span: syntax.span,
                label: label_text,
                parent,
                children_start: 0,
                children_len: 0,
                size: 1,
                height: 1,
                hash: 0,
            });

            let mut children: SmallVec<[NodeId; 4]> = SmallVec::new();
            for child in &syntax.children {
                children.push(self.push(child, Some(id), &mut *label));
            }

            let children_start = self.child_ids.len() as u32;
            self.child_ids.extend_from_slice(&children);

            let mut hasher = FxHasher::default();
            syntax.kind.hash(&mut hasher);
            self.nodes[id.index()].label.hash(&mut hasher);
            children.len().hash(&mut hasher);
            let mut height = 0;
            for child in &children {
                let child = &self.nodes[child.index()];
                child.hash.hash(&mut hasher);
                height = height.max(child.height);
            }

            let size = self.nodes.len() as u32 - id.raw();
            let node = &mut self.nodes[id.index()];
            node.children_start = children_start;
            node.children_len = children.len() as u32;
            node.size = size;
            node.height = height + 1;
            node.hash = hasher.finish();
            id
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    #[inline]
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    #[inline]
    pub fn span(&self, id: NodeId) -> Span {
        self.node(id).span
    }

    #[inline]
    pub fn label(&self, id: NodeId) -> Option<&str> {
        self.node(id).label.as_deref()
    }

    #[inline]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    #[inline]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        let node = self.node(id);
        let start = node.children_start as usize;
        &self.child_ids[start..start + node.children_len as usize]
    }

    #[inline]
    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).children_len == 0
    }

    /// Node count of the subtree rooted at `id`.
    #[inline]
    pub fn size(&self, id: NodeId) -> u32 {
        self.node(id).size
    }

    /// Number of strict descendants.
    #[inline]
    pub fn descendant_count(&self, id: NodeId) -> u32 {
        self.node(id).size - 1
    }

    #[inline]
    pub fn height(&self, id: NodeId) -> u32 {
        self.node(id).height
    }

    #[inline]
    pub fn hash(&self, id: NodeId) -> u64 {
        self.node(id).hash
    }

    /// All nodes in pre-order (creation order).
    pub fn pre_order(&self) -> impl DoubleEndedIterator<Item = NodeId> + ExactSizeIterator {
        (0..self.nodes.len() as u32).map(NodeId::new)
    }

    /// Strict descendants of `id`, in pre-order.
    pub fn descendants(&self, id: NodeId) -> impl DoubleEndedIterator<Item = NodeId> + ExactSizeIterator {
        (id.raw() + 1..id.raw() + self.size(id)).map(NodeId::new)
    }

    /// Whether `node` lies strictly inside the subtree of `ancestor`.
    #[inline]
    pub fn is_descendant(&self, ancestor: NodeId, node: NodeId) -> bool {
        ancestor < node && node.raw() < ancestor.raw() + self.size(ancestor)
    }

    /// Strict ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |&p| self.parent(p))
    }

    /// All nodes in post-order (children before parents).
    pub fn post_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        if self.nodes.is_empty() {
            return order;
        }
        // (node, next child index)
        let mut stack: Vec<(NodeId, usize)> = vec![(self.root(), 0)];
        while let Some((id, next)) = stack.last_mut() {
            let children = self.children(*id);
            if let Some(&child) = children.get(*next) {
                *next += 1;
                stack.push((child, 0));
            } else {
                order.push(*id);
                stack.pop();
            }
        }
        order
    }

    /// Index of `id` among its parent's children (0 for the root).
    pub fn position_in_parent(&self, id: NodeId) -> usize {
        self.parent(id).map_or(0, |parent| {
            self.children(parent)
                .iter()
                .position(|&c| c == id)
                .unwrap_or(0)
        })
    }

    /// Number of children of `id`'s parent (1 for the root).
    pub fn sibling_count(&self, id: NodeId) -> usize {
        self.parent(id)
            .map_or(1, |parent| self.children(parent).len())
    }

    /// Whether the subtree at `a` in `self` and the subtree at `b` in
    /// `other` have the same shape, kinds and labels.
    pub fn isomorphic(&self, a: NodeId, other: &Tree, b: NodeId) -> bool {
        if self.hash(a) != other.hash(b) || self.size(a) != other.size(b) {
            return false;
        }
        // same pre-order sequence of (kind, label, child count) fixes the shape
        (0..self.size(a)).all(|offset| {
            let x = self.node(NodeId::new(a.raw() + offset));
            let y = other.node(NodeId::new(b.raw() + offset));
            x.kind == y.kind && x.label == y.label && x.children_len == y.children_len
        })
    }
}
