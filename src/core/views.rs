//! Lazy traversal views over a built tree.
//!
//! The views borrow the tree's node storage and yield [`NodeRef`] handles in
//! depth-first pre-order, visiting children in orthant-index order. Order is
//! a function of tree shape alone, so two walks over the same tree always
//! agree; a fresh view restarts from the root.

use crate::core::collections::StorageMap;
use crate::core::node::{Node, NodeKey};
use crate::core::vertex::VertexKey;
use crate::geometry::bounding_box::BoundingBox;
use crate::geometry::traits::coordinate::CoordinateScalar;

/// Borrowed handle to one node, carrying the depth at which the walk found
/// it.
#[derive(Clone, Copy, Debug)]
pub struct NodeRef<'t, T, const D: usize>
where
    T: CoordinateScalar,
{
    key: NodeKey,
    depth: usize,
    node: &'t Node<T, D>,
}

impl<'t, T, const D: usize> NodeRef<'t, T, D>
where
    T: CoordinateScalar,
{
    pub(crate) const fn new(key: NodeKey, depth: usize, node: &'t Node<T, D>) -> Self {
        Self { key, depth, node }
    }

    /// Storage key of this node.
    #[must_use]
    pub const fn key(&self) -> NodeKey {
        self.key
    }

    /// Depth below the root (root is 0).
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// The node's box.
    #[must_use]
    pub const fn bounds(&self) -> &'t BoundingBox<T, D> {
        self.node.bounds()
    }

    /// Whether this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.node.is_leaf()
    }

    /// Vertex keys stored here; empty for interior nodes.
    #[must_use]
    pub fn vertex_keys(&self) -> &'t [VertexKey] {
        self.node.vertex_keys()
    }

    /// Number of vertices stored here.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.node.vertex_count()
    }

    /// Child keys; empty for leaves.
    #[must_use]
    pub fn child_keys(&self) -> &'t [NodeKey] {
        self.node.child_keys()
    }
}

/// Depth-first pre-order walk, optionally pruned below a level.
///
/// Children are pushed in reverse so that orthant 0 pops first; a node at
/// the pruning level is yielded but its children are not expanded.
#[derive(Clone, Debug)]
pub(crate) struct Walk<'t, T, const D: usize>
where
    T: CoordinateScalar,
{
    nodes: &'t StorageMap<NodeKey, Node<T, D>>,
    stack: Vec<(NodeKey, usize)>,
    max_level: Option<usize>,
}

impl<'t, T, const D: usize> Walk<'t, T, D>
where
    T: CoordinateScalar,
{
    pub(crate) fn new(nodes: &'t StorageMap<NodeKey, Node<T, D>>, root: Option<NodeKey>) -> Self {
        Self {
            nodes,
            stack: root.map(|key| (key, 0)).into_iter().collect(),
            max_level: None,
        }
    }

    pub(crate) fn with_max_level(
        nodes: &'t StorageMap<NodeKey, Node<T, D>>,
        root: Option<NodeKey>,
        max_level: usize,
    ) -> Self {
        let mut walk = Self::new(nodes, root);
        walk.max_level = Some(max_level);
        walk
    }
}

impl<'t, T, const D: usize> Iterator for Walk<'t, T, D>
where
    T: CoordinateScalar,
{
    type Item = NodeRef<'t, T, D>;

    fn next(&mut self) -> Option<Self::Item> {
        let (key, depth) = self.stack.pop()?;
        let node = self.nodes.get(key)?;
        if self.max_level.is_none_or(|cap| depth < cap) {
            for &child in node.child_keys().iter().rev() {
                self.stack.push((child, depth + 1));
            }
        }
        Some(NodeRef::new(key, depth, node))
    }
}

/// Iterator over the leaves of a tree in pre-order.
///
/// Lazy and finite; obtain a fresh one from the tree to restart.
#[derive(Clone, Debug)]
pub struct LeafView<'t, T, const D: usize>
where
    T: CoordinateScalar,
{
    walk: Walk<'t, T, D>,
}

impl<'t, T, const D: usize> LeafView<'t, T, D>
where
    T: CoordinateScalar,
{
    pub(crate) fn new(nodes: &'t StorageMap<NodeKey, Node<T, D>>, root: Option<NodeKey>) -> Self {
        Self {
            walk: Walk::new(nodes, root),
        }
    }
}

impl<'t, T, const D: usize> Iterator for LeafView<'t, T, D>
where
    T: CoordinateScalar,
{
    type Item = NodeRef<'t, T, D>;

    fn next(&mut self) -> Option<Self::Item> {
        self.walk.by_ref().find(|node| node.is_leaf())
    }
}

/// Iterator over the nodes at one depth, in pre-order.
///
/// A level deeper than the tree yields nothing. The underlying walk never
/// expands nodes below the requested level.
#[derive(Clone, Debug)]
pub struct LevelView<'t, T, const D: usize>
where
    T: CoordinateScalar,
{
    walk: Walk<'t, T, D>,
    level: usize,
}

impl<'t, T, const D: usize> LevelView<'t, T, D>
where
    T: CoordinateScalar,
{
    pub(crate) fn new(
        nodes: &'t StorageMap<NodeKey, Node<T, D>>,
        root: Option<NodeKey>,
        level: usize,
    ) -> Self {
        Self {
            walk: Walk::with_max_level(nodes, root, level),
            level,
        }
    }
}

impl<'t, T, const D: usize> Iterator for LevelView<'t, T, D>
where
    T: CoordinateScalar,
{
    type Item = NodeRef<'t, T, D>;

    fn next(&mut self) -> Option<Self::Item> {
        let level = self.level;
        self.walk.by_ref().find(|node| node.depth() == level)
    }
}
