//! Tree nodes and the recursive partitioning that builds them.
//!
//! Nodes live in a slotmap and reference each other by [`NodeKey`], so the
//! tree is an arena of typed keys rather than a pointer structure. A node is
//! either interior (exactly `2^D` children, one per orthant of its box) or a
//! leaf holding vertex keys; there is no third state.
//!
//! The split scheme bisects every axis at the box center. A vertex goes to
//! the child whose bit pattern has bit `axis` set iff `coord >= center`,
//! making the low half of each axis half-open and the high half closed.
//! Construction and descent share one classification function, so a point
//! inside the root box always reaches exactly one leaf.

use crate::core::collections::StorageMap;
use crate::core::vertex::{Vertex, VertexKey};
use crate::geometry::bounding_box::BoundingBox;
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;
use slotmap::new_key_type;

new_key_type! {
    /// Stable generational key for a node in the tree's storage.
    pub struct NodeKey;
}

/// Maximum spatial dimension the partitioning supports.
///
/// Each split materializes `2^D` children, so the fan-out doubles per
/// dimension; past this point the tree stops being a sensible structure.
pub const MAX_PARTITION_DIMENSION: usize = 8;

/// What a node holds: children or vertices, never both.
#[derive(Clone, Debug)]
pub(crate) enum NodeContent {
    /// Exactly `2^D` children indexed by orthant bit pattern.
    Interior { children: Vec<NodeKey> },
    /// Vertex keys whose representative points lie in this node's box.
    Leaf { vertices: Vec<VertexKey> },
}

/// One node of the tree: its box plus either children or vertices.
#[derive(Clone, Debug)]
pub struct Node<T, const D: usize>
where
    T: CoordinateScalar,
{
    bounds: BoundingBox<T, D>,
    content: NodeContent,
}

impl<T, const D: usize> Node<T, D>
where
    T: CoordinateScalar,
{
    pub(crate) const fn leaf(bounds: BoundingBox<T, D>, vertices: Vec<VertexKey>) -> Self {
        Self {
            bounds,
            content: NodeContent::Leaf { vertices },
        }
    }

    pub(crate) const fn interior(bounds: BoundingBox<T, D>, children: Vec<NodeKey>) -> Self {
        Self {
            bounds,
            content: NodeContent::Interior { children },
        }
    }

    /// The region of space this node covers.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> &BoundingBox<T, D> {
        &self.bounds
    }

    /// Whether this node is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self.content, NodeContent::Leaf { .. })
    }

    /// Vertex keys stored here; empty for interior nodes.
    #[must_use]
    pub fn vertex_keys(&self) -> &[VertexKey] {
        match &self.content {
            NodeContent::Leaf { vertices } => vertices,
            NodeContent::Interior { .. } => &[],
        }
    }

    /// Child node keys; empty for leaves.
    #[must_use]
    pub fn child_keys(&self) -> &[NodeKey] {
        match &self.content {
            NodeContent::Interior { children } => children,
            NodeContent::Leaf { .. } => &[],
        }
    }

    /// Number of vertices stored here (zero for interior nodes).
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_keys().len()
    }
}

// =============================================================================
// PARTITIONING
// =============================================================================

/// Orthant index of `point` relative to `center`: bit `axis` is set iff
/// `point[axis] >= center[axis]`.
///
/// This is the single boundary rule of the tree. Points exactly on a split
/// plane belong to the high child.
#[inline]
pub(crate) fn child_index<T, const D: usize>(center: &Point<T, D>, point: &Point<T, D>) -> usize
where
    T: CoordinateScalar,
{
    let mut index = 0;
    for axis in 0..D {
        if point[axis] >= center[axis] {
            index |= 1 << axis;
        }
    }
    index
}

/// The sub-box for one orthant of `parent`, per the [`child_index`] bit rule.
pub(crate) fn child_bounds<T, const D: usize>(
    parent: &BoundingBox<T, D>,
    index: usize,
) -> BoundingBox<T, D>
where
    T: CoordinateScalar,
{
    let center = parent.center();
    let mut lo = parent.min().to_array();
    let mut hi = parent.max().to_array();
    for axis in 0..D {
        if index & (1 << axis) == 0 {
            hi[axis] = center[axis];
        } else {
            lo[axis] = center[axis];
        }
    }
    BoundingBox::from_corners(Point::new(lo), Point::new(hi))
}

/// Recursively partitions `keys` under `bounds`, inserting nodes bottom-up.
///
/// A node stays a leaf when its vertex count is within `capacity` or its
/// depth has reached `max_depth`; otherwise all `2^D` children are created,
/// empty orthants becoming empty leaves. Materializing empty children keeps
/// descent total over the root box, so "leaf reached but no entity matched"
/// stays distinguishable from "outside the domain".
///
/// `max_depth` bounds the recursion even when vertices are coincident and a
/// split makes no progress.
pub(crate) fn build_subtree<T, const D: usize>(
    nodes: &mut StorageMap<NodeKey, Node<T, D>>,
    vertices: &StorageMap<VertexKey, Vertex<T, D>>,
    keys: Vec<VertexKey>,
    bounds: BoundingBox<T, D>,
    depth: usize,
    capacity: usize,
    max_depth: usize,
) -> NodeKey
where
    T: CoordinateScalar,
{
    if keys.len() <= capacity || depth >= max_depth {
        return nodes.insert(Node::leaf(bounds, keys));
    }

    let center = bounds.center();
    let child_count = 1_usize << D;

    let mut buckets: Vec<Vec<VertexKey>> = vec![Vec::new(); child_count];
    for key in keys {
        buckets[child_index(&center, vertices[key].point())].push(key);
    }

    let mut children = Vec::with_capacity(child_count);
    for (index, bucket) in buckets.into_iter().enumerate() {
        let sub_bounds = child_bounds(&bounds, index);
        children.push(build_subtree(
            nodes,
            vertices,
            bucket,
            sub_bounds,
            depth + 1,
            capacity,
            max_depth,
        ));
    }

    nodes.insert(Node::interior(bounds, children))
}

/// Walks from `root` to the leaf owning `point`, returning the leaf key and
/// its depth.
///
/// The caller guarantees `point` lies inside the root box; under that
/// contract every interior step lands on a valid child and the walk takes at
/// most `max_depth` steps.
pub(crate) fn descend<T, const D: usize>(
    nodes: &StorageMap<NodeKey, Node<T, D>>,
    root: NodeKey,
    point: &Point<T, D>,
) -> (NodeKey, usize)
where
    T: CoordinateScalar,
{
    let mut current = root;
    let mut depth = 0;
    loop {
        let node = &nodes[current];
        match &node.content {
            NodeContent::Leaf { .. } => return (current, depth),
            NodeContent::Interior { children } => {
                current = children[child_index(&node.bounds.center(), point)];
                depth += 1;
            }
        }
    }
}
