//! The spatial tree: two-phase construction, point location, statistics.
//!
//! An [`Orthtree`] is built once over a mesh and is immutable afterwards.
//! Construction runs in two passes over the element set: the first validates
//! corners and accumulates the domain box and element seed list, the second
//! registers corners into deduplicated vertices and partitions them into
//! nodes. Queries never mutate, so a built tree can be shared across threads
//! freely; adapting to a changed mesh means building a new tree and swapping
//! it in (see [`TreeSlot`](crate::core::slot::TreeSlot)).

use crate::core::collections::{FastHashSet, StorageMap};
use crate::core::config::TreeConfig;
use crate::core::node::{self, MAX_PARTITION_DIMENSION, Node, NodeKey};
use crate::core::registry::VertexRegistry;
use crate::core::stats::{StatsAccumulator, TreeStats};
use crate::core::traits::mesh::ElementMesh;
use crate::core::vertex::{ElementIdx, Vertex, VertexKey};
use crate::core::views::{LeafView, LevelView, NodeRef, Walk};
use crate::geometry::bounding_box::BoundingBox;
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::{CoordinateScalar, CoordinateValidationError};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::{debug, info};

// =============================================================================
// CONSTRUCTION STATE AND ERRORS
// =============================================================================

/// Lifecycle of a tree.
///
/// Queries are only served in `Built`; the other two states exist so that a
/// query hitting a half-constructed tree fails with a typed error instead of
/// nonsense answers.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub enum ConstructionState {
    /// No construction has happened yet.
    #[default]
    Unbuilt,
    /// A build pass is in progress.
    Building,
    /// Construction finished; the tree is immutable and queryable.
    Built,
}

impl fmt::Display for ConstructionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unbuilt => "unbuilt",
            Self::Building => "building",
            Self::Built => "built",
        };
        write!(f, "{name}")
    }
}

/// Errors that can occur while building a tree.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ConstructionError {
    /// A mesh corner carried a non-finite coordinate.
    #[error("element {element} has an invalid corner: {source}")]
    InvalidCorner {
        /// Position of the offending element in mesh iteration order.
        element: usize,
        /// The underlying coordinate validation failure.
        source: CoordinateValidationError,
    },
    /// The merge tolerance did not resolve to a finite value.
    #[error("merge tolerance resolved to a non-finite value: {tolerance}")]
    InvalidTolerance {
        /// The resolved tolerance, formatted.
        tolerance: String,
    },
    /// The spatial dimension is outside what the partitioning supports.
    #[error("dimension {dimension} is outside the supported range 1..={maximum}")]
    UnsupportedDimension {
        /// The dimension that was requested.
        dimension: usize,
        /// The largest supported dimension.
        maximum: usize,
    },
}

/// Errors reported by point-location queries.
///
/// `OutOfDomain` and `PointNotFound` are deliberately distinct: the first
/// means the point missed the mesh bounding box entirely, the second that it
/// fell in a gap between elements (or in a hole of the mesh) despite being
/// inside the box.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PointLocationError {
    /// The point lies outside the indexed domain box.
    #[error("point lies outside the indexed domain")]
    OutOfDomain,
    /// The point is inside the domain box but no candidate element contains
    /// it.
    #[error("no element contains the point ({candidates} candidates tested)")]
    PointNotFound {
        /// Number of distinct elements whose containment test ran.
        candidates: usize,
    },
    /// The tree was asked to serve a query in a state where it cannot.
    #[error("tree cannot serve queries (state: {state})")]
    InvalidTreeState {
        /// The state the tree was found in.
        state: ConstructionState,
    },
}

// =============================================================================
// THE TREE
// =============================================================================

/// Spatial index over an [`ElementMesh`]: deduplicated vertices partitioned
/// into an orthant tree, answering point-location queries.
///
/// Built once via [`new`](Self::new) or [`build`](Self::build); immutable
/// afterwards. The tree owns its mesh value `M`, which may itself be a
/// borrow or an `Arc` thanks to the forwarding impls on [`ElementMesh`].
///
/// # Examples
///
/// ```
/// use orthtree::prelude::*;
///
/// struct Cells(Vec<(Point<f64, 2>, Point<f64, 2>)>);
///
/// impl ElementMesh<f64, 2> for Cells {
///     type ElementId = usize;
///     fn element_count(&self) -> usize {
///         self.0.len()
///     }
///     fn elements(&self) -> impl Iterator<Item = usize> + '_ {
///         0..self.0.len()
///     }
///     fn corners(&self, element: usize) -> impl Iterator<Item = Point<f64, 2>> + '_ {
///         let (lo, hi) = self.0[element];
///         [lo, Point::new([hi[0], lo[1]]), Point::new([lo[0], hi[1]]), hi].into_iter()
///     }
///     fn contains(&self, element: usize, point: &Point<f64, 2>) -> bool {
///         let (lo, hi) = self.0[element];
///         (0..2).all(|axis| point[axis] >= lo[axis] && point[axis] <= hi[axis])
///     }
/// }
///
/// let mesh = Cells(vec![
///     (Point::new([0.0, 0.0]), Point::new([1.0, 1.0])),
///     (Point::new([1.0, 0.0]), Point::new([2.0, 1.0])),
/// ]);
/// let tree = Orthtree::new(mesh).unwrap();
///
/// assert_eq!(tree.find_entity(&Point::new([1.5, 0.5])).unwrap(), 1);
/// assert_eq!(tree.vertex_count(), 6); // shared edge corners merged
/// ```
#[derive(Clone)]
pub struct Orthtree<T, M, const D: usize>
where
    T: CoordinateScalar,
    M: ElementMesh<T, D>,
{
    mesh: M,
    config: TreeConfig<T>,
    state: ConstructionState,
    bounds: BoundingBox<T, D>,
    /// Element ids in mesh iteration order; [`ElementIdx`] indexes into this.
    elements: Vec<M::ElementId>,
    vertices: StorageMap<VertexKey, Vertex<T, D>>,
    /// Vertex keys in registration order.
    vertex_order: Vec<VertexKey>,
    nodes: StorageMap<NodeKey, Node<T, D>>,
    root: Option<NodeKey>,
    /// Resolved merge tolerance used during registration.
    tolerance: T,
}

impl<T, M, const D: usize> Orthtree<T, M, D>
where
    T: CoordinateScalar,
    M: ElementMesh<T, D>,
{
    /// Builds a tree over `mesh` with the default [`TreeConfig`].
    pub fn new(mesh: M) -> Result<Self, ConstructionError> {
        Self::build(mesh, TreeConfig::default())
    }

    /// Builds a tree over `mesh` with an explicit configuration.
    ///
    /// Construction is single-threaded and runs the two mesh passes
    /// described at the module level. On success the tree is in the
    /// [`Built`](ConstructionState::Built) state; on failure the partial
    /// state is discarded with the error.
    ///
    /// # Errors
    ///
    /// [`ConstructionError::UnsupportedDimension`] when `D` is zero or
    /// larger than [`MAX_PARTITION_DIMENSION`],
    /// [`ConstructionError::InvalidCorner`] when a mesh corner is non-finite
    /// and [`ConstructionError::InvalidTolerance`] when the configured merge
    /// tolerance resolves to a non-finite value.
    pub fn build(mesh: M, config: TreeConfig<T>) -> Result<Self, ConstructionError> {
        if D == 0 || D > MAX_PARTITION_DIMENSION {
            return Err(ConstructionError::UnsupportedDimension {
                dimension: D,
                maximum: MAX_PARTITION_DIMENSION,
            });
        }

        let mut tree = Self {
            mesh,
            config,
            state: ConstructionState::Unbuilt,
            bounds: BoundingBox::empty(),
            elements: Vec::new(),
            vertices: StorageMap::with_key(),
            vertex_order: Vec::new(),
            nodes: StorageMap::with_key(),
            root: None,
            tolerance: T::zero(),
        };

        tree.state = ConstructionState::Building;
        tree.accumulate()?;
        tree.freeze()?;
        tree.state = ConstructionState::Built;

        info!(
            "built {}-d tree: {} elements, {} vertices, {} nodes",
            D,
            tree.elements.len(),
            tree.vertex_order.len(),
            tree.nodes.len()
        );
        Ok(tree)
    }

    /// First pass: validate corners, grow the domain box, capture the
    /// element seed list.
    fn accumulate(&mut self) -> Result<(), ConstructionError> {
        self.elements.reserve(self.mesh.element_count());
        for (position, id) in self.mesh.elements().enumerate() {
            for corner in self.mesh.corners(id) {
                corner
                    .validate()
                    .map_err(|source| ConstructionError::InvalidCorner {
                        element: position,
                        source,
                    })?;
                self.bounds.append(&corner);
            }
            self.elements.push(id);
        }
        debug!(
            "first pass: {} elements, domain {}",
            self.elements.len(),
            self.bounds
        );
        Ok(())
    }

    /// Second pass: resolve the tolerance, register corners into
    /// deduplicated vertices, partition them into nodes.
    fn freeze(&mut self) -> Result<(), ConstructionError> {
        let tolerance = self.config.tolerance().resolve(&self.bounds);
        if !tolerance.is_finite() {
            return Err(ConstructionError::InvalidTolerance {
                tolerance: format!("{tolerance}"),
            });
        }
        self.tolerance = tolerance;

        let mut registry = VertexRegistry::new(tolerance);
        for (position, id) in self.mesh.elements().enumerate() {
            let element = ElementIdx::new(position);
            for corner in self.mesh.corners(id) {
                registry.register_corner(corner, element);
            }
        }
        debug!(
            "second pass: {} vertices from {} corners (tolerance {}, grid {})",
            registry.len(),
            registry.corners_seen(),
            tolerance,
            if registry.uses_grid() { "on" } else { "off" }
        );

        let (vertices, order) = registry.into_parts();
        self.vertices = vertices;
        self.vertex_order = order;

        let keys = self.vertex_order.clone();
        let root = node::build_subtree(
            &mut self.nodes,
            &self.vertices,
            keys,
            self.bounds,
            0,
            self.config.effective_leaf_capacity(),
            self.config.effective_max_depth(),
        );
        self.root = Some(root);
        Ok(())
    }

    // =============================================================================
    // QUERIES
    // =============================================================================

    fn ensure_built(&self) -> Result<(), PointLocationError> {
        if self.state == ConstructionState::Built {
            Ok(())
        } else {
            Err(PointLocationError::InvalidTreeState { state: self.state })
        }
    }

    /// Locates the leaf whose region owns `point`.
    ///
    /// Descent takes at most `max_depth` steps. Points exactly on a split
    /// plane belong to the high-side child; points on the domain boundary
    /// are in domain.
    ///
    /// # Errors
    ///
    /// [`PointLocationError::OutOfDomain`] when `point` is outside the
    /// domain box (or any coordinate is NaN), and
    /// [`PointLocationError::InvalidTreeState`] when the tree is not built.
    pub fn find_leaf(&self, point: &Point<T, D>) -> Result<NodeRef<'_, T, D>, PointLocationError> {
        self.ensure_built()?;
        if !self.bounds.contains(point) {
            return Err(PointLocationError::OutOfDomain);
        }
        let root = self
            .root
            .ok_or(PointLocationError::InvalidTreeState { state: self.state })?;
        let (leaf, depth) = node::descend(&self.nodes, root, point);
        let node = self
            .nodes
            .get(leaf)
            .ok_or(PointLocationError::InvalidTreeState { state: self.state })?;
        Ok(NodeRef::new(leaf, depth, node))
    }

    /// Finds an element containing `point`.
    ///
    /// Walks the owning leaf's vertices in registration order and each
    /// vertex's incident elements in incidence order, testing every distinct
    /// candidate once; the first inclusive containment test wins. A point on
    /// a shared element boundary therefore resolves to the
    /// earliest-registered incident element, deterministically across calls
    /// and rebuilds of the same mesh.
    ///
    /// # Errors
    ///
    /// [`PointLocationError::OutOfDomain`] outside the domain box,
    /// [`PointLocationError::PointNotFound`] when the point sits in a hole
    /// or gap of the mesh, and [`PointLocationError::InvalidTreeState`] when
    /// the tree is not built.
    pub fn find_entity(&self, point: &Point<T, D>) -> Result<M::ElementId, PointLocationError> {
        let leaf = self.find_leaf(point)?;

        let mut tested: FastHashSet<ElementIdx> = FastHashSet::default();
        for &vertex_key in leaf.vertex_keys() {
            let Some(vertex) = self.vertices.get(vertex_key) else {
                return Err(PointLocationError::InvalidTreeState { state: self.state });
            };
            for &element in vertex.incident_elements() {
                if !tested.insert(element) {
                    continue;
                }
                let Some(&id) = self.elements.get(element.index()) else {
                    return Err(PointLocationError::InvalidTreeState { state: self.state });
                };
                if self.mesh.contains(id, point) {
                    return Ok(id);
                }
            }
        }

        Err(PointLocationError::PointNotFound {
            candidates: tested.len(),
        })
    }

    /// Computes shape statistics in one walk over the nodes.
    ///
    /// Print the result via its `Display` impl.
    #[must_use]
    pub fn stats(&self) -> TreeStats {
        let mut acc = StatsAccumulator::default();
        let mut distinct: FastHashSet<ElementIdx> = FastHashSet::default();

        for node in Walk::new(&self.nodes, self.root) {
            if node.is_leaf() {
                distinct.clear();
                for &vertex_key in node.vertex_keys() {
                    if let Some(vertex) = self.vertices.get(vertex_key) {
                        distinct.extend(vertex.incident_elements().iter().copied());
                    }
                }
                acc.record_leaf(node.depth(), node.vertex_count(), distinct.len());
            } else {
                acc.record_interior(node.depth());
            }
        }

        acc.finish(self.vertex_order.len())
    }

    // =============================================================================
    // VIEWS AND ACCESSORS
    // =============================================================================

    /// Iterates over the leaves in deterministic pre-order.
    ///
    /// Call again for a fresh, restarted iteration.
    #[must_use]
    pub fn leaf_view(&self) -> LeafView<'_, T, D> {
        LeafView::new(&self.nodes, self.root)
    }

    /// Iterates over the nodes at `level` in deterministic pre-order.
    ///
    /// A level beyond the deepest node yields an empty iterator.
    #[must_use]
    pub fn level_view(&self, level: usize) -> LevelView<'_, T, D> {
        LevelView::new(&self.nodes, self.root, level)
    }

    /// The domain box grown over every registered corner.
    #[inline]
    #[must_use]
    pub const fn bounds(&self) -> &BoundingBox<T, D> {
        &self.bounds
    }

    /// Element ids captured at build time, in mesh iteration order.
    #[must_use]
    pub fn element_seeds(&self) -> &[M::ElementId] {
        &self.elements
    }

    /// Resolves a stored element index back to the mesh's id.
    #[must_use]
    pub fn element_seed(&self, index: ElementIdx) -> Option<M::ElementId> {
        self.elements.get(index.index()).copied()
    }

    /// Number of elements indexed.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Number of deduplicated vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertex_order.len()
    }

    /// Iterates over vertices in registration order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexKey, &Vertex<T, D>)> + '_ {
        self.vertex_order
            .iter()
            .filter_map(|&key| self.vertices.get(key).map(|vertex| (key, vertex)))
    }

    /// Looks up one vertex.
    #[must_use]
    pub fn vertex(&self, key: VertexKey) -> Option<&Vertex<T, D>> {
        self.vertices.get(key)
    }

    /// Mesh ids of the elements incident to a vertex, in registration order.
    ///
    /// Empty for a stale key.
    pub fn incident_elements(&self, key: VertexKey) -> impl Iterator<Item = M::ElementId> + '_ {
        self.vertex(key)
            .map(Vertex::incident_elements)
            .unwrap_or(&[])
            .iter()
            .filter_map(|idx| self.elements.get(idx.index()).copied())
    }

    /// Looks up one node.
    #[must_use]
    pub fn node(&self, key: NodeKey) -> Option<&Node<T, D>> {
        self.nodes.get(key)
    }

    /// Total number of nodes, interior and leaf.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The mesh this tree indexes.
    #[inline]
    #[must_use]
    pub const fn mesh(&self) -> &M {
        &self.mesh
    }

    /// The configuration the tree was built with.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &TreeConfig<T> {
        &self.config
    }

    /// The merge tolerance after resolution against the domain box.
    #[inline]
    #[must_use]
    pub const fn merge_tolerance(&self) -> T {
        self.tolerance
    }

    /// Current lifecycle state.
    #[inline]
    #[must_use]
    pub const fn construction_state(&self) -> ConstructionState {
        self.state
    }

    /// Whether the tree is built and queryable.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.state == ConstructionState::Built
    }
}

impl<T, M, const D: usize> fmt::Debug for Orthtree<T, M, D>
where
    T: CoordinateScalar,
    M: ElementMesh<T, D>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Orthtree")
            .field("state", &self.state)
            .field("bounds", &self.bounds)
            .field("elements", &self.elements.len())
            .field("vertices", &self.vertex_order.len())
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{MergeTolerance, TreeConfigBuilder};
    use approx::assert_relative_eq;
    use std::sync::Arc;

    /// Axis-aligned rectangular cells with inclusive containment.
    struct CellMesh {
        cells: Vec<(Point<f64, 2>, Point<f64, 2>)>,
    }

    impl ElementMesh<f64, 2> for CellMesh {
        type ElementId = usize;

        fn element_count(&self) -> usize {
            self.cells.len()
        }

        fn elements(&self) -> impl Iterator<Item = usize> + '_ {
            0..self.cells.len()
        }

        fn corners(&self, element: usize) -> impl Iterator<Item = Point<f64, 2>> + '_ {
            let (lo, hi) = self.cells[element];
            [
                lo,
                Point::new([hi[0], lo[1]]),
                Point::new([lo[0], hi[1]]),
                hi,
            ]
            .into_iter()
        }

        fn contains(&self, element: usize, point: &Point<f64, 2>) -> bool {
            let (lo, hi) = self.cells[element];
            (0..2).all(|axis| point[axis] >= lo[axis] && point[axis] <= hi[axis])
        }
    }

    /// Two unit cells sharing the edge x = 1.
    fn two_cell_mesh() -> CellMesh {
        CellMesh {
            cells: vec![
                (Point::new([0.0, 0.0]), Point::new([1.0, 1.0])),
                (Point::new([1.0, 0.0]), Point::new([2.0, 1.0])),
            ],
        }
    }

    /// An empty mesh generic over dimension, for guard tests.
    struct NoElements;

    impl<const D: usize> ElementMesh<f64, D> for NoElements {
        type ElementId = usize;

        fn element_count(&self) -> usize {
            0
        }

        fn elements(&self) -> impl Iterator<Item = usize> + '_ {
            std::iter::empty()
        }

        fn corners(&self, _element: usize) -> impl Iterator<Item = Point<f64, D>> + '_ {
            std::iter::empty()
        }

        fn contains(&self, _element: usize, _point: &Point<f64, D>) -> bool {
            false
        }
    }

    // =============================================================================
    // CONSTRUCTION
    // =============================================================================

    #[test]
    fn build_reaches_built_state_with_expected_shape() {
        let tree = Orthtree::new(two_cell_mesh()).unwrap();
        assert!(tree.is_built());
        assert_eq!(tree.construction_state(), ConstructionState::Built);
        assert_eq!(tree.element_count(), 2);
        // 8 corners, 2 shared across the common edge
        assert_eq!(tree.vertex_count(), 6);
        assert_eq!(tree.bounds().min(), &Point::new([0.0, 0.0]));
        assert_eq!(tree.bounds().max(), &Point::new([2.0, 1.0]));
    }

    #[test]
    fn shared_corners_accumulate_incidence_in_order() {
        let tree = Orthtree::new(two_cell_mesh()).unwrap();
        let (key, _) = tree
            .vertices()
            .find(|(_, vertex)| vertex.point() == &Point::new([1.0, 0.0]))
            .unwrap();
        let incident: Vec<usize> = tree.incident_elements(key).collect();
        assert_eq!(incident, vec![0, 1]);
    }

    #[test]
    fn dimension_guard_rejects_zero_and_too_large() {
        let err = Orthtree::<f64, _, 0>::new(NoElements).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::UnsupportedDimension {
                dimension: 0,
                maximum: MAX_PARTITION_DIMENSION,
            }
        );

        let err = Orthtree::<f64, _, 9>::new(NoElements).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::UnsupportedDimension {
                dimension: 9,
                maximum: MAX_PARTITION_DIMENSION,
            }
        );
    }

    #[test]
    fn non_finite_corner_is_reported_with_element_position() {
        let mesh = CellMesh {
            cells: vec![
                (Point::new([0.0, 0.0]), Point::new([1.0, 1.0])),
                (Point::new([1.0, 0.0]), Point::new([f64::NAN, 1.0])),
            ],
        };
        let err = Orthtree::new(mesh).unwrap_err();
        assert!(matches!(
            err,
            ConstructionError::InvalidCorner { element: 1, .. }
        ));
    }

    #[test]
    fn non_finite_tolerance_is_rejected() {
        let config = TreeConfigBuilder::default()
            .tolerance(MergeTolerance::Absolute(f64::NAN))
            .build()
            .unwrap();
        let err = Orthtree::build(two_cell_mesh(), config).unwrap_err();
        assert!(matches!(err, ConstructionError::InvalidTolerance { .. }));
    }

    #[test]
    fn empty_mesh_builds_a_single_empty_leaf() {
        let tree = Orthtree::<f64, _, 2>::new(NoElements).unwrap();
        assert!(tree.is_built());
        assert!(tree.bounds().is_empty());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.leaf_view().count(), 1);
        assert_eq!(
            tree.find_leaf(&Point::origin()).unwrap_err(),
            PointLocationError::OutOfDomain
        );
    }

    #[test]
    fn builds_through_reference_and_arc_meshes() {
        let mesh = two_cell_mesh();
        let by_ref: Orthtree<f64, &CellMesh, 2> = Orthtree::new(&mesh).unwrap();
        assert_eq!(by_ref.vertex_count(), 6);

        let shared = Arc::new(two_cell_mesh());
        let by_arc: Orthtree<f64, Arc<CellMesh>, 2> = Orthtree::new(Arc::clone(&shared)).unwrap();
        assert_eq!(by_arc.vertex_count(), 6);
        assert_eq!(by_arc.find_entity(&Point::new([0.5, 0.5])).unwrap(), 0);
    }

    // =============================================================================
    // POINT LOCATION
    // =============================================================================

    #[test]
    fn find_entity_resolves_interior_points() {
        let tree = Orthtree::new(two_cell_mesh()).unwrap();
        assert_eq!(tree.find_entity(&Point::new([0.5, 0.5])).unwrap(), 0);
        assert_eq!(tree.find_entity(&Point::new([1.5, 0.5])).unwrap(), 1);
    }

    #[test]
    fn shared_boundary_resolves_to_first_registered_element() {
        let tree = Orthtree::new(two_cell_mesh()).unwrap();
        // x = 1 lies in both cells; element 0 registered first
        assert_eq!(tree.find_entity(&Point::new([1.0, 0.5])).unwrap(), 0);
        assert_eq!(tree.find_entity(&Point::new([1.0, 0.0])).unwrap(), 0);
    }

    #[test]
    fn outside_points_are_out_of_domain() {
        let tree = Orthtree::new(two_cell_mesh()).unwrap();
        for coords in [[-0.1, 0.5], [2.1, 0.5], [1.0, -0.1], [1.0, 1.1]] {
            assert_eq!(
                tree.find_entity(&Point::new(coords)).unwrap_err(),
                PointLocationError::OutOfDomain
            );
        }
        assert_eq!(
            tree.find_entity(&Point::new([f64::NAN, 0.5])).unwrap_err(),
            PointLocationError::OutOfDomain
        );
    }

    #[test]
    fn gap_between_elements_is_point_not_found() {
        // two cells with a gap between x = 1 and x = 2
        let mesh = CellMesh {
            cells: vec![
                (Point::new([0.0, 0.0]), Point::new([1.0, 1.0])),
                (Point::new([2.0, 0.0]), Point::new([3.0, 1.0])),
            ],
        };
        let tree = Orthtree::new(mesh).unwrap();
        let err = tree.find_entity(&Point::new([1.5, 0.5])).unwrap_err();
        assert_eq!(err, PointLocationError::PointNotFound { candidates: 2 });
    }

    #[test]
    fn domain_boundary_is_inclusive() {
        let tree = Orthtree::new(two_cell_mesh()).unwrap();
        assert_eq!(tree.find_entity(&Point::new([0.0, 0.0])).unwrap(), 0);
        assert_eq!(tree.find_entity(&Point::new([2.0, 1.0])).unwrap(), 1);
    }

    #[test]
    fn find_leaf_depth_respects_max_depth() {
        let config = TreeConfigBuilder::default()
            .leaf_capacity(1)
            .max_depth(3)
            .build()
            .unwrap();
        let tree = Orthtree::build(two_cell_mesh(), config).unwrap();
        for coords in [[0.5, 0.5], [1.5, 0.5], [1.0, 0.5]] {
            let leaf = tree.find_leaf(&Point::new(coords)).unwrap();
            assert!(leaf.is_leaf());
            assert!(leaf.depth() <= 3);
            assert!(leaf.bounds().contains(&Point::new(coords)));
        }
    }

    // =============================================================================
    // STATS AND ACCESSORS
    // =============================================================================

    #[test]
    fn stats_for_a_single_leaf_tree() {
        let tree = Orthtree::new(two_cell_mesh()).unwrap();
        // 6 vertices fit the default capacity of 8, so the root is a leaf
        let stats = tree.stats();
        assert_eq!(stats.num_nodes, 1);
        assert_eq!(stats.num_leaves, 1);
        assert_eq!(stats.num_vertices, 6);
        assert_relative_eq!(stats.ave_depth, 0.0);
        assert_relative_eq!(stats.ave_leaf_depth, 0.0);
        assert_relative_eq!(stats.ave_vertices_per_node, 6.0);
        assert_relative_eq!(stats.ave_entities_per_leaf, 2.0);
    }

    #[test]
    fn stats_count_split_trees_consistently() {
        let config = TreeConfigBuilder::default().leaf_capacity(1).build().unwrap();
        let tree = Orthtree::build(two_cell_mesh(), config).unwrap();
        let stats = tree.stats();

        assert_eq!(stats.num_nodes, tree.node_count());
        assert_eq!(stats.num_leaves, tree.leaf_view().count());
        assert_eq!(stats.num_vertices, 6);
        assert!(stats.num_leaves > 1);
        assert!(stats.ave_leaf_depth >= stats.ave_depth);
    }

    #[test]
    fn element_seed_resolution() {
        let tree = Orthtree::new(two_cell_mesh()).unwrap();
        assert_eq!(tree.element_seeds(), &[0, 1]);
        assert_eq!(tree.element_seed(ElementIdx::new(1)), Some(1));
        assert_eq!(tree.element_seed(ElementIdx::new(7)), None);
    }

    #[test]
    fn merge_tolerance_reflects_configuration() {
        let config = TreeConfigBuilder::default()
            .tolerance(MergeTolerance::Absolute(0.25))
            .build()
            .unwrap();
        let tree = Orthtree::build(two_cell_mesh(), config).unwrap();
        assert_relative_eq!(tree.merge_tolerance(), 0.25);

        let tree = Orthtree::new(two_cell_mesh()).unwrap();
        // default: ten epsilons of the largest extent (2.0)
        assert_relative_eq!(tree.merge_tolerance(), 20.0 * f64::EPSILON);
    }

    #[test]
    fn vertices_iterate_in_registration_order() {
        let tree = Orthtree::new(two_cell_mesh()).unwrap();
        let first: Vec<Point<f64, 2>> =
            tree.vertices().map(|(_, vertex)| *vertex.point()).collect();
        // element 0's corners first, then element 1's unseen corners
        assert_eq!(first[0], Point::new([0.0, 0.0]));
        assert_eq!(first[1], Point::new([1.0, 0.0]));
        assert_eq!(first.len(), 6);
        assert_eq!(first[4], Point::new([2.0, 0.0]));
    }

    #[test]
    fn debug_output_is_a_summary() {
        let tree = Orthtree::new(two_cell_mesh()).unwrap();
        let text = format!("{tree:?}");
        assert!(text.contains("Orthtree"));
        assert!(text.contains("Built"));
    }
}
