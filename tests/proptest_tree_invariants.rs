//! Property-based tests for tree invariants over randomized structured grids.
//!
//! This module builds trees from randomly sized and placed tensor-product
//! grids and checks the documented invariants:
//! - Exact vertex deduplication (one vertex per lattice point)
//! - Incidence counts matching the lattice adjacency structure
//! - Point-location soundness (a located element contains the point) and
//!   completeness over a single leaf
//! - Leaves partitioning the vertex set within their boxes
//! - Statistics agreeing with direct traversal counts
//!
//! For hand-verified scenarios with exact expectations, see
//! `unit_square_location.rs`.

use orthtree::prelude::*;
use proptest::prelude::*;

// =============================================================================
// GRID FIXTURE AND STRATEGIES
// =============================================================================

/// Structured grid mesh over per-axis coordinate arrays.
///
/// Neighboring cells read shared corners from the same array slot, so those
/// corners are bitwise identical and deduplication counts are exact
/// regardless of coordinate magnitude.
#[derive(Clone, Debug)]
struct GridMesh<const D: usize> {
    axes: [Vec<f64>; D],
}

impl<const D: usize> GridMesh<D> {
    fn new(axes: [Vec<f64>; D]) -> Self {
        Self { axes }
    }

    /// Cells per axis.
    fn dims(&self) -> [usize; D] {
        let mut dims = [0; D];
        for (axis, coords) in self.axes.iter().enumerate() {
            dims[axis] = coords.len() - 1;
        }
        dims
    }

    fn cell_count(&self) -> usize {
        self.dims().iter().product()
    }

    fn lattice_count(&self) -> usize {
        self.axes.iter().map(Vec::len).product()
    }

    /// Per-axis cell indices of `element`, little-endian mixed radix.
    fn decompose(&self, mut element: usize) -> [usize; D] {
        let dims = self.dims();
        let mut indices = [0; D];
        for axis in 0..D {
            indices[axis] = element % dims[axis];
            element /= dims[axis];
        }
        indices
    }

    fn centroid(&self, element: usize) -> Point<f64, D> {
        let indices = self.decompose(element);
        let mut coords = [0.0; D];
        for axis in 0..D {
            let lo = self.axes[axis][indices[axis]];
            let hi = self.axes[axis][indices[axis] + 1];
            coords[axis] = (lo + hi) / 2.0;
        }
        Point::new(coords)
    }
}

impl<const D: usize> ElementMesh<f64, D> for GridMesh<D> {
    type ElementId = usize;

    fn element_count(&self) -> usize {
        self.cell_count()
    }

    fn elements(&self) -> impl Iterator<Item = usize> + '_ {
        0..self.cell_count()
    }

    fn corners(&self, element: usize) -> impl Iterator<Item = Point<f64, D>> + '_ {
        let indices = self.decompose(element);
        (0..(1_usize << D)).map(move |mask| {
            let mut coords = [0.0; D];
            for axis in 0..D {
                let step = usize::from(mask & (1 << axis) != 0);
                coords[axis] = self.axes[axis][indices[axis] + step];
            }
            Point::new(coords)
        })
    }

    fn contains(&self, element: usize, point: &Point<f64, D>) -> bool {
        let indices = self.decompose(element);
        (0..D).all(|axis| {
            let lo = self.axes[axis][indices[axis]];
            let hi = self.axes[axis][indices[axis] + 1];
            point[axis] >= lo && point[axis] <= hi
        })
    }
}

/// Strategy for one axis: 1-4 cells of one size at a random origin.
#[allow(clippy::cast_precision_loss)]
fn axis_coords() -> impl Strategy<Value = Vec<f64>> {
    (1..=4_usize, 0.25..4.0_f64, -50.0..50.0_f64).prop_map(|(cells, size, origin)| {
        (0..=cells).map(|i| origin + i as f64 * size).collect()
    })
}

// Macro: invariant tests for dimension $dim
macro_rules! gen_grid_invariant_tests {
    ($dim:literal) => {
        pastey::paste! {
            /// Strategy: independently sized axes
            fn [<grid_axes_ $dim d>]() -> impl Strategy<Value = [Vec<f64>; $dim]> {
                prop::array::[<uniform $dim>](axis_coords())
            }

            /// Strategy: the same cell count on every axis
            #[allow(clippy::cast_precision_loss)]
            fn [<cubic_axes_ $dim d>]() -> impl Strategy<Value = [Vec<f64>; $dim]> {
                (
                    1..=4_usize,
                    prop::array::[<uniform $dim>]((0.25..4.0_f64, -50.0..50.0_f64)),
                )
                    .prop_map(|(cells, axes)| {
                        axes.map(|(size, origin)| {
                            (0..=cells).map(|i| origin + i as f64 * size).collect()
                        })
                    })
            }

            proptest! {
                /// Property: deduplication yields exactly one vertex per
                /// lattice point, never more, never fewer
                #[test]
                fn [<prop_vertex_dedup_is_exact_ $dim d>](axes in [<grid_axes_ $dim d>]()) {
                    let mesh = GridMesh::new(axes);
                    let cells = mesh.cell_count();
                    let lattice = mesh.lattice_count();

                    let tree = Orthtree::new(mesh).unwrap();
                    prop_assert_eq!(tree.element_count(), cells);
                    prop_assert_eq!(tree.vertex_count(), lattice);
                }

                /// Property: a vertex's incidence list has one entry per cell
                /// touching its lattice position
                #[test]
                fn [<prop_incidence_counts_match_lattice_ $dim d>](axes in [<grid_axes_ $dim d>]()) {
                    let tree = Orthtree::new(GridMesh::new(axes)).unwrap();
                    let mesh = tree.mesh();
                    let dims = mesh.dims();

                    for (_, vertex) in tree.vertices() {
                        let mut expected = 1;
                        for axis in 0..$dim {
                            let coord = vertex.point()[axis];
                            let index = mesh.axes[axis]
                                .iter()
                                .position(|x| x.to_bits() == coord.to_bits())
                                .unwrap();
                            expected *= usize::from(index != 0 && index != dims[axis]) + 1;
                        }
                        prop_assert_eq!(
                            vertex.incident_count(),
                            expected,
                            "wrong incidence at {}",
                            vertex.point()
                        );
                    }
                }

                /// Property: location is sound; a returned element contains
                /// the query point, and a strictly interior point never
                /// resolves to a foreign cell
                #[test]
                fn [<prop_centroid_location_is_sound_ $dim d>](axes in [<grid_axes_ $dim d>]()) {
                    let tree = Orthtree::new(GridMesh::new(axes)).unwrap();
                    for cell in 0..tree.element_count() {
                        let centroid = tree.mesh().centroid(cell);
                        match tree.find_entity(&centroid) {
                            Ok(found) => prop_assert_eq!(found, cell),
                            Err(PointLocationError::PointNotFound { .. }) => {}
                            Err(other) => prop_assert!(false, "unexpected error {other:?}"),
                        }
                    }
                }

                /// Property: with the capacity covering every vertex the tree
                /// is one leaf and every centroid resolves to its cell
                #[test]
                fn [<prop_single_leaf_location_is_complete_ $dim d>](axes in [<grid_axes_ $dim d>]()) {
                    let mesh = GridMesh::new(axes);
                    let config = TreeConfigBuilder::default()
                        .leaf_capacity(mesh.lattice_count())
                        .build()
                        .unwrap();

                    let tree = Orthtree::build(mesh, config).unwrap();
                    prop_assert_eq!(tree.node_count(), 1);
                    for cell in 0..tree.element_count() {
                        let centroid = tree.mesh().centroid(cell);
                        prop_assert_eq!(tree.find_entity(&centroid).unwrap(), cell);
                    }
                }

                /// Property: uniformly refined grids resolve every centroid
                /// even when the vertex set splits across leaves
                #[test]
                fn [<prop_cubic_centroids_round_trip_ $dim d>](axes in [<cubic_axes_ $dim d>]()) {
                    let tree = Orthtree::new(GridMesh::new(axes)).unwrap();
                    for cell in 0..tree.element_count() {
                        let centroid = tree.mesh().centroid(cell);
                        prop_assert_eq!(tree.find_entity(&centroid).unwrap(), cell);
                    }
                }

                /// Property: every vertex is stored in exactly one leaf, inside
                /// that leaf's box
                #[test]
                fn [<prop_leaves_partition_vertices_ $dim d>](axes in [<grid_axes_ $dim d>]()) {
                    let tree = Orthtree::new(GridMesh::new(axes)).unwrap();
                    let mut stored = 0;
                    for leaf in tree.leaf_view() {
                        prop_assert!(leaf.is_leaf());
                        stored += leaf.vertex_count();
                        for &key in leaf.vertex_keys() {
                            let vertex = tree.vertex(key).unwrap();
                            prop_assert!(
                                leaf.bounds().contains(vertex.point()),
                                "vertex {} escaped leaf box {}",
                                vertex.point(),
                                leaf.bounds()
                            );
                        }
                    }
                    prop_assert_eq!(stored, tree.vertex_count());
                }

                /// Property: nudging any coordinate past the domain box flips
                /// the query to `OutOfDomain`
                #[test]
                fn [<prop_outside_box_is_out_of_domain_ $dim d>](
                    axes in [<grid_axes_ $dim d>](),
                    axis in 0_usize..$dim,
                ) {
                    let tree = Orthtree::new(GridMesh::new(axes)).unwrap();

                    let mut above = tree.bounds().max().to_array();
                    above[axis] += 1.0;
                    prop_assert_eq!(
                        tree.find_entity(&Point::new(above)).unwrap_err(),
                        PointLocationError::OutOfDomain
                    );

                    let mut below = tree.bounds().min().to_array();
                    below[axis] -= 1.0;
                    prop_assert_eq!(
                        tree.find_entity(&Point::new(below)).unwrap_err(),
                        PointLocationError::OutOfDomain
                    );
                }

                /// Property: statistics agree with direct traversal counts
                #[test]
                fn [<prop_stats_agree_with_views_ $dim d>](axes in [<grid_axes_ $dim d>]()) {
                    let tree = Orthtree::new(GridMesh::new(axes)).unwrap();
                    let stats = tree.stats();

                    prop_assert_eq!(stats.num_nodes, tree.node_count());
                    prop_assert_eq!(stats.num_leaves, tree.leaf_view().count());
                    prop_assert_eq!(stats.num_vertices, tree.vertex_count());

                    let per_level: usize = (0..=DEFAULT_MAX_DEPTH)
                        .map(|level| tree.level_view(level).count())
                        .sum();
                    prop_assert_eq!(per_level, tree.node_count());
                }
            }
        }
    };
}

// Instantiate for 2D-4D
gen_grid_invariant_tests!(2);
gen_grid_invariant_tests!(3);
gen_grid_invariant_tests!(4);
