//! Vertex registration with near-duplicate merging.
//!
//! The [`VertexRegistry`] ingests mesh corners one element at a time and
//! collapses corners that fall within the merge tolerance of an existing
//! vertex. Lookups run through a spatial hash grid over floored cell
//! coordinates; when the grid cannot key a coordinate robustly (huge
//! magnitudes, high dimension) it disables itself and the registry falls
//! back to a linear scan, trading speed for the same answers.

use crate::core::collections::{FastHashMap, SmallBuffer, StorageMap, VertexSecondaryMap};
use crate::core::vertex::{ElementIdx, Vertex, VertexKey};
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;
use crate::geometry::util::squared_distance;
use std::hash::{Hash, Hasher};

/// Maximum dimension served by the merge grid.
///
/// Candidate lookup enumerates the 3^D Moore neighborhood, which grows too
/// fast to be a win past this point; higher dimensions use the linear path.
const MAX_GRID_DIMENSION: usize = 5;

const BUCKET_INLINE_CAPACITY: usize = 8;

/// Hashable grid-cell key for a D-dimensional merge grid.
///
/// Stores integer-valued cell coordinates in the same scalar type as the
/// points, avoiding a cast to an integer type so the grid stays generic over
/// coordinate scalars.
#[derive(Clone, Copy, Debug)]
struct GridKey<T, const D: usize>([T; D])
where
    T: CoordinateScalar;

impl<T, const D: usize> PartialEq for GridKey<T, D>
where
    T: CoordinateScalar,
{
    fn eq(&self, other: &Self) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| a.ordered_eq(b))
    }
}

impl<T, const D: usize> Eq for GridKey<T, D> where T: CoordinateScalar {}

impl<T, const D: usize> Hash for GridKey<T, D>
where
    T: CoordinateScalar,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        for coord in &self.0 {
            coord.hash_scalar(state);
        }
    }
}

/// Spatial hash grid bucketing vertex keys by floored cell coordinates
/// `floor(coord / cell_size)`, with `cell_size` equal to the merge tolerance.
///
/// Any point within one tolerance of a query differs by at most one cell per
/// axis, so the 3^D neighborhood walk sees every merge candidate.
#[derive(Clone, Debug)]
struct MergeGrid<T, const D: usize>
where
    T: CoordinateScalar,
{
    cell_size: T,
    usable: bool,
    cells: FastHashMap<GridKey<T, D>, SmallBuffer<VertexKey, BUCKET_INLINE_CAPACITY>>,
}

impl<T, const D: usize> MergeGrid<T, D>
where
    T: CoordinateScalar,
{
    fn new(cell_size: T) -> Self {
        let usable = D <= MAX_GRID_DIMENSION && cell_size.is_finite() && cell_size > T::zero();
        Self {
            cell_size,
            usable,
            cells: FastHashMap::default(),
        }
    }

    const fn is_usable(&self) -> bool {
        self.usable
    }

    const fn disable(&mut self) {
        self.usable = false;
    }

    /// Insert a vertex into its grid cell.
    ///
    /// If the point cannot be keyed robustly the grid disables itself so that
    /// lookups fall back to the linear scan.
    fn insert(&mut self, vertex_key: VertexKey, coords: &[T; D]) {
        if !self.usable {
            return;
        }

        let Some(key) = self.key_for_coords(coords) else {
            self.disable();
            return;
        };

        self.cells.entry(key).or_default().push(vertex_key);
    }

    /// Visit all candidate vertex keys in the 3^D neighborhood of `coords`.
    ///
    /// Returns `true` if the grid served the query (even with zero
    /// candidates) and `false` if the caller must scan linearly. The
    /// callback returns `false` to stop early.
    fn for_each_candidate<F>(&self, coords: &[T; D], mut f: F) -> bool
    where
        F: FnMut(VertexKey) -> bool,
    {
        if !self.usable {
            return false;
        }

        let Some(base_key) = self.key_for_coords(coords) else {
            return false;
        };

        let base = base_key.0;
        let mut current = base;

        Self::visit_neighbor_cells(0, &base, &mut current, &mut |neighbor| {
            if let Some(bucket) = self.cells.get(&neighbor) {
                for &vkey in bucket {
                    if !f(vkey) {
                        return false;
                    }
                }
            }
            true
        });

        true
    }

    fn key_for_coords(&self, coords: &[T; D]) -> Option<GridKey<T, D>> {
        if !self.usable {
            return None;
        }

        if !self.cell_size.is_finite() || self.cell_size <= T::zero() {
            return None;
        }

        let mut key = [T::zero(); D];
        let one = T::one();

        for (i, coord) in coords.iter().enumerate() {
            if !coord.is_finite() {
                return None;
            }

            let cell_coord = (*coord / self.cell_size).floor();
            if !cell_coord.is_finite() {
                return None;
            }

            // If the cell coordinate is too large to have unit resolution,
            // neighbor enumeration would be lossy (cell_coord + 1 ==
            // cell_coord). Disable.
            if (cell_coord + one).ordered_eq(&cell_coord) {
                return None;
            }

            key[i] = cell_coord;
        }

        Some(GridKey(key))
    }

    fn visit_neighbor_cells<F>(axis: usize, base: &[T; D], current: &mut [T; D], f: &mut F) -> bool
    where
        F: FnMut(GridKey<T, D>) -> bool,
    {
        if axis == D {
            return f(GridKey(*current));
        }

        let one = T::one();
        let offsets = [-one, T::zero(), one];

        for offset in offsets {
            current[axis] = base[axis] + offset;
            if !Self::visit_neighbor_cells(axis + 1, base, current, f) {
                return false;
            }
        }

        true
    }
}

/// Accumulates mesh corners into deduplicated vertices.
///
/// Corners arrive element by element through
/// [`register_corner`](Self::register_corner). A corner within the tolerance
/// of an existing vertex joins it; the FIRST registered corner stays the
/// representative, so registration order decides coordinates as well as
/// incidence order. When several existing vertices lie within tolerance of a
/// corner, the earliest-registered one wins.
///
/// A tolerance of zero or below disables merging: every corner becomes its
/// own vertex.
#[derive(Clone, Debug)]
pub(crate) struct VertexRegistry<T, const D: usize>
where
    T: CoordinateScalar,
{
    vertices: StorageMap<VertexKey, Vertex<T, D>>,
    /// Vertex keys in registration order.
    order: Vec<VertexKey>,
    /// Registration rank per key, for earliest-wins among grid candidates.
    rank: VertexSecondaryMap<usize>,
    grid: MergeGrid<T, D>,
    tolerance: T,
    tolerance_sq: T,
    corners_seen: usize,
}

impl<T, const D: usize> VertexRegistry<T, D>
where
    T: CoordinateScalar,
{
    pub(crate) fn new(tolerance: T) -> Self {
        Self {
            vertices: StorageMap::with_key(),
            order: Vec::new(),
            rank: VertexSecondaryMap::new(),
            grid: MergeGrid::new(tolerance),
            tolerance,
            tolerance_sq: tolerance * tolerance,
            corners_seen: 0,
        }
    }

    /// Registers one corner of `element`.
    ///
    /// Returns the key of the vertex the corner resolved to, newly created or
    /// merged into. Incidence lists never list an element twice: corners of
    /// one element arrive consecutively, so a repeat of the current element
    /// (two corners of a degenerate element merging into the same vertex) is
    /// caught by checking the tail of the list.
    pub(crate) fn register_corner(&mut self, point: Point<T, D>, element: ElementIdx) -> VertexKey {
        self.corners_seen += 1;

        if let Some(key) = self.find_within_tolerance(&point) {
            let vertex = &mut self.vertices[key];
            if vertex.incident_elements().last() != Some(&element) {
                vertex.push_incident(element);
            }
            return key;
        }

        let key = self.vertices.insert(Vertex::new(point, element));
        self.rank.insert(key, self.order.len());
        self.order.push(key);
        self.grid.insert(key, &point.to_array());
        key
    }

    /// The earliest-registered vertex within tolerance of `point`, if any.
    fn find_within_tolerance(&self, point: &Point<T, D>) -> Option<VertexKey> {
        if self.tolerance <= T::zero() {
            return None;
        }

        let coords = point.to_array();
        let mut best: Option<(usize, VertexKey)> = None;

        let grid_used = self.grid.for_each_candidate(&coords, |key| {
            if let Some(vertex) = self.vertices.get(key)
                && squared_distance(point, vertex.point()) <= self.tolerance_sq
            {
                let rank = self.rank.get(key).copied().unwrap_or(usize::MAX);
                if best.is_none_or(|(best_rank, _)| rank < best_rank) {
                    best = Some((rank, key));
                }
            }
            true
        });

        if grid_used {
            return best.map(|(_, key)| key);
        }

        // Linear fallback: registration order makes the first hit the
        // earliest-registered match.
        self.order.iter().copied().find(|&key| {
            squared_distance(point, self.vertices[key].point()) <= self.tolerance_sq
        })
    }

    /// Number of distinct vertices registered so far.
    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Number of raw corners ingested, merged or not.
    pub(crate) const fn corners_seen(&self) -> usize {
        self.corners_seen
    }

    /// Whether lookups are being served by the grid (as opposed to the
    /// linear fallback).
    pub(crate) const fn uses_grid(&self) -> bool {
        self.grid.is_usable()
    }

    /// Hands the finished vertex set to the tree: storage plus registration
    /// order.
    pub(crate) fn into_parts(self) -> (StorageMap<VertexKey, Vertex<T, D>>, Vec<VertexKey>) {
        (self.vertices, self.order)
    }
}
