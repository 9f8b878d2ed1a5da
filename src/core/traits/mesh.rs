//! Mesh abstraction consumed by the tree builder.
//!
//! The tree never stores element geometry of its own. It reads a mesh twice
//! during construction (once for bounds, once for vertex registration) and
//! calls back into it during point location, all through [`ElementMesh`].
//! Blanket forwarding impls let callers hand the builder a `&M` or an
//! `Arc<M>` without wrapper types.

use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

/// Trait alias for element identifiers handed out by a mesh.
///
/// Anything cheap to copy and usable as a hash key qualifies; `usize`
/// indices and typed id newtypes both work. The blanket impl means you
/// never implement this directly.
pub trait ElementId: Copy + Eq + Hash + Debug {}

impl<I> ElementId for I where I: Copy + Eq + Hash + Debug {}

/// Read-only view of an unstructured mesh: an iterable element set where
/// each element exposes corner coordinates and an inside test.
///
/// # Contract
///
/// - [`elements`](Self::elements) is restartable and yields every element in
///   the same order on every call. That order defines the element indices the
///   tree stores, so a mesh whose iteration order shifts between calls will
///   corrupt the index.
/// - [`corners`](Self::corners) yields at least one corner per element in a
///   stable order.
/// - [`contains`](Self::contains) decides boundary ownership: a point on a
///   shared face may be reported inside by several elements, and the tree
///   resolves such ties by element registration order.
///
/// # Examples
///
/// A minimal mesh of axis-aligned cells:
///
/// ```
/// use orthtree::core::traits::mesh::ElementMesh;
/// use orthtree::geometry::point::Point;
///
/// struct CellGrid {
///     // (lo, hi) corners per cell
///     cells: Vec<(Point<f64, 2>, Point<f64, 2>)>,
/// }
///
/// impl ElementMesh<f64, 2> for CellGrid {
///     type ElementId = usize;
///
///     fn element_count(&self) -> usize {
///         self.cells.len()
///     }
///
///     fn elements(&self) -> impl Iterator<Item = usize> + '_ {
///         0..self.cells.len()
///     }
///
///     fn corners(&self, element: usize) -> impl Iterator<Item = Point<f64, 2>> + '_ {
///         let (lo, hi) = self.cells[element];
///         [
///             lo,
///             Point::new([hi[0], lo[1]]),
///             Point::new([lo[0], hi[1]]),
///             hi,
///         ]
///         .into_iter()
///     }
///
///     fn contains(&self, element: usize, point: &Point<f64, 2>) -> bool {
///         let (lo, hi) = self.cells[element];
///         (0..2).all(|axis| point[axis] >= lo[axis] && point[axis] <= hi[axis])
///     }
/// }
///
/// let mesh = CellGrid {
///     cells: vec![(Point::origin(), Point::new([1.0, 1.0]))],
/// };
/// assert_eq!(mesh.element_count(), 1);
/// assert!(mesh.contains(0, &Point::new([0.5, 0.5])));
/// assert_eq!(mesh.corners(0).count(), 4);
/// ```
pub trait ElementMesh<T, const D: usize>
where
    T: CoordinateScalar,
{
    /// Identifier for one element of this mesh.
    type ElementId: ElementId;

    /// Number of elements in the mesh.
    fn element_count(&self) -> usize;

    /// Iterates over all elements in a stable, restartable order.
    fn elements(&self) -> impl Iterator<Item = Self::ElementId> + '_;

    /// Iterates over the corner coordinates of one element.
    fn corners(&self, element: Self::ElementId) -> impl Iterator<Item = Point<T, D>> + '_;

    /// Whether `point` lies inside `element`, boundary inclusive.
    fn contains(&self, element: Self::ElementId, point: &Point<T, D>) -> bool;
}

// Forwarding impls so the tree can own a borrow or a shared handle with the
// same code path.

impl<T, M, const D: usize> ElementMesh<T, D> for &M
where
    T: CoordinateScalar,
    M: ElementMesh<T, D>,
{
    type ElementId = M::ElementId;

    fn element_count(&self) -> usize {
        (**self).element_count()
    }

    fn elements(&self) -> impl Iterator<Item = Self::ElementId> + '_ {
        (**self).elements()
    }

    fn corners(&self, element: Self::ElementId) -> impl Iterator<Item = Point<T, D>> + '_ {
        (**self).corners(element)
    }

    fn contains(&self, element: Self::ElementId, point: &Point<T, D>) -> bool {
        (**self).contains(element, point)
    }
}

impl<T, M, const D: usize> ElementMesh<T, D> for Arc<M>
where
    T: CoordinateScalar,
    M: ElementMesh<T, D>,
{
    type ElementId = M::ElementId;

    fn element_count(&self) -> usize {
        (**self).element_count()
    }

    fn elements(&self) -> impl Iterator<Item = Self::ElementId> + '_ {
        (**self).elements()
    }

    fn corners(&self, element: Self::ElementId) -> impl Iterator<Item = Point<T, D>> + '_ {
        (**self).corners(element)
    }

    fn contains(&self, element: Self::ElementId, point: &Point<T, D>) -> bool {
        (**self).contains(element, point)
    }
}
