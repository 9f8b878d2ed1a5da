//! Lock-free publication slot for sharing a built tree across threads.
//!
//! A tree is immutable once built, so readers only ever need a consistent
//! snapshot. [`TreeSlot`] wraps an `ArcSwapOption`: queries load the current
//! `Arc` without locking, and a rebuild publishes a new tree in one atomic
//! store. Readers holding the old `Arc` keep a valid tree until they drop
//! it; nobody observes a half-updated index.

use crate::core::tree::Orthtree;
use crate::core::traits::mesh::ElementMesh;
use crate::geometry::traits::coordinate::CoordinateScalar;
use arc_swap::ArcSwapOption;
use std::fmt;
use std::sync::Arc;

/// Atomic holder for the current tree, starting empty.
///
/// # Examples
///
/// ```
/// use orthtree::prelude::*;
///
/// struct Segments(usize);
///
/// impl ElementMesh<f64, 1> for Segments {
///     type ElementId = usize;
///     fn element_count(&self) -> usize {
///         self.0
///     }
///     fn elements(&self) -> impl Iterator<Item = usize> + '_ {
///         0..self.0
///     }
///     fn corners(&self, element: usize) -> impl Iterator<Item = Point<f64, 1>> + '_ {
///         let lo = element as f64;
///         [Point::new([lo]), Point::new([lo + 1.0])].into_iter()
///     }
///     fn contains(&self, element: usize, point: &Point<f64, 1>) -> bool {
///         let lo = element as f64;
///         point[0] >= lo && point[0] <= lo + 1.0
///     }
/// }
///
/// let slot: TreeSlot<f64, Segments, 1> = TreeSlot::new();
/// assert!(slot.load().is_none());
///
/// slot.publish(Orthtree::new(Segments(2)).unwrap());
/// let tree = slot.load().unwrap();
/// assert_eq!(tree.find_entity(&Point::new([1.5])).unwrap(), 1);
///
/// // a rebuild swaps in a new tree; the old Arc stays valid for holders
/// slot.publish(Orthtree::new(Segments(4)).unwrap());
/// assert_eq!(tree.element_count(), 2);
/// assert_eq!(slot.load().unwrap().element_count(), 4);
/// ```
pub struct TreeSlot<T, M, const D: usize>
where
    T: CoordinateScalar,
    M: ElementMesh<T, D>,
{
    current: ArcSwapOption<Orthtree<T, M, D>>,
}

impl<T, M, const D: usize> TreeSlot<T, M, D>
where
    T: CoordinateScalar,
    M: ElementMesh<T, D>,
{
    /// An empty slot; [`load`](Self::load) returns `None` until a tree is
    /// published.
    #[must_use]
    pub fn new() -> Self {
        Self {
            current: ArcSwapOption::empty(),
        }
    }

    /// Atomically replaces the current tree, returning the `Arc` that was
    /// published.
    pub fn publish(&self, tree: Orthtree<T, M, D>) -> Arc<Orthtree<T, M, D>> {
        let shared = Arc::new(tree);
        self.current.store(Some(Arc::clone(&shared)));
        shared
    }

    /// Loads the currently published tree, if any.
    #[must_use]
    pub fn load(&self) -> Option<Arc<Orthtree<T, M, D>>> {
        self.current.load_full()
    }

    /// Drops the published tree; readers holding an `Arc` are unaffected.
    pub fn clear(&self) {
        self.current.store(None);
    }
}

impl<T, M, const D: usize> Default for TreeSlot<T, M, D>
where
    T: CoordinateScalar,
    M: ElementMesh<T, D>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, M, const D: usize> fmt::Debug for TreeSlot<T, M, D>
where
    T: CoordinateScalar,
    M: ElementMesh<T, D>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeSlot")
            .field("occupied", &self.current.load().is_some())
            .finish()
    }
}
