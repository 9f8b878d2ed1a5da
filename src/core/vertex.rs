//! Deduplicated mesh vertices and their element incidence.
//!
//! Every geometrically distinct corner of the mesh becomes one [`Vertex`],
//! keyed by a generational [`VertexKey`] in the tree's storage. A vertex
//! remembers which elements touch it as [`ElementIdx`] values in first-seen
//! order; point location walks these lists to find candidate elements.

use crate::core::collections::{INLINE_INCIDENT_COUNT, SmallBuffer};
use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Stable generational key for a vertex in the tree's storage.
    pub struct VertexKey;
}

/// Position of an element in the mesh's stable iteration order.
///
/// The tree records incidence by index rather than by the mesh's own id type
/// so that vertex storage stays independent of the mesh generic. The tree
/// resolves an index back to the mesh id through its element seed list.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ElementIdx(usize);

impl ElementIdx {
    /// Wraps a position in the mesh's element iteration order.
    #[inline]
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The underlying position.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One deduplicated mesh vertex: its coordinates plus the elements that
/// registered a corner within merge tolerance of it.
///
/// The stored point is always the FIRST registered representative; later
/// corners that merge into this vertex contribute only their incidence.
/// Incidence order is registration order, which point location relies on
/// for deterministic tie-breaking.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Vertex<T, const D: usize>
where
    T: CoordinateScalar,
{
    point: Point<T, D>,
    incident: SmallBuffer<ElementIdx, INLINE_INCIDENT_COUNT>,
}

impl<T, const D: usize> Vertex<T, D>
where
    T: CoordinateScalar,
{
    /// A fresh vertex seeded with the element whose corner created it.
    pub(crate) fn new(point: Point<T, D>, first: ElementIdx) -> Self {
        let mut incident = SmallBuffer::new();
        incident.push(first);
        Self { point, incident }
    }

    /// The representative coordinates of this vertex.
    #[inline]
    #[must_use]
    pub const fn point(&self) -> &Point<T, D> {
        &self.point
    }

    /// Elements incident to this vertex, in registration order.
    #[inline]
    #[must_use]
    pub fn incident_elements(&self) -> &[ElementIdx] {
        &self.incident
    }

    /// Number of incident elements.
    #[inline]
    #[must_use]
    pub fn incident_count(&self) -> usize {
        self.incident.len()
    }

    /// Appends an incident element. Callers keep the list duplicate-free.
    pub(crate) fn push_incident(&mut self, element: ElementIdx) {
        self.incident.push(element);
    }
}
