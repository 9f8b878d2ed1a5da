//! Axis-aligned bounding boxes.
//!
//! A [`BoundingBox`] tracks the extent of a growing set of points. It only
//! ever expands: [`append`](BoundingBox::append) widens the per-axis min/max
//! to include a coordinate and nothing shrinks it. A box that has absorbed
//! nothing carries the sentinel extent min = +∞, max = −∞ on every axis, which
//! makes [`contains`](BoundingBox::contains) uniformly false and lets
//! `append` work without an "initialized" flag.

use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An axis-aligned box in `D`-dimensional space, inclusive on all faces.
///
/// # Examples
///
/// ```
/// use orthtree::geometry::bounding_box::BoundingBox;
/// use orthtree::geometry::point::Point;
///
/// let mut bounds: BoundingBox<f64, 2> = BoundingBox::empty();
/// assert!(bounds.is_empty());
/// assert!(!bounds.contains(&Point::origin()));
///
/// bounds.append(&Point::new([0.0, 0.0]));
/// bounds.append(&Point::new([2.0, 1.0]));
///
/// assert!(bounds.contains(&Point::new([1.0, 0.5])));
/// assert!(bounds.contains(&Point::new([2.0, 1.0]))); // boundary is inside
/// assert!(!bounds.contains(&Point::new([2.1, 0.5])));
/// assert_eq!(bounds.max_extent(), 2.0);
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: CoordinateScalar")]
pub struct BoundingBox<T, const D: usize>
where
    T: CoordinateScalar,
{
    min: Point<T, D>,
    max: Point<T, D>,
}

impl<T, const D: usize> BoundingBox<T, D>
where
    T: CoordinateScalar,
{
    /// A box containing nothing: min = +∞, max = −∞ on every axis.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: Point::new([T::infinity(); D]),
            max: Point::new([T::neg_infinity(); D]),
        }
    }

    /// A box with the given corners.
    ///
    /// No ordering is enforced; a `min` exceeding `max` on some axis denotes
    /// an empty box on that axis.
    #[must_use]
    pub const fn from_corners(min: Point<T, D>, max: Point<T, D>) -> Self {
        Self { min, max }
    }

    /// A box grown around every point of an iterator.
    #[must_use]
    pub fn from_points<I>(points: I) -> Self
    where
        I: IntoIterator<Item = Point<T, D>>,
    {
        let mut bounds = Self::empty();
        for point in points {
            bounds.append(&point);
        }
        bounds
    }

    /// The minimum corner.
    #[inline]
    #[must_use]
    pub const fn min(&self) -> &Point<T, D> {
        &self.min
    }

    /// The maximum corner.
    #[inline]
    #[must_use]
    pub const fn max(&self) -> &Point<T, D> {
        &self.max
    }

    /// Extends the box to include `point`. Idempotent for interior points.
    ///
    /// Non-finite components never extend an axis: comparisons against NaN
    /// are false, so a NaN coordinate leaves the box unchanged.
    pub fn append(&mut self, point: &Point<T, D>) {
        let mut lo = self.min.to_array();
        let mut hi = self.max.to_array();
        for axis in 0..D {
            let value = point[axis];
            if value < lo[axis] {
                lo[axis] = value;
            }
            if value > hi[axis] {
                hi[axis] = value;
            }
        }
        self.min = Point::new(lo);
        self.max = Point::new(hi);
    }

    /// Whether `point` lies inside the box, boundary inclusive.
    ///
    /// False for every point when the box is empty, and false whenever a
    /// component of `point` is NaN.
    #[must_use]
    pub fn contains(&self, point: &Point<T, D>) -> bool {
        for axis in 0..D {
            if !(point[axis] >= self.min[axis] && point[axis] <= self.max[axis]) {
                return false;
            }
        }
        true
    }

    /// Whether `other` lies entirely inside this box (empty boxes are
    /// contained in everything).
    #[must_use]
    pub fn contains_box(&self, other: &Self) -> bool {
        other.is_empty() || (self.contains(&other.min) && self.contains(&other.max))
    }

    /// True until the first `append` (or whenever min exceeds max somewhere).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        (0..D).any(|axis| self.min[axis] > self.max[axis])
    }

    /// The center of the box. Meaningful only for non-empty boxes.
    #[must_use]
    pub fn center(&self) -> Point<T, D> {
        let two = T::one() + T::one();
        let mut center = [T::zero(); D];
        for (axis, slot) in center.iter_mut().enumerate() {
            *slot = (self.min[axis] + self.max[axis]) / two;
        }
        Point::new(center)
    }

    /// Extent along one axis; zero for an empty box.
    #[must_use]
    pub fn extent(&self, axis: usize) -> T {
        if self.is_empty() {
            T::zero()
        } else {
            self.max[axis] - self.min[axis]
        }
    }

    /// The largest per-axis extent; zero for an empty box.
    #[must_use]
    pub fn max_extent(&self) -> T {
        (0..D).fold(T::zero(), |acc, axis| acc.max(self.extent(axis)))
    }
}

impl<T, const D: usize> Default for BoundingBox<T, D>
where
    T: CoordinateScalar,
{
    fn default() -> Self {
        Self::empty()
    }
}

impl<T, const D: usize> fmt::Display for BoundingBox<T, D>
where
    T: CoordinateScalar,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            write!(f, "empty")
        } else {
            write!(f, "{} .. {}", self.min, self.max)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // =============================================================================
    // SENTINEL AND GROWTH
    // =============================================================================

    #[test]
    fn empty_box_has_inverted_sentinels() {
        let bounds: BoundingBox<f64, 3> = BoundingBox::empty();
        assert!(bounds.is_empty());
        assert_eq!(bounds.min()[0], f64::INFINITY);
        assert_eq!(bounds.max()[0], f64::NEG_INFINITY);
        assert!(!bounds.contains(&Point::origin()));
        assert_eq!(bounds.max_extent(), 0.0);
    }

    #[test]
    fn append_grows_monotonically() {
        let mut bounds: BoundingBox<f64, 2> = BoundingBox::empty();
        bounds.append(&Point::new([1.0, 1.0]));
        assert!(!bounds.is_empty());
        assert_eq!(*bounds.min(), Point::new([1.0, 1.0]));
        assert_eq!(*bounds.max(), Point::new([1.0, 1.0]));

        bounds.append(&Point::new([-1.0, 3.0]));
        assert_eq!(*bounds.min(), Point::new([-1.0, 1.0]));
        assert_eq!(*bounds.max(), Point::new([1.0, 3.0]));
    }

    #[test]
    fn append_is_idempotent_for_interior_points() {
        let mut bounds = BoundingBox::from_points([Point::new([0.0, 0.0]), Point::new([4.0, 4.0])]);
        let before = bounds;
        bounds.append(&Point::new([2.0, 2.0]));
        assert_eq!(bounds, before);
    }

    #[test]
    fn append_ignores_nan_components() {
        let mut bounds = BoundingBox::from_points([Point::new([0.0, 0.0]), Point::new([1.0, 1.0])]);
        let before = bounds;
        bounds.append(&Point::new([f64::NAN, 0.5]));
        assert_eq!(bounds.min(), before.min());
        assert_eq!(bounds.max()[0], 1.0);
    }

    // =============================================================================
    // CONTAINMENT
    // =============================================================================

    #[test]
    fn contains_is_boundary_inclusive() {
        let bounds = BoundingBox::from_points([Point::new([0.0, 0.0]), Point::new([1.0, 2.0])]);
        assert!(bounds.contains(&Point::new([0.0, 0.0])));
        assert!(bounds.contains(&Point::new([1.0, 2.0])));
        assert!(bounds.contains(&Point::new([0.0, 2.0])));
        assert!(!bounds.contains(&Point::new([1.0 + 1e-12, 1.0])));
        assert!(!bounds.contains(&Point::new([-1e-12, 1.0])));
    }

    #[test]
    fn contains_rejects_nan_queries() {
        let bounds = BoundingBox::from_points([Point::new([0.0, 0.0]), Point::new([1.0, 1.0])]);
        assert!(!bounds.contains(&Point::new([f64::NAN, 0.5])));
    }

    #[test]
    fn contains_box_nesting() {
        let outer = BoundingBox::from_points([Point::new([0.0, 0.0]), Point::new([4.0, 4.0])]);
        let inner = BoundingBox::from_points([Point::new([1.0, 1.0]), Point::new([2.0, 2.0])]);
        assert!(outer.contains_box(&inner));
        assert!(!inner.contains_box(&outer));
        assert!(outer.contains_box(&BoundingBox::empty()));
    }

    // =============================================================================
    // GEOMETRY
    // =============================================================================

    #[test]
    fn center_and_extents() {
        let bounds = BoundingBox::from_points([Point::new([0.0, -2.0]), Point::new([4.0, 2.0])]);
        assert_eq!(bounds.center(), Point::new([2.0, 0.0]));
        assert_relative_eq!(bounds.extent(0), 4.0);
        assert_relative_eq!(bounds.extent(1), 4.0);
        assert_relative_eq!(bounds.max_extent(), 4.0);
    }

    #[test]
    fn degenerate_box_has_zero_extent() {
        let bounds = BoundingBox::from_points([Point::new([1.0, 1.0, 1.0])]);
        assert!(!bounds.is_empty());
        assert_eq!(bounds.max_extent(), 0.0);
        assert!(bounds.contains(&Point::new([1.0, 1.0, 1.0])));
    }

    #[test]
    fn display_formats() {
        let empty: BoundingBox<f64, 2> = BoundingBox::empty();
        assert_eq!(empty.to_string(), "empty");
        let bounds = BoundingBox::from_points([Point::new([0.0, 0.0]), Point::new([1.0, 1.0])]);
        assert_eq!(bounds.to_string(), "(0, 0) .. (1, 1)");
    }

    #[test]
    fn serde_round_trip() {
        let bounds = BoundingBox::from_points([Point::new([0.5, 1.5]), Point::new([2.5, 3.5])]);
        let json = serde_json::to_string(&bounds).unwrap();
        let back: BoundingBox<f64, 2> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, bounds);
    }
}
