//! The [`Point`] coordinate value type.
//!
//! A `Point` is a fixed-length array of [`CoordinateScalar`] components and is
//! the single coordinate representation used everywhere in the crate: element
//! corners arrive as points, vertices store their canonical position as a
//! point, bounding boxes are pairs of points, and queries are points. Equality
//! and hashing use total (ordered) float semantics so points can key hash
//! containers; exact float equality is never part of vertex identity, which is
//! tolerance-based and lives in the registry.

use crate::geometry::traits::coordinate::{CoordinateScalar, CoordinateValidationError};
use serde::de::{SeqAccess, Visitor};
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Index;

/// A point in `D`-dimensional space.
///
/// Construction via [`Point::new`] performs no validation; use
/// [`Point::validate`] or the [`TryFrom`] conversion where non-finite
/// components must be rejected.
///
/// # Examples
///
/// ```
/// use orthtree::geometry::point::Point;
///
/// let p = Point::new([0.5, 1.0, -2.0]);
/// assert_eq!(p.dim(), 3);
/// assert_eq!(p[1], 1.0);
/// assert_eq!(p.to_array(), [0.5, 1.0, -2.0]);
///
/// let origin: Point<f64, 3> = Point::origin();
/// assert_eq!(origin.to_array(), [0.0; 3]);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Point<T, const D: usize>
where
    T: CoordinateScalar,
{
    coords: [T; D],
}

impl<T, const D: usize> Point<T, D>
where
    T: CoordinateScalar,
{
    /// Creates a point from its coordinate array.
    #[inline]
    #[must_use]
    pub const fn new(coords: [T; D]) -> Self {
        Self { coords }
    }

    /// The origin (all components zero).
    #[inline]
    #[must_use]
    pub fn origin() -> Self {
        Self::new([T::zero(); D])
    }

    /// Borrows the coordinate array.
    #[inline]
    #[must_use]
    pub const fn coords(&self) -> &[T; D] {
        &self.coords
    }

    /// Returns the coordinate array by value.
    #[inline]
    #[must_use]
    pub const fn to_array(self) -> [T; D] {
        self.coords
    }

    /// The spatial dimension `D`.
    #[inline]
    #[must_use]
    pub const fn dim(&self) -> usize {
        D
    }

    /// Checks that every component is finite.
    ///
    /// # Errors
    ///
    /// [`CoordinateValidationError::NonFinite`] naming the first offending
    /// axis.
    pub fn validate(&self) -> Result<(), CoordinateValidationError> {
        for (axis, value) in self.coords.iter().enumerate() {
            if !value.is_finite() {
                return Err(CoordinateValidationError::NonFinite {
                    axis,
                    dim: D,
                    value: format!("{value}"),
                });
            }
        }
        Ok(())
    }

    /// Component-wise total equality (NaN equal to NaN).
    #[must_use]
    pub fn ordered_equals(&self, other: &Self) -> bool {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .all(|(a, b)| a.ordered_eq(b))
    }
}

impl<T, const D: usize> Default for Point<T, D>
where
    T: CoordinateScalar,
{
    fn default() -> Self {
        Self::new([T::default(); D])
    }
}

impl<T, const D: usize> Index<usize> for Point<T, D>
where
    T: CoordinateScalar,
{
    type Output = T;

    #[inline]
    fn index(&self, axis: usize) -> &T {
        &self.coords[axis]
    }
}

// Equality, ordering, and hashing all go through the ordered-float view so
// they agree with each other in the presence of NaN.

impl<T, const D: usize> PartialEq for Point<T, D>
where
    T: CoordinateScalar,
{
    fn eq(&self, other: &Self) -> bool {
        self.ordered_equals(other)
    }
}

impl<T, const D: usize> Eq for Point<T, D> where T: CoordinateScalar {}

impl<T, const D: usize> Hash for Point<T, D>
where
    T: CoordinateScalar,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        for value in &self.coords {
            value.hash_scalar(state);
        }
    }
}

impl<T, const D: usize> PartialOrd for Point<T, D>
where
    T: CoordinateScalar,
{
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        for (a, b) in self.coords.iter().zip(other.coords.iter()) {
            match a.partial_cmp(b) {
                Some(std::cmp::Ordering::Equal) => {}
                non_eq => return non_eq,
            }
        }
        Some(std::cmp::Ordering::Equal)
    }
}

impl<T, const D: usize> fmt::Display for Point<T, D>
where
    T: CoordinateScalar,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (axis, value) in self.coords.iter().enumerate() {
            if axis > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

// =============================================================================
// CONVERSIONS
// =============================================================================

impl<T, const D: usize> TryFrom<[T; D]> for Point<T, D>
where
    T: CoordinateScalar,
{
    type Error = CoordinateValidationError;

    /// Validating conversion: rejects arrays with non-finite components.
    fn try_from(coords: [T; D]) -> Result<Self, Self::Error> {
        let point = Self::new(coords);
        point.validate()?;
        Ok(point)
    }
}

impl<T, const D: usize> From<Point<T, D>> for [T; D]
where
    T: CoordinateScalar,
{
    fn from(point: Point<T, D>) -> Self {
        point.to_array()
    }
}

// =============================================================================
// SERDE
// =============================================================================

// Serialized as a bare D-tuple (a JSON array), like any fixed-size coordinate.

impl<T, const D: usize> Serialize for Point<T, D>
where
    T: CoordinateScalar,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut tuple = serializer.serialize_tuple(D)?;
        for value in &self.coords {
            tuple.serialize_element(value)?;
        }
        tuple.end()
    }
}

struct PointVisitor<T, const D: usize>(PhantomData<T>);

impl<'de, T, const D: usize> Visitor<'de> for PointVisitor<T, D>
where
    T: CoordinateScalar,
{
    type Value = Point<T, D>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "a sequence of {D} coordinates")
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut coords = [T::default(); D];
        for (axis, slot) in coords.iter_mut().enumerate() {
            *slot = seq
                .next_element()?
                .ok_or_else(|| serde::de::Error::invalid_length(axis, &self))?;
        }
        Ok(Point::new(coords))
    }
}

impl<'de, T, const D: usize> Deserialize<'de> for Point<T, D>
where
    T: CoordinateScalar,
{
    fn deserialize<De>(deserializer: De) -> Result<Self, De::Error>
    where
        De: Deserializer<'de>,
    {
        deserializer.deserialize_tuple(D, PointVisitor(PhantomData))
    }
}
