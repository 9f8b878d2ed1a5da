//! Numeric helpers for d-dimensional coordinates.
//!
//! Norms and distances over coordinate arrays, computed in the scalar type
//! itself (no intermediate conversion to `f64`).

use crate::geometry::point::Point;
use crate::geometry::traits::coordinate::CoordinateScalar;
use num_traits::Float;

/// Sum of squared components of a coordinate array.
///
/// # Examples
///
/// ```
/// use orthtree::geometry::util::squared_norm;
///
/// assert_eq!(squared_norm(&[3.0, 4.0]), 25.0);
/// assert_eq!(squared_norm(&[1.0, 2.0, 2.0]), 9.0);
/// ```
#[must_use]
pub fn squared_norm<T, const D: usize>(coords: &[T; D]) -> T
where
    T: CoordinateScalar,
{
    coords.iter().fold(T::zero(), |acc, &x| acc + x * x)
}

/// Euclidean norm of a coordinate array.
///
/// Scales by the largest absolute component before squaring, so extreme
/// magnitudes neither overflow nor underflow.
///
/// # Examples
///
/// ```
/// use orthtree::geometry::util::hypot;
///
/// assert_eq!(hypot(&[3.0, 4.0]), 5.0);
/// assert_eq!(hypot(&[1.0, 2.0, 2.0]), 3.0);
/// ```
#[must_use]
pub fn hypot<T, const D: usize>(coords: &[T; D]) -> T
where
    T: CoordinateScalar,
{
    let max_abs = coords
        .iter()
        .fold(T::zero(), |acc, &x| acc.max(Float::abs(x)));
    if max_abs == T::zero() {
        return T::zero();
    }
    let scaled_sum = coords.iter().fold(T::zero(), |acc, &x| {
        let s = x / max_abs;
        acc + s * s
    });
    max_abs * Float::sqrt(scaled_sum)
}

/// Squared Euclidean distance between two points.
///
/// The registry's tolerance scan compares this against a squared threshold to
/// avoid the square root in the inner loop.
#[must_use]
pub fn squared_distance<T, const D: usize>(a: &Point<T, D>, b: &Point<T, D>) -> T
where
    T: CoordinateScalar,
{
    a.coords()
        .iter()
        .zip(b.coords().iter())
        .fold(T::zero(), |acc, (&x, &y)| {
            let d = x - y;
            acc + d * d
        })
}

/// Euclidean distance between two points.
#[must_use]
pub fn distance<T, const D: usize>(a: &Point<T, D>, b: &Point<T, D>) -> T
where
    T: CoordinateScalar,
{
    let mut diff = [T::zero(); D];
    for (axis, slot) in diff.iter_mut().enumerate() {
        *slot = a[axis] - b[axis];
    }
    hypot(&diff)
}
