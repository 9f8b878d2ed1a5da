//! Scalar abstraction for coordinate values.
//!
//! Floating-point coordinates need three capabilities beyond arithmetic before
//! they can act as identity-bearing values in a spatial index: a total
//! equality (so NaN does not poison hash-based containers), a hash consistent
//! with that equality, and finiteness validation at the boundaries where
//! coordinates enter the crate. This module provides the first two as small
//! traits ([`OrderedEq`], [`HashCoordinate`]) implemented over
//! [`OrderedFloat`], and bundles them with the numeric requirements into the
//! [`CoordinateScalar`] trait used throughout the crate.

use num_traits::Float;
use ordered_float::OrderedFloat;
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::{Debug, Display};
use std::hash::{Hash, Hasher};
use thiserror::Error;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default tolerance for `f32` comparisons.
pub const DEFAULT_TOLERANCE_F32: f32 = 1e-6;

/// Default tolerance for `f64` comparisons.
pub const DEFAULT_TOLERANCE_F64: f64 = 1e-15;

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors from validating coordinate values at crate boundaries.
///
/// Raised when a coordinate entering the index (typically an element corner
/// checked through [`Point::validate`](crate::geometry::point::Point::validate))
/// carries a non-finite scalar. The offending value is captured as a string so
/// the error type stays non-generic.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CoordinateValidationError {
    /// A coordinate component is NaN or infinite.
    #[error("non-finite coordinate at axis {axis} of {dim}: {value}")]
    NonFinite {
        /// Zero-based axis of the offending component.
        axis: usize,
        /// Dimensionality of the coordinate being validated.
        dim: usize,
        /// The offending value, formatted for display.
        value: String,
    },
}

// =============================================================================
// SUPPORT TRAITS
// =============================================================================

/// Total equality for floating-point scalars.
///
/// `NaN == NaN` under this comparison, unlike IEEE 754 semantics. This is what
/// lets coordinates participate in `Eq`-requiring containers.
pub trait OrderedEq {
    /// Compare two scalars using total ordering semantics.
    fn ordered_eq(&self, other: &Self) -> bool;
}

/// Hashing for floating-point scalars, consistent with [`OrderedEq`].
///
/// Scalars that are `ordered_eq` hash identically (all NaN bit patterns
/// collapse to one hash).
pub trait HashCoordinate {
    /// Feed the scalar into `state`.
    fn hash_scalar<H: Hasher>(&self, state: &mut H);
}

macro_rules! impl_scalar_support {
    ($($t:ty),*) => {
        $(
            impl OrderedEq for $t {
                #[inline]
                fn ordered_eq(&self, other: &Self) -> bool {
                    OrderedFloat(*self) == OrderedFloat(*other)
                }
            }

            impl HashCoordinate for $t {
                #[inline]
                fn hash_scalar<H: Hasher>(&self, state: &mut H) {
                    OrderedFloat(*self).hash(state);
                }
            }
        )*
    };
}

impl_scalar_support!(f32, f64);

// =============================================================================
// COORDINATE SCALAR
// =============================================================================

/// Trait alias capturing everything the crate needs from a coordinate scalar.
///
/// Bundles floating-point arithmetic ([`Float`]), total equality and hashing
/// ([`OrderedEq`], [`HashCoordinate`]), formatting, and serde support. `f32`
/// and `f64` implement it; other IEEE-like scalar types can opt in by
/// supplying the same capabilities.
///
/// # Examples
///
/// ```
/// use orthtree::geometry::traits::coordinate::CoordinateScalar;
///
/// fn midpoint<T: CoordinateScalar>(a: T, b: T) -> T {
///     (a + b) / (T::one() + T::one())
/// }
///
/// assert_eq!(midpoint(0.0_f64, 1.0), 0.5);
/// assert!(f64::default_tolerance() > 0.0);
/// ```
pub trait CoordinateScalar:
    Float + OrderedEq + HashCoordinate + Default + Debug + Display + Serialize + DeserializeOwned
{
    /// Default tolerance for approximate comparisons with this scalar type.
    fn default_tolerance() -> Self;
}

impl CoordinateScalar for f32 {
    fn default_tolerance() -> Self {
        DEFAULT_TOLERANCE_F32
    }
}

impl CoordinateScalar for f64 {
    fn default_tolerance() -> Self {
        DEFAULT_TOLERANCE_F64
    }
}
