//! Tree construction parameters.
//!
//! [`TreeConfig`] bundles the split threshold, the depth cap, and the vertex
//! [`MergeTolerance`]. Builders come from `derive_builder`, so partial
//! overrides read naturally:
//!
//! ```
//! use orthtree::core::config::{MergeTolerance, TreeConfig, TreeConfigBuilder};
//!
//! let config: TreeConfig<f64> = TreeConfigBuilder::default()
//!     .leaf_capacity(16)
//!     .tolerance(MergeTolerance::Absolute(1e-9))
//!     .build()
//!     .unwrap();
//! assert_eq!(config.leaf_capacity(), 16);
//! ```

use crate::geometry::bounding_box::BoundingBox;
use crate::geometry::traits::coordinate::CoordinateScalar;
use num_traits::cast;
use serde::{Deserialize, Serialize};

/// Default number of vertices a leaf holds before it splits.
pub const DEFAULT_LEAF_CAPACITY: usize = 8;

/// Default maximum tree depth (root at depth 0).
pub const DEFAULT_MAX_DEPTH: usize = 16;

/// Hard ceiling on the depth of any tree, whatever the configured
/// `max_depth`. Bounds build recursion for degenerate inputs such as many
/// thousands of coincident vertices.
pub const MAX_TREE_DEPTH: usize = 64;

/// How close two mesh corners must be to collapse into one vertex.
///
/// The distance below which corners merge is either a fixed coordinate-space
/// value or a factor of the mesh's largest bounding-box extent. The
/// scale-relative form is the default: an absolute epsilon that suits a unit
/// square silently over- or under-merges a mesh in millimeters, so tying the
/// threshold to the mesh scale is the safer contract.
///
/// A resolved tolerance of zero or below disables merging entirely; every
/// registered corner then becomes its own vertex.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: CoordinateScalar")]
pub enum MergeTolerance<T>
where
    T: CoordinateScalar,
{
    /// Fixed merge distance in coordinate units.
    Absolute(T),
    /// Merge distance as `factor * largest bounding-box extent`.
    RelativeToExtent(T),
}

impl<T> MergeTolerance<T>
where
    T: CoordinateScalar,
{
    /// Resolves this tolerance against the mesh bounds.
    ///
    /// For the scale-relative form a degenerate mesh (empty, or all corners
    /// coincident) has zero extent; the bare factor is used then, so exact
    /// duplicates still merge.
    #[must_use]
    pub fn resolve<const D: usize>(&self, bounds: &BoundingBox<T, D>) -> T {
        match *self {
            Self::Absolute(tolerance) => tolerance,
            Self::RelativeToExtent(factor) => {
                let extent = bounds.max_extent();
                if extent > T::zero() {
                    factor * extent
                } else {
                    factor
                }
            }
        }
    }
}

impl<T> Default for MergeTolerance<T>
where
    T: CoordinateScalar,
{
    /// Ten machine epsilons of the scalar type, relative to the mesh extent.
    fn default() -> Self {
        Self::RelativeToExtent(T::epsilon() * cast(10.0).unwrap_or_else(T::one))
    }
}

#[derive(Builder, Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "T: CoordinateScalar")]
/// Parameters controlling tree construction.
///
/// All fields have defaults, so `TreeConfigBuilder::default().build()` always
/// succeeds and equals [`TreeConfig::default`]. Out-of-range values are
/// tolerated rather than rejected: a zero `leaf_capacity` behaves as one, and
/// a `max_depth` beyond [`MAX_TREE_DEPTH`] is clamped.
pub struct TreeConfig<T>
where
    T: CoordinateScalar,
{
    /// Vertices a leaf may hold before splitting (unless at `max_depth`).
    #[builder(default = "DEFAULT_LEAF_CAPACITY")]
    leaf_capacity: usize,
    /// Maximum node depth; the root is at depth 0.
    #[builder(default = "DEFAULT_MAX_DEPTH")]
    max_depth: usize,
    /// Corner merge tolerance.
    #[builder(default)]
    tolerance: MergeTolerance<T>,
}

impl<T> TreeConfig<T>
where
    T: CoordinateScalar,
{
    /// The configured leaf capacity.
    #[inline]
    #[must_use]
    pub const fn leaf_capacity(&self) -> usize {
        self.leaf_capacity
    }

    /// The configured maximum depth.
    #[inline]
    #[must_use]
    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The configured merge tolerance.
    #[inline]
    #[must_use]
    pub const fn tolerance(&self) -> MergeTolerance<T> {
        self.tolerance
    }

    /// Leaf capacity as used by the builder: at least one.
    #[inline]
    #[must_use]
    pub fn effective_leaf_capacity(&self) -> usize {
        self.leaf_capacity.max(1)
    }

    /// Maximum depth as used by the builder: clamped to [`MAX_TREE_DEPTH`].
    #[inline]
    #[must_use]
    pub fn effective_max_depth(&self) -> usize {
        self.max_depth.min(MAX_TREE_DEPTH)
    }
}

impl<T> Default for TreeConfig<T>
where
    T: CoordinateScalar,
{
    fn default() -> Self {
        Self {
            leaf_capacity: DEFAULT_LEAF_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
            tolerance: MergeTolerance::default(),
        }
    }
}
