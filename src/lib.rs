//! # orthtree
//!
//! A spatial index for point location over unstructured meshes. The tree is
//! built once from a mesh's element set, deduplicates near-coincident
//! corners into shared vertices, and partitions the vertices into an orthant
//! tree (quadtree in 2D, octree in 3D, `2^D`-ary in general) that answers
//! "which element contains this point" queries.
//!
//! # Features
//!
//! - d-dimensional orthant trees over any [`ElementMesh`](core::traits::mesh::ElementMesh) (1D up to 8D)
//! - Vertex deduplication with configurable absolute or scale-relative merge tolerance
//! - Generic floating-point coordinate types (`f32`, `f64`, and other types implementing `CoordinateScalar`)
//! - Deterministic point location with documented tie-breaking on shared boundaries
//! - Lazy leaf and per-level traversal views
//! - Lock-free tree sharing and republication via [`TreeSlot`](core::slot::TreeSlot)
//! - Serialization/Deserialization of configuration, bounds and statistics with [serde](https://serde.rs)
//!
//! # Basic Usage
//!
//! The tree reads a mesh through the [`ElementMesh`](core::traits::mesh::ElementMesh)
//! trait: an iterable element set where each element exposes corner
//! coordinates and an inside test. Here is a mesh of two axis-aligned cells
//! sharing an edge:
//!
//! ```rust
//! use orthtree::prelude::*;
//!
//! struct Cells(Vec<(Point<f64, 2>, Point<f64, 2>)>);
//!
//! impl ElementMesh<f64, 2> for Cells {
//!     type ElementId = usize;
//!     fn element_count(&self) -> usize {
//!         self.0.len()
//!     }
//!     fn elements(&self) -> impl Iterator<Item = usize> + '_ {
//!         0..self.0.len()
//!     }
//!     fn corners(&self, element: usize) -> impl Iterator<Item = Point<f64, 2>> + '_ {
//!         let (lo, hi) = self.0[element];
//!         [lo, Point::new([hi[0], lo[1]]), Point::new([lo[0], hi[1]]), hi].into_iter()
//!     }
//!     fn contains(&self, element: usize, point: &Point<f64, 2>) -> bool {
//!         let (lo, hi) = self.0[element];
//!         (0..2).all(|axis| point[axis] >= lo[axis] && point[axis] <= hi[axis])
//!     }
//! }
//!
//! let mesh = Cells(vec![
//!     (Point::new([0.0, 0.0]), Point::new([1.0, 1.0])),
//!     (Point::new([1.0, 0.0]), Point::new([2.0, 1.0])),
//! ]);
//!
//! let tree = Orthtree::new(mesh).unwrap();
//!
//! // the four corners on the shared edge collapsed into two vertices
//! assert_eq!(tree.vertex_count(), 6);
//!
//! // interior queries resolve to their cell
//! assert_eq!(tree.find_entity(&Point::new([0.5, 0.5])).unwrap(), 0);
//! assert_eq!(tree.find_entity(&Point::new([1.5, 0.5])).unwrap(), 1);
//!
//! // a query on the shared edge is in both cells; the first-registered
//! // element wins, deterministically
//! assert_eq!(tree.find_entity(&Point::new([1.0, 0.5])).unwrap(), 0);
//!
//! // outside the mesh box entirely
//! assert!(matches!(
//!     tree.find_entity(&Point::new([5.0, 0.5])),
//!     Err(PointLocationError::OutOfDomain)
//! ));
//!
//! // shape statistics, printable via Display
//! let stats = tree.stats();
//! assert_eq!(stats.num_vertices, 6);
//! println!("{stats}");
//! ```
//!
//! # Point Location Semantics
//!
//! [`find_entity`](core::tree::Orthtree::find_entity) first rejects points
//! outside the mesh bounding box with
//! [`PointLocationError::OutOfDomain`](core::tree::PointLocationError), then
//! descends to the owning leaf and tests the elements incident to the leaf's
//! vertices, in vertex registration order, each element at most once. The
//! first inclusive containment test wins. Two distinct failure modes fall
//! out of this:
//!
//! - **`OutOfDomain`** – the point missed the indexed domain box entirely.
//! - **`PointNotFound`** – the point is inside the box but in a gap or hole
//!   of the mesh; no candidate element contains it.
//!
//! Because candidate order is derived from registration order, repeated
//! queries and rebuilds over the same mesh give the same answers, including
//! for points on shared element boundaries.
//!
//! # Sharing and Rebuilds
//!
//! A built tree is immutable: every query takes `&self`, so wrapping the
//! tree in an `Arc` makes concurrent reads safe without locks. The tree does
//! not adapt in place; when the mesh changes, build a new tree and publish
//! it through a [`TreeSlot`](core::slot::TreeSlot), which swaps the current
//! `Arc` atomically while readers of the old tree finish undisturbed.
//!
//! # Limitations
//!
//! 1. **Dimension cap** - Each split materializes `2^D` children, so the
//!    partitioning is limited to `1..=8` dimensions; construction rejects
//!    anything else with a typed error.
//! 2. **Tolerance is a modeling choice** - The default merge tolerance is
//!    ten machine epsilons relative to the largest mesh extent. Meshes with
//!    intentional features finer than that will see corners merged;
//!    configure an absolute tolerance (or zero to disable merging) via
//!    [`TreeConfig`](core::config::TreeConfig).
//! 3. **Element containment is the mesh's word** - The tree trusts the
//!    mesh's inside test. An inconsistent test (e.g. excluding boundaries
//!    that corners lie on) surfaces as `PointNotFound` near edges.

// Forbid unsafe code throughout the entire crate
#![forbid(unsafe_code)]

#[macro_use]
extern crate derive_builder;

/// The `core` module contains the tree data structures and algorithms:
/// construction, vertex registration, point location, views and statistics.
pub mod core {
    /// High-performance collection types backing the tree internals
    pub mod collections;
    pub mod config;
    pub mod node;
    mod registry;
    pub mod slot;
    pub mod stats;
    pub mod tree;
    pub mod vertex;
    pub mod views;
    /// Traits for the meshes a tree can index.
    pub mod traits {
        pub mod mesh;
        pub use mesh::*;
    }
    // Re-export the `core` modules.
    pub use config::*;
    pub use node::*;
    pub use slot::*;
    pub use stats::*;
    pub use traits::*;
    pub use tree::*;
    pub use vertex::*;
    pub use views::*;
    // Note: collections module not re-exported here to avoid namespace pollution
    // Import specific types via prelude or use crate::core::collections::
}

/// Contains geometric types: the `Point` struct, bounding boxes and distance
/// helpers.
///
/// Coordinates are abstracted through the `CoordinateScalar` trait, which
/// provides generic floating-point support (for `f32`, `f64`) with proper
/// NaN handling, validation and hashing.
pub mod geometry {
    pub mod bounding_box;
    pub mod point;
    /// Geometric utility functions: norms and distances
    pub mod util;
    /// Coordinate abstractions and scalar trait definitions.
    pub mod traits {
        pub mod coordinate;
        pub use coordinate::*;
    }
    pub use bounding_box::*;
    pub use point::*;
    pub use traits::*;
    pub use util::*;
}

/// A prelude module that re-exports commonly used types.
/// This makes it easier to import the most commonly used items from the crate.
pub mod prelude {
    // Re-export from core
    pub use crate::core::{
        config::*, node::*, slot::*, stats::*, traits::mesh::*, tree::*, vertex::*, views::*,
    };

    // Re-export commonly used collection types from core::collections
    pub use crate::core::collections::{
        FastHashMap, FastHashSet, SmallBuffer, fast_hash_map_with_capacity,
        fast_hash_set_with_capacity,
    };

    // Re-export from geometry
    pub use crate::geometry::{bounding_box::*, point::*, traits::coordinate::*, util::*};
}

/// The function `is_normal` checks that structs implement `auto` traits.
/// Traits are checked at compile time, so this function is only used for
/// testing.
#[must_use]
pub const fn is_normal<T: Sized + Send + Sync + Unpin>() -> bool {
    true
}

// =============================================================================
// TESTS
// =============================================================================
