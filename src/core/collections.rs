//! Collection aliases used throughout the crate.
//!
//! Internal lookups all go through the fast non-cryptographic hasher and the
//! slotmap storage backend; small per-vertex buffers stay inline on the stack.
//! Centralizing the aliases here keeps the concrete choices swappable without
//! touching call sites.

use crate::core::vertex::VertexKey;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet, FxHasher};
use slotmap::{SlotMap, SparseSecondaryMap};
use smallvec::SmallVec;

// =============================================================================
// STORAGE BACKEND
// =============================================================================

/// Internal storage backend for keyed tree data.
///
/// Vertices and nodes live in slotmaps so that cross-references are stable
/// generational keys rather than raw pointers or bare indices. The alias
/// should not appear in public API signatures; public methods return
/// iterators or references instead.
pub type StorageMap<K, V> = SlotMap<K, V>;

/// Sparse secondary map for auxiliary per-vertex data.
///
/// The idiomatic way to hang algorithm state off [`StorageMap`] keys without
/// widening the stored vertex type. Only vertices that have data allocate an
/// entry.
pub type VertexSecondaryMap<V> = SparseSecondaryMap<VertexKey, V>;

// =============================================================================
// FAST HASH COLLECTIONS
// =============================================================================

/// `HashMap` with a fast non-cryptographic hasher.
///
/// Not DoS-resistant; use only with trusted, internal keys.
///
/// # Examples
///
/// ```
/// use orthtree::core::collections::FastHashMap;
///
/// let mut map: FastHashMap<u64, usize> = FastHashMap::default();
/// map.insert(123, 456);
/// ```
pub type FastHashMap<K, V> = FxHashMap<K, V>;

/// `HashSet` with a fast non-cryptographic hasher.
///
/// Not DoS-resistant; use only with trusted, internal keys.
///
/// # Examples
///
/// ```
/// use orthtree::core::collections::FastHashSet;
///
/// let mut set: FastHashSet<u64> = FastHashSet::default();
/// set.insert(789);
/// assert!(set.contains(&789));
/// ```
pub type FastHashSet<T> = FxHashSet<T>;

/// Fast non-cryptographic hasher backing [`FastHashMap`] and [`FastHashSet`].
pub type FastHasher = FxHasher;

/// Build hasher that instantiates [`FastHasher`].
pub type FastBuildHasher = FxBuildHasher;

/// Re-export of the Entry enum for [`FastHashMap`] check-and-insert patterns.
pub use std::collections::hash_map::Entry;

// =============================================================================
// SMALL BUFFERS
// =============================================================================

/// Small-optimized Vec: stack allocation up to `N` elements, heap beyond.
///
/// # Examples
///
/// ```
/// use orthtree::core::collections::SmallBuffer;
///
/// let mut buffer: SmallBuffer<i32, 8> = SmallBuffer::new();
/// for i in 0..5 {
///     buffer.push(i); // all stack allocated
/// }
/// assert!(!buffer.spilled());
/// ```
pub type SmallBuffer<T, const N: usize> = SmallVec<[T; N]>;

/// Inline capacity for per-vertex incident-element lists.
///
/// Mesh vertices typically touch a handful of elements (a corner of a regular
/// hexahedral grid touches 8), so this keeps the common case off the heap.
pub const INLINE_INCIDENT_COUNT: usize = 8;

// =============================================================================
// UTILITY FUNCTIONS
// =============================================================================

/// Creates a [`FastHashMap`] with pre-allocated capacity and the fast hasher.
///
/// # Examples
///
/// ```
/// use orthtree::core::collections::fast_hash_map_with_capacity;
///
/// let map = fast_hash_map_with_capacity::<u64, usize>(1000);
/// assert!(map.capacity() >= 1000);
/// ```
#[inline]
#[must_use]
pub fn fast_hash_map_with_capacity<K, V>(capacity: usize) -> FastHashMap<K, V> {
    FastHashMap::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}

/// Creates a [`FastHashSet`] with pre-allocated capacity and the fast hasher.
///
/// # Examples
///
/// ```
/// use orthtree::core::collections::fast_hash_set_with_capacity;
///
/// let set = fast_hash_set_with_capacity::<u64>(500);
/// assert!(set.capacity() >= 500);
/// ```
#[inline]
#[must_use]
pub fn fast_hash_set_with_capacity<T>(capacity: usize) -> FastHashSet<T> {
    FastHashSet::with_capacity_and_hasher(capacity, FastBuildHasher::default())
}
