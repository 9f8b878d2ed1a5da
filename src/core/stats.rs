//! Aggregate tree shape statistics.
//!
//! [`TreeStats`] is a plain snapshot computed on demand by walking the built
//! tree; it holds no references into it. Averages over an empty denominator
//! (a tree with no leaves, say) are reported as zero rather than NaN so the
//! numbers stay printable and comparable.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shape summary of a built tree.
///
/// The [`Display`](fmt::Display) impl prints one metric per line, counts
/// first, then the four averages to three decimals:
///
/// ```text
/// number of nodes: 5
/// number of leaves: 4
/// average depth: 0.800
/// average leaf depth: 1.000
/// average vertices per node: 0.800
/// average entities per leaf: 1.500
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeStats {
    /// Total nodes, interior and leaf.
    pub num_nodes: usize,
    /// Leaf nodes only.
    pub num_leaves: usize,
    /// Deduplicated vertices stored in the tree.
    pub num_vertices: usize,
    /// Mean depth over all nodes (root at depth 0).
    pub ave_depth: f64,
    /// Mean depth over leaves.
    pub ave_leaf_depth: f64,
    /// Mean vertex count over all nodes; interior nodes count as zero.
    pub ave_vertices_per_node: f64,
    /// Mean number of DISTINCT incident elements over leaves.
    pub ave_entities_per_leaf: f64,
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "number of nodes: {}", self.num_nodes)?;
        writeln!(f, "number of leaves: {}", self.num_leaves)?;
        writeln!(f, "average depth: {:.3}", self.ave_depth)?;
        writeln!(f, "average leaf depth: {:.3}", self.ave_leaf_depth)?;
        writeln!(f, "average vertices per node: {:.3}", self.ave_vertices_per_node)?;
        write!(f, "average entities per leaf: {:.3}", self.ave_entities_per_leaf)
    }
}

/// Running sums for one walk over the tree.
#[derive(Debug, Default)]
pub(crate) struct StatsAccumulator {
    num_nodes: usize,
    num_leaves: usize,
    depth_sum: usize,
    leaf_depth_sum: usize,
    vertex_sum: usize,
    entity_sum: usize,
}

impl StatsAccumulator {
    pub(crate) fn record_interior(&mut self, depth: usize) {
        self.num_nodes += 1;
        self.depth_sum += depth;
    }

    pub(crate) fn record_leaf(&mut self, depth: usize, vertex_count: usize, distinct_entities: usize) {
        self.num_nodes += 1;
        self.depth_sum += depth;
        self.num_leaves += 1;
        self.leaf_depth_sum += depth;
        self.vertex_sum += vertex_count;
        self.entity_sum += distinct_entities;
    }

    pub(crate) fn finish(self, num_vertices: usize) -> TreeStats {
        TreeStats {
            num_nodes: self.num_nodes,
            num_leaves: self.num_leaves,
            num_vertices,
            ave_depth: ratio(self.depth_sum, self.num_nodes),
            ave_leaf_depth: ratio(self.leaf_depth_sum, self.num_leaves),
            ave_vertices_per_node: ratio(self.vertex_sum, self.num_nodes),
            ave_entities_per_leaf: ratio(self.entity_sum, self.num_leaves),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
fn ratio(sum: usize, count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        sum as f64 / count as f64
    }
}
