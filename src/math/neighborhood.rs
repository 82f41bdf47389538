//! Spatial indices for k-nearest neighbor search in nD space.
//!
//! ## Purpose
//!
//! This module implements the two neighbor indices used by the estimator: a
//! KD-tree for Minkowski-family metrics and an exhaustive index for opaque
//! metrics, selected once per variable behind [`NeighborIndex`].
//!
//! ## Design notes
//!
//! * **Static Construction**: Indices are built once per variable and then only queried.
//! * **Eytzinger Layout**: Tree nodes are stored in a left-complete binary tree
//!   (array) layout for cache locality.
//! * **Trait-based Distance**: The tree is generic over [`PointDistance`].
//! * **Shared Results**: Both indices fill the same [`Neighborhood`] structure.
//!
//! ## Key concepts
//!
//! * **Splitting Plane**: The dimension and value used to split points at each node.
//! * **Implicit Navigation**: Child nodes are accessed via arithmetic ($2i+1$, $2i+2$).
//! * **Pruning**: Skipping branches that cannot contain nearer neighbors.
//!
//! ## Invariants
//!
//! * Queries always return the exact nearest neighbors (no approximation).
//! * Results are ordered by ascending distance, ties by ascending point index.
//! * At most `min(k, n)` neighbors are returned; queries never panic on large `k`.
//!
//! ## Non-goals
//!
//! * This module does not support dynamic insertions or deletions.
//! * This module does not validate `k` against the data size (see the validator).

// Feature-gated imports
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::cmp::Ordering::{self, Equal};
use num_traits::Float;

// Internal dependencies
use crate::math::distance::{DistanceMetric, Metric, PointDistance};
use crate::primitives::buffer::{NeighborhoodSearchBuffer, NeighborhoodStorage};

// ============================================================================
// Helper Types
// ============================================================================

/// Helper structure for the max-heap used during search.
/// Orders by distance (the second field), then by point index.
#[derive(Debug, Clone, Copy)]
pub struct NodeDistance<T>(pub usize, pub T);

impl<T: PartialOrd> PartialEq for NodeDistance<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Equal
    }
}
impl<T: PartialOrd> Eq for NodeDistance<T> {}

impl<T: PartialOrd> PartialOrd for NodeDistance<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<T: PartialOrd> Ord for NodeDistance<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.1
            .partial_cmp(&other.1)
            .unwrap_or(Equal)
            .then(self.0.cmp(&other.0))
    }
}

// ============================================================================
// Neighborhood Structure
// ============================================================================

/// Result container for k-nearest neighbor search.
#[derive(Debug, Clone)]
pub struct Neighborhood<T> {
    /// Indices of the k nearest neighbors, nearest first.
    pub indices: Vec<usize>,
    /// Distances to each neighbor (corresponding to indices).
    pub distances: Vec<T>,
    /// Maximum distance in the neighborhood.
    pub max_distance: T,
}

impl<T: Float> Neighborhood<T> {
    /// Create a new empty neighborhood.
    pub fn new() -> Self {
        Self {
            indices: Vec::new(),
            distances: Vec::new(),
            max_distance: T::zero(),
        }
    }

    /// Pre-allocate buffers for a neighborhood of size k.
    pub fn with_capacity(k: usize) -> Self {
        Self {
            indices: Vec::with_capacity(k),
            distances: Vec::with_capacity(k),
            max_distance: T::zero(),
        }
    }

    /// Returns the number of neighbors currently stored.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Returns true if no neighbors are stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    fn reset(&mut self) {
        self.indices.clear();
        self.distances.clear();
        self.max_distance = T::zero();
    }

    /// Drain a search heap into this neighborhood, nearest first.
    fn fill_from_heap<F: Fn(T) -> T>(
        &mut self,
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
        post_process: F,
    ) {
        self.reset();
        // `into_sorted_vec` would move the heap out of the reusable buffer.
        let heap = core::mem::take(&mut buffer.heap);
        let mut sorted = heap.into_sorted_vec();
        for &NodeDistance(idx, dist) in sorted.iter() {
            self.indices.push(idx);
            self.distances.push(post_process(dist));
        }
        self.max_distance = self.distances.last().copied().unwrap_or(T::zero());
        sorted.clear();
        buffer.heap = sorted.into();
    }
}

impl<T: Float> NeighborhoodStorage for Neighborhood<T> {
    fn with_capacity(k: usize) -> Self {
        Self::with_capacity(k)
    }
    fn capacity(&self) -> usize {
        self.indices.capacity()
    }
}

impl<T: Float> Default for Neighborhood<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// KD-Tree Implementation
// ============================================================================

/// Compressed node structure for Eytzinger layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct KDNode {
    /// Index of the point in the original flattened data array.
    pub index: usize,
}

/// KD-tree for spatial indexing of nD points.
#[derive(Debug, Clone)]
pub struct KDTree<T: Float> {
    /// The implicit Eytzinger tree nodes.
    nodes: Vec<KDNode>,
    /// Permuted points aligned with the nodes for cache locality.
    points: Vec<T>,
    /// Dimensionality of the data.
    dimensions: usize,
}

impl<T: Float> KDTree<T> {
    /// Largest dimensionality the packed traversal stack can address.
    pub const MAX_DIMENSIONS: usize = 0xFF;

    // ------------------------------------------------------------------------
    // Public API
    // ------------------------------------------------------------------------

    /// Build a KD-tree from a flattened (row-major) coordinate array.
    ///
    /// The tree is built using a left-complete Eytzinger layout, reordering the
    /// input points for cache locality during search.
    pub fn new(points: &[T], dimensions: usize) -> Self {
        debug_assert!(dimensions > 0 && dimensions <= Self::MAX_DIMENSIONS);
        let n = points.len() / dimensions;
        let mut indices: Vec<usize> = (0..n).collect();

        // Eytzinger layout requires the vector to be full size to allow access during build.
        let mut nodes = vec![KDNode::default(); n];
        let mut permuted_points = vec![T::zero(); n * dimensions];

        Self::build_recursive(
            points,
            dimensions,
            &mut indices,
            0,
            &mut nodes,
            &mut permuted_points,
            0,
        );

        Self {
            nodes,
            points: permuted_points,
            dimensions,
        }
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree holds no points.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Dimensionality of the indexed points.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Search for the k nearest neighbors of `query`.
    ///
    /// Uses the provided buffer and neighborhood structure to avoid allocations.
    pub fn find_k_nearest<D: PointDistance<T>>(
        &self,
        query: &[T],
        k: usize,
        dist_calc: &D,
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
        neighborhood: &mut Neighborhood<T>,
    ) {
        if k == 0 || self.nodes.is_empty() {
            neighborhood.reset();
            return;
        }

        buffer.clear();
        self.search_iterative(query, k, dist_calc, buffer);
        neighborhood.fill_from_heap(buffer, |d| dist_calc.post_process_distance(d));
    }

    // ------------------------------------------------------------------------
    // Private Helpers & Algorithms
    // ------------------------------------------------------------------------

    /// Recursively builds the tree in Eytzinger layout.
    fn build_recursive(
        points: &[T],
        dims: usize,
        indices: &mut [usize],
        depth: usize,
        nodes: &mut [KDNode],
        permuted_points: &mut [T],
        curr_idx: usize,
    ) {
        if indices.is_empty() {
            return;
        }

        let axis = depth % dims;
        let n = indices.len();

        // Pivot rank for a left-complete tree keeps the Eytzinger property
        let median_idx = Self::calculate_left_subtree_size(n);

        indices.select_nth_unstable_by(median_idx, |&a, &b| {
            points[a * dims + axis]
                .partial_cmp(&points[b * dims + axis])
                .unwrap_or(Equal)
                .then(a.cmp(&b))
        });

        let point_idx = indices[median_idx];
        nodes[curr_idx] = KDNode { index: point_idx };

        let src_start = point_idx * dims;
        let dest_start = curr_idx * dims;
        permuted_points[dest_start..dest_start + dims]
            .copy_from_slice(&points[src_start..src_start + dims]);

        let (left_part, right_part_with_median) = indices.split_at_mut(median_idx);
        let right_part = &mut right_part_with_median[1..];

        Self::build_recursive(
            points,
            dims,
            left_part,
            depth + 1,
            nodes,
            permuted_points,
            2 * curr_idx + 1,
        );
        Self::build_recursive(
            points,
            dims,
            right_part,
            depth + 1,
            nodes,
            permuted_points,
            2 * curr_idx + 2,
        );
    }

    /// Iterative search using an explicit stack for traversal.
    ///
    /// `(node_idx, axis)` is bit-packed into a single `usize` on the stack:
    /// - `node_idx`: High bits (>> 8)
    /// - `axis`: Low 8 bits (& 0xFF)
    #[inline]
    fn search_iterative<D: PointDistance<T>>(
        &self,
        query: &[T],
        k: usize,
        dist_calc: &D,
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
    ) {
        let d = self.dimensions;
        let heap = &mut buffer.heap;
        let stack = &mut buffer.stack;
        let nodes_len = self.nodes.len();

        let mut heap_full = false;
        let mut max_dist = T::infinity();

        stack.push(0);

        while let Some(packed) = stack.pop() {
            let axis = packed & 0xFF;
            let node_idx = packed >> 8;

            let node = self.nodes[node_idx];
            let offset = node_idx * d;
            let node_point = &self.points[offset..offset + d];

            // 1. Process current node
            let dist = dist_calc.reduced_distance(query, node_point);
            let candidate = NodeDistance(node.index, dist);
            if !heap_full {
                heap.push(candidate);
                if heap.len() == k {
                    heap_full = true;
                    max_dist = heap.peek().map(|nd| nd.1).unwrap_or(T::infinity());
                }
            } else if heap.peek().is_some_and(|top| candidate < *top) {
                if let Some(mut top) = heap.peek_mut() {
                    *top = candidate;
                }
                max_dist = heap.peek().map(|nd| nd.1).unwrap_or(T::infinity());
            }

            // 2. Leaf check: implicit left child is at 2*i + 1
            let left_child = 2 * node_idx + 1;
            if left_child >= nodes_len {
                continue;
            }

            let split_val = node_point[axis];
            let diff = query[axis] - split_val;

            let right_child = left_child + 1;
            let has_right = right_child < nodes_len;
            let next_axis = if axis + 1 == d { 0 } else { axis + 1 };

            let packed_left = (left_child << 8) | next_axis;
            let packed_right = (right_child << 8) | next_axis;

            // If diff <= 0, query is on the left side -> Near=Left, Far=Right
            let (near_packed, far_packed, near_exists, far_exists) = if diff <= T::zero() {
                (packed_left, packed_right, true, has_right)
            } else {
                (packed_right, packed_left, has_right, true)
            };

            // 3. Pruning: the far side is only visited if it can hold a point
            //    at least as close as the current k-th best (ties included).
            if far_exists {
                let dist_to_plane = dist_calc.split_reduced_distance(axis, split_val, query[axis]);
                if !heap_full || dist_to_plane <= max_dist {
                    stack.push(far_packed);
                }
            }

            // 4. Near side is pushed last so it is explored first
            if near_exists {
                stack.push(near_packed);
            }
        }
    }

    /// Calculate number of nodes in the left subtree of a left-complete binary tree of size N.
    pub fn calculate_left_subtree_size(n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        // Height: H = floor(log2(n))
        let h = (usize::BITS - n.leading_zeros() - 1) as usize;
        if h == 0 {
            return 0;
        }

        let max_leaf_capacity = 1 << h;

        // Nodes in last level R = n - (nodes in full tree of height h-1)
        let total_nodes_above_leaf = max_leaf_capacity - 1;
        let r = n - total_nodes_above_leaf;

        // Left subtree gets the filled portion of the last level
        let left_part_leaves = r.min(max_leaf_capacity / 2);

        let left_subtree_capacity_full = (max_leaf_capacity / 2) - 1;
        left_subtree_capacity_full + left_part_leaves
    }
}

// ============================================================================
// Exhaustive Index
// ============================================================================

/// Exhaustive neighbor index: computes every distance for every query.
///
/// Correct for any metric, including ones that do not decompose over coordinates.
#[derive(Debug, Clone)]
pub struct BruteForce<T> {
    points: Vec<T>,
    dimensions: usize,
}

impl<T: Float> BruteForce<T> {
    /// Index a flattened (row-major) coordinate array.
    pub fn new(points: &[T], dimensions: usize) -> Self {
        Self {
            points: points.to_vec(),
            dimensions,
        }
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len() / self.dimensions.max(1)
    }

    /// Whether the index holds no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Search for the k nearest neighbors of `query` under `distance`.
    pub fn find_k_nearest<F: Fn(&[T], &[T]) -> T>(
        &self,
        query: &[T],
        k: usize,
        distance: F,
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
        neighborhood: &mut Neighborhood<T>,
    ) {
        self.search(query, k, distance, |d| d, buffer, neighborhood);
    }

    /// Search ranking by reduced distance, as the KD-tree does.
    pub fn find_k_nearest_reduced<D: PointDistance<T>>(
        &self,
        query: &[T],
        k: usize,
        dist_calc: &D,
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
        neighborhood: &mut Neighborhood<T>,
    ) {
        self.search(
            query,
            k,
            |a, b| dist_calc.reduced_distance(a, b),
            |d| dist_calc.post_process_distance(d),
            buffer,
            neighborhood,
        );
    }

    fn search<F, P>(
        &self,
        query: &[T],
        k: usize,
        key: F,
        post_process: P,
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
        neighborhood: &mut Neighborhood<T>,
    ) where
        F: Fn(&[T], &[T]) -> T,
        P: Fn(T) -> T,
    {
        if k == 0 || self.points.is_empty() {
            neighborhood.reset();
            return;
        }

        buffer.clear();
        let heap = &mut buffer.heap;
        for (idx, point) in self.points.chunks_exact(self.dimensions).enumerate() {
            let candidate = NodeDistance(idx, key(query, point));
            if heap.len() < k {
                heap.push(candidate);
            } else if heap.peek().is_some_and(|top| candidate < *top) {
                if let Some(mut top) = heap.peek_mut() {
                    *top = candidate;
                }
            }
        }
        neighborhood.fill_from_heap(buffer, post_process);
    }
}

// ============================================================================
// Index Selection
// ============================================================================

/// Kind of index chosen for a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// KD-tree over a Minkowski-family metric.
    KdTree,
    /// Exhaustive search.
    BruteForce,
}

/// Neighbor index selected from the metric's search capability.
#[derive(Debug, Clone)]
pub enum NeighborIndex<T: Float> {
    /// Accelerated search for Minkowski-family metrics.
    KdTree {
        /// The tree.
        tree: KDTree<T>,
        /// Metric used for reduced distances and pruning.
        metric: DistanceMetric<T>,
    },
    /// Exhaustive search for any metric.
    BruteForce {
        /// The index.
        index: BruteForce<T>,
        /// Metric evaluated for every point.
        metric: Metric<T>,
    },
}

impl<T: Float> NeighborIndex<T> {
    /// Build the index matching the metric's family.
    ///
    /// Opaque metrics, and dimensionalities beyond what the tree can address,
    /// use exhaustive search.
    pub fn build(points: &[T], dimensions: usize, metric: &Metric<T>) -> Self {
        match metric {
            Metric::Minkowski(m) if dimensions <= KDTree::<T>::MAX_DIMENSIONS => {
                NeighborIndex::KdTree {
                    tree: KDTree::new(points, dimensions),
                    metric: m.clone(),
                }
            }
            _ => Self::exhaustive(points, dimensions, metric.clone()),
        }
    }

    /// Build an exhaustive index regardless of the metric's family.
    pub fn exhaustive(points: &[T], dimensions: usize, metric: Metric<T>) -> Self {
        NeighborIndex::BruteForce {
            index: BruteForce::new(points, dimensions),
            metric,
        }
    }

    /// Kind of index in use.
    pub fn kind(&self) -> IndexKind {
        match self {
            NeighborIndex::KdTree { .. } => IndexKind::KdTree,
            NeighborIndex::BruteForce { .. } => IndexKind::BruteForce,
        }
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        match self {
            NeighborIndex::KdTree { tree, .. } => tree.len(),
            NeighborIndex::BruteForce { index, .. } => index.len(),
        }
    }

    /// Whether the index holds no points.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Search for the k nearest neighbors of `query`.
    pub fn find_k_nearest(
        &self,
        query: &[T],
        k: usize,
        buffer: &mut NeighborhoodSearchBuffer<NodeDistance<T>>,
        neighborhood: &mut Neighborhood<T>,
    ) {
        match self {
            NeighborIndex::KdTree { tree, metric } => {
                tree.find_k_nearest(query, k, metric, buffer, neighborhood)
            }
            NeighborIndex::BruteForce { index, metric } => match metric {
                Metric::Minkowski(m) => {
                    index.find_k_nearest_reduced(query, k, m, buffer, neighborhood)
                }
                Metric::Opaque(m) => {
                    index.find_k_nearest(query, k, |a, b| m.distance(a, b), buffer, neighborhood)
                }
            },
        }
    }
}

