//! Memory management and buffer recycling for per-location estimation.
//!
//! ## Purpose
//!
//! This module provides a reusable workspace (`EstimationBuffer`) so that the
//! per-location loop (neighbor search, weighting, normal-equation assembly and
//! solve) runs without allocating once the buffers have reached their working size.
//!
//! ## Design notes
//!
//! * **Centralized Ownership**: `EstimationBuffer` holds all scratch space needed
//!   by one worker: search state, neighborhood, gathered neighbor data and solver buffers.
//! * **Lazy Expansion**: Buffers grow on demand via `ensure_capacity` and are never shrunk.
//! * **Generic injection**: The workspace is generic over the neighborhood storage
//!   so this layer stays independent of the spatial index implementation.
//!
//! ## Key concepts
//!
//! * **EstimationBuffer**: The top-level struct owned by one worker (sequential
//!   loop or one rayon task).
//! * **NeighborhoodSearchBuffer**: Reusable heap and stack for k-nearest searches.
//! * **FittingBuffer**: Gathered neighbor data and the weighted normal system.
//!
//! ## Invariants
//!
//! * Buffers are only logically cleared between locations, never deallocated.
//! * A buffer is never shared between two locations being solved at the same time.
//!
//! ## Non-goals
//!
//! * Thread-local automatic caching (buffers are passed explicitly, one per worker).

// Feature-gated dependencies
#[cfg(not(feature = "std"))]
use alloc::collections::BinaryHeap;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use std::collections::BinaryHeap;
#[cfg(feature = "std")]
use std::vec::Vec;

// External dependencies
use core::ops::{Deref, DerefMut};

// ============================================================================
// Slot - Unified Vector Abstraction
// ============================================================================

/// A reusable vector slot with automatic capacity management.
#[derive(Debug, Clone)]
pub struct Slot<T>(Vec<T>);

impl<T> Slot<T> {
    /// Create a new slot with the given initial capacity.
    #[inline]
    pub fn new(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Ensure the slot has at least the given capacity.
    /// Grows the underlying vector if needed; never shrinks.
    #[inline]
    pub fn ensure_capacity(&mut self, capacity: usize) {
        if self.0.capacity() < capacity {
            self.0.reserve(capacity - self.0.len());
        }
    }

    /// Clear the slot (sets length to 0, preserves capacity).
    #[inline]
    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl<T: Clone> Slot<T> {
    /// Clear the slot and refill it with `len` copies of `value`.
    #[inline]
    pub fn reset(&mut self, len: usize, value: T) {
        self.0.clear();
        self.0.resize(len, value);
    }
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Deref for Slot<T> {
    type Target = Vec<T>;
    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Slot<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> From<Vec<T>> for Slot<T> {
    fn from(v: Vec<T>) -> Self {
        Self(v)
    }
}

// ============================================================================
// Main Workspace
// ============================================================================

/// Pre-allocated buffers for estimating one query location at a time.
pub struct EstimationBuffer<T, N, NH> {
    /// Buffer for neighbor search state.
    pub search_buffer: NeighborhoodSearchBuffer<N>,
    /// Buffer for neighbor indices and distances.
    pub neighborhood: NH,
    /// Coordinates of the current query location.
    pub query: Slot<T>,
    /// Buffer for the local regression.
    pub fitting_buffer: FittingBuffer<T>,
}

impl<T, N, NH> EstimationBuffer<T, N, NH>
where
    N: Ord,
    NH: NeighborhoodStorage,
{
    /// Create a workspace sized for `k` neighbors in `dims` dimensions.
    pub fn new(k: usize, dims: usize) -> Self {
        Self {
            search_buffer: NeighborhoodSearchBuffer::new(k),
            neighborhood: NH::with_capacity(k),
            query: Slot::new(dims),
            fitting_buffer: FittingBuffer::new(k, dims),
        }
    }

    /// Ensure all buffers have enough capacity for the given problem size.
    pub fn ensure_capacity(&mut self, k: usize, dims: usize) {
        if self.neighborhood.capacity() < k {
            self.neighborhood = NH::with_capacity(k);
            self.search_buffer = NeighborhoodSearchBuffer::new(k);
        }
        self.query.ensure_capacity(dims);
        self.fitting_buffer.ensure_capacity(k, dims);
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Trait for neighborhood storage that can be injected into the workspace.
pub trait NeighborhoodStorage {
    /// Create a new neighborhood storage with given capacity.
    fn with_capacity(k: usize) -> Self;
    /// Get the current capacity of the storage.
    fn capacity(&self) -> usize;
}

// ============================================================================
// Internal Buffers
// ============================================================================

/// Persistent buffers for neighbor search to avoid allocations.
pub struct NeighborhoodSearchBuffer<N> {
    pub(crate) heap: BinaryHeap<N>,
    pub(crate) stack: Vec<usize>,
}

impl<N: Ord> NeighborhoodSearchBuffer<N> {
    /// Create a new search buffer with capacity k.
    pub fn new(k: usize) -> Self {
        // Stack depth is bounded by tree height, typically O(log n).
        Self {
            heap: BinaryHeap::with_capacity(k + 1),
            stack: Vec::with_capacity(32),
        }
    }

    /// Clear all internal buffers for reuse.
    pub fn clear(&mut self) {
        self.heap.clear();
        self.stack.clear();
    }
}

/// Gathered neighbor data for one local regression.
pub struct FittingBuffer<T> {
    /// Neighbor coordinates, row-major (k × d).
    pub neighbor_coords: Slot<T>,
    /// Neighbor values (k).
    pub neighbor_values: Slot<T>,
    /// Kernel weight of each neighbor (diagonal of W).
    pub weights: Slot<T>,
    /// Weighted normal system.
    pub normal: NormalBuffer<T>,
}

impl<T> FittingBuffer<T> {
    /// Create a fitting buffer for `k` neighbors in `dims` dimensions.
    pub fn new(k: usize, dims: usize) -> Self {
        Self {
            neighbor_coords: Slot::new(k * dims),
            neighbor_values: Slot::new(k),
            weights: Slot::new(k),
            normal: NormalBuffer::new(dims + 1),
        }
    }

    /// Ensure buffers have enough capacity for `k` neighbors in `dims` dimensions.
    pub fn ensure_capacity(&mut self, k: usize, dims: usize) {
        self.neighbor_coords.ensure_capacity(k * dims);
        self.neighbor_values.ensure_capacity(k);
        self.weights.ensure_capacity(k);
        self.normal.ensure_capacity(dims + 1);
    }
}

/// Buffers for the weighted normal equations `(AᵗWA) θ = AᵗWz`.
pub struct NormalBuffer<T> {
    /// Design row of the current neighbor, `[1, x - q]`.
    pub design_row: Slot<T>,
    /// Normal matrix AᵗWA (row-major, p × p).
    pub xtw_x: Slot<T>,
    /// Right-hand side AᵗWz; overwritten with θ by the solve.
    pub xtw_z: Slot<T>,
    /// Augmented query vector; overwritten with (AᵗWA)⁻¹x̃ by the solve.
    pub query_rhs: Slot<T>,
}

impl<T> NormalBuffer<T> {
    /// Create buffers for `n_coeffs` regression coefficients.
    pub fn new(n_coeffs: usize) -> Self {
        Self {
            design_row: Slot::new(n_coeffs),
            xtw_x: Slot::new(n_coeffs * n_coeffs),
            xtw_z: Slot::new(n_coeffs),
            query_rhs: Slot::new(n_coeffs),
        }
    }

    /// Ensure buffers have enough capacity for `n_coeffs` coefficients.
    pub fn ensure_capacity(&mut self, n_coeffs: usize) {
        self.design_row.ensure_capacity(n_coeffs);
        self.xtw_x.ensure_capacity(n_coeffs * n_coeffs);
        self.xtw_z.ensure_capacity(n_coeffs);
        self.query_rhs.ensure_capacity(n_coeffs);
    }
}
