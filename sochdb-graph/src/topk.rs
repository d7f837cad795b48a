// SPDX-License-Identifier: AGPL-3.0-or-later
// SochDB - LLM-Optimized Embedded Database
// Copyright (C) 2026 Sushanth Reddy Vanagala (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Bounded Top-K Reducer
//!
//! Keeps the K smallest-distance filter-passing candidates seen across any
//! number of batches without re-sorting on every batch.
//!
//! ## Algorithm
//!
//! Max-heap keyed by distance; the root is always the current worst retained
//! candidate. A newcomer replaces the root only when it is *strictly* closer,
//! so an already-admitted candidate is never displaced by an equal-distance
//! newcomer. Changing that tie policy changes observable results.
//!
//! - absorb: O(log K) per candidate
//! - finalize: O(K log K), non-mutating

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::types::Candidate;

/// Heap entry ordered by distance, then id, so the root is the worst.
#[derive(Debug, Clone, Copy)]
struct WorstFirst(Candidate);

impl PartialEq for WorstFirst {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for WorstFirst {}

impl PartialOrd for WorstFirst {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for WorstFirst {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .distance
            .total_cmp(&other.0.distance)
            .then_with(|| self.0.id.cmp(&other.0.id))
    }
}

/// Ascending (distance, id) order used for every sorted result in the crate
#[inline]
pub fn ascending(left: &Candidate, right: &Candidate) -> Ordering {
    left.distance
        .total_cmp(&right.distance)
        .then_with(|| left.id.cmp(&right.id))
}

/// Upper bound on the heap reserved up front; larger K grows on demand
const MAX_PREALLOC: usize = 1024;

/// Bounded reducer over candidate batches
#[derive(Debug, Clone)]
pub struct TopKReducer {
    top_k: usize,
    heap: BinaryHeap<WorstFirst>,
}

impl TopKReducer {
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k,
            heap: BinaryHeap::with_capacity(top_k.min(MAX_PREALLOC)),
        }
    }

    /// Target K
    pub fn k(&self) -> usize {
        self.top_k
    }

    /// Number of retained candidates (never exceeds K)
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Distance of the current worst retained candidate
    pub fn worst_distance(&self) -> Option<f32> {
        self.heap.peek().map(|entry| entry.0.distance)
    }

    /// Absorb one candidate. Filtered-out candidates are ignored.
    #[inline]
    pub fn absorb(&mut self, candidate: Candidate) {
        if !candidate.passed_filter || self.top_k == 0 {
            return;
        }

        if self.heap.len() < self.top_k {
            self.heap.push(WorstFirst(candidate));
            return;
        }

        if let Some(mut worst) = self.heap.peek_mut() {
            // ties keep the incumbent
            if candidate.distance < worst.0.distance {
                *worst = WorstFirst(candidate);
            }
        }
    }

    /// Absorb a batch in container order
    pub fn absorb_batch(&mut self, batch: &[Candidate]) {
        for &candidate in batch {
            self.absorb(candidate);
        }
    }

    /// Ascending-distance snapshot of the retained set. Does not consume the
    /// reducer, so it can be called repeatedly between batches.
    pub fn finalize(&self) -> Vec<Candidate> {
        let mut sorted: Vec<Candidate> = self.heap.iter().map(|entry| entry.0).collect();
        sorted.sort_by(ascending);
        sorted
    }
}
