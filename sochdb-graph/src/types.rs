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

//! Core data types shared by the searcher, the reducer and the disk engine.

use serde::{Deserialize, Serialize};

/// Dense node identifier. Node `i` of a graph lives at position `i`.
pub type NodeId = u32;

/// A node of an immutable proximity graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: NodeId,
    pub embedding: Vec<f32>,
    pub neighbors: Vec<NodeId>,
}

impl GraphNode {
    pub fn new(id: NodeId, embedding: Vec<f32>, neighbors: Vec<NodeId>) -> Self {
        Self {
            id,
            embedding,
            neighbors,
        }
    }
}

/// A k-NN query with an optional eligibility bitmap
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: Vec<f32>,
    pub top_k: usize,
    /// One byte per node id, `1` means the node may be returned.
    /// Empty, or shorter than a node id, means eligible.
    pub filter_bitmap: Vec<u8>,
}

impl SearchRequest {
    pub fn new(query: Vec<f32>, top_k: usize) -> Self {
        Self {
            query,
            top_k,
            filter_bitmap: Vec::new(),
        }
    }

    /// Attach an eligibility bitmap
    pub fn with_filter(mut self, filter_bitmap: Vec<u8>) -> Self {
        self.filter_bitmap = filter_bitmap;
        self
    }

    /// Whether `node_id` may appear in the result set.
    ///
    /// The bitmap only gates admission to the result; traversal never
    /// consults it.
    #[inline]
    pub fn passes_filter(&self, node_id: NodeId) -> bool {
        match self.filter_bitmap.get(node_id as usize) {
            Some(&flag) => flag == 1,
            None => true,
        }
    }
}

/// A scored node produced during traversal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: NodeId,
    /// Euclidean distance to the query, never negative
    pub distance: f32,
    pub passed_filter: bool,
}

impl Candidate {
    pub fn new(id: NodeId, distance: f32, passed_filter: bool) -> Self {
        Self {
            id,
            distance,
            passed_filter,
        }
    }
}

/// Per-search counters. Purely observational.
///
/// Searches add into the stats they are given, so pass a fresh value per
/// measurement window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Nodes popped from the frontier and scored
    pub visited: usize,
    /// Scored nodes rejected by the filter bitmap
    pub filtered_nodes: usize,
    /// Wall time spent waiting on neighbor fetches
    pub prefetch_us: u64,
    /// Wall time spent computing distances and filter status
    pub compute_us: u64,
    /// Number of waves (one per node for the baseline)
    pub waves: usize,
}

impl SearchStats {
    /// Average nodes per wave
    pub fn avg_wave_size(&self) -> f32 {
        if self.waves == 0 {
            0.0
        } else {
            self.visited as f32 / self.waves as f32
        }
    }
}
