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

//! SochDB Graph Search Core
//!
//! Graph-side building blocks for approximate nearest neighbor search.
//!
//! ## Components
//!
//! - **TopKReducer** (`topk`): bounded max-heap that keeps the K closest
//!   filter-passing candidates across any number of batches.
//!
//! - **GraphSearcher** (`searcher`): BFS traversal of an immutable proximity
//!   graph. `search_baseline` serializes compute and neighbor fetch;
//!   `search_optimized` drains the frontier in waves and overlaps one
//!   prefetch task per wave node with distance computation.
//!
//! - **VersionedGraph** (`versioned_graph`): live-mutable adjacency with
//!   per-node version counters. Readers never block on a writer for longer
//!   than one copy; a read is accepted only when the version observed before
//!   and after the copy matches.
//!
//! ## Concurrency
//!
//! The only shared mutable state lives inside `VersionedGraph`. The searcher
//! and reducer are thread-confined per query; the searcher starts one scoped
//! thread per wave node for the duration of each wave's prefetch.

pub mod config;
pub mod distance;
pub mod searcher;
pub mod topk;
pub mod types;
pub mod versioned_graph;

pub use config::SearcherConfig;
pub use distance::{MISMATCH_DISTANCE, l2_distance};
pub use searcher::GraphSearcher;
pub use topk::TopKReducer;
pub use types::{Candidate, GraphNode, NodeId, SearchRequest, SearchStats};
pub use versioned_graph::{TraversalStats, VersionedGraph, VersionedNeighbors};
