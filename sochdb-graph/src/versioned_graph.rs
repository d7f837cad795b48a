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

//! Versioned Graph with Optimistic Reads
//!
//! Adjacency storage whose neighbor lists can be replaced while traversals
//! are running.
//!
//! ## Protocol
//!
//! Writers take the lock exclusively, replace the list and bump the node's
//! version in the same critical section. Readers never hold the lock across
//! their whole read:
//!
//! 1. shared lock: capture version `v0`, copy the neighbor list, release
//! 2. shared lock: capture version `v1`, release
//! 3. accept the copy iff `v0 == v1`, otherwise retry
//!
//! A node whose read keeps conflicting past `max_retries` is skipped; the
//! traversal itself never fails.
//!
//! ## Known window
//!
//! The copy and the validation run under two separate shared acquisitions,
//! and writers can run between them. The split lock is deliberate and the
//! window is left open. The contract is only this: a read is valid iff the
//! version observed before the copy equals the version observed after it.
//! Any finer-grained locking scheme must keep that contract.

use std::collections::{HashSet, VecDeque};

use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::config::DEFAULT_MAX_RETRIES;
use crate::types::NodeId;

/// Neighbor lists up to this length stay inline
pub const INLINE_NEIGHBORS: usize = 16;

/// Neighbor list plus its version counter
#[derive(Debug, Clone, Default)]
pub struct VersionedNeighbors {
    pub neighbors: SmallVec<[NodeId; INLINE_NEIGHBORS]>,
    pub version: u64,
}

/// Counters from one OCC traversal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalStats {
    /// Nodes whose neighbor list was read successfully
    pub visited: usize,
    /// Read attempts rejected because the version moved
    pub conflicts: usize,
    /// Nodes dropped after exhausting their retries
    pub skipped: usize,
}

/// Live-mutable adjacency guarded by one reader/writer lock
#[derive(Debug, Default)]
pub struct VersionedGraph {
    nodes: RwLock<Vec<VersionedNeighbors>>,
}

impl VersionedGraph {
    /// Graph of `node_count` nodes with empty neighbor lists at version 0
    pub fn new(node_count: usize) -> Self {
        Self {
            nodes: RwLock::new(vec![VersionedNeighbors::default(); node_count]),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// Current version of `node_id`, `None` when out of range
    pub fn version(&self, node_id: NodeId) -> Option<u64> {
        self.nodes.read().get(node_id as usize).map(|node| node.version)
    }

    /// Replace the neighbor list and bump the version. Out-of-range ids are ignored.
    pub fn set_neighbors(&self, node_id: NodeId, neighbors: Vec<NodeId>) {
        let mut nodes = self.nodes.write();
        let Some(node) = nodes.get_mut(node_id as usize) else {
            tracing::trace!(node_id, "set_neighbors on out-of-range node ignored");
            return;
        };
        node.neighbors = SmallVec::from_vec(neighbors);
        node.version += 1;
    }

    /// Invalidate in-flight reads of `node_id` without changing its list.
    /// Out-of-range ids are ignored.
    pub fn bump_version(&self, node_id: NodeId) {
        let mut nodes = self.nodes.write();
        match nodes.get_mut(node_id as usize) {
            Some(node) => node.version += 1,
            None => tracing::trace!(node_id, "bump_version on out-of-range node ignored"),
        }
    }

    /// Optimistic read of one neighbor list, retried up to `max_retries` times.
    ///
    /// Returns `None` when the node is out of range or every attempt conflicted.
    pub fn read_neighbors(&self, node_id: NodeId, max_retries: usize) -> Option<Vec<NodeId>> {
        let mut conflicts = 0;
        self.read_with_retries(node_id, max_retries, &mut conflicts)
    }

    /// BFS from `entrypoint` using optimistic reads. Returns the visit order.
    pub fn traverse_with_occ(
        &self,
        entrypoint: NodeId,
        max_steps: usize,
        max_retries: usize,
    ) -> Vec<NodeId> {
        self.traverse_with_stats(entrypoint, max_steps, max_retries).0
    }

    /// [`traverse_with_occ`](Self::traverse_with_occ) with the default retry budget
    pub fn traverse(&self, entrypoint: NodeId, max_steps: usize) -> Vec<NodeId> {
        self.traverse_with_occ(entrypoint, max_steps, DEFAULT_MAX_RETRIES)
    }

    /// BFS from `entrypoint` returning the visit order and conflict counters.
    ///
    /// Only successfully read nodes count toward `max_steps`; a node whose
    /// reads all conflict is left out of the order and its neighbors are not
    /// expanded.
    pub fn traverse_with_stats(
        &self,
        entrypoint: NodeId,
        max_steps: usize,
        max_retries: usize,
    ) -> (Vec<NodeId>, TraversalStats) {
        let mut stats = TraversalStats::default();
        let node_count = self.len();
        if (entrypoint as usize) >= node_count {
            return (Vec::new(), stats);
        }

        let mut order = Vec::with_capacity(max_steps.min(node_count));
        let mut frontier = VecDeque::from([entrypoint]);
        let mut dedup = HashSet::from([entrypoint]);

        while order.len() < max_steps {
            let Some(node) = frontier.pop_front() else {
                break;
            };

            let Some(neighbors) = self.read_with_retries(node, max_retries, &mut stats.conflicts)
            else {
                stats.skipped += 1;
                tracing::trace!(node, max_retries, "optimistic read exhausted retries, skipping node");
                continue;
            };

            order.push(node);
            for next in neighbors {
                if (next as usize) >= node_count {
                    continue;
                }
                if dedup.insert(next) {
                    frontier.push_back(next);
                }
            }
        }

        stats.visited = order.len();
        tracing::debug!(
            entrypoint,
            visited = stats.visited,
            conflicts = stats.conflicts,
            skipped = stats.skipped,
            "occ traversal finished"
        );
        (order, stats)
    }

    fn read_with_retries(
        &self,
        node_id: NodeId,
        max_retries: usize,
        conflicts: &mut usize,
    ) -> Option<Vec<NodeId>> {
        for _ in 0..max_retries {
            match self.try_read(node_id) {
                ReadOutcome::Valid(neighbors) => return Some(neighbors),
                ReadOutcome::Conflict => *conflicts += 1,
                ReadOutcome::Missing => return None,
            }
        }
        None
    }

    /// One optimistic attempt: copy under one shared lock, validate under another.
    fn try_read(&self, node_id: NodeId) -> ReadOutcome {
        let idx = node_id as usize;

        let (begin_version, neighbors) = {
            let nodes = self.nodes.read();
            let Some(node) = nodes.get(idx) else {
                return ReadOutcome::Missing;
            };
            (node.version, node.neighbors.to_vec())
        };

        let end_version = {
            let nodes = self.nodes.read();
            match nodes.get(idx) {
                Some(node) => node.version,
                None => return ReadOutcome::Missing,
            }
        };

        if begin_version == end_version {
            ReadOutcome::Valid(neighbors)
        } else {
            ReadOutcome::Conflict
        }
    }
}

enum ReadOutcome {
    Valid(Vec<NodeId>),
    Conflict,
    Missing,
}
