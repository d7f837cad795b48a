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

//! Locality-ordered IO scheduling for disk-resident vectors.
//!
//! Requests arrive in candidate order, which is random with respect to
//! on-disk layout. The scheduler sorts them by block so that neighbouring
//! blocks are read back to back, then submits them in fixed-size chunks.
//!
//! ## Merged operations
//!
//! After ordering, a run of requests whose block ids never jump by more than
//! one can be served by a single sequential read. `estimate_merged_ops`
//! counts those runs:
//!
//! ```text
//! blocks: 1 2 3 | 7 8 | 10   =>  3 merged ops
//! ```
//!
//! Nothing is read here. `execute` only models submission cost with an
//! optional sleep per dispatched chunk, so callers can measure how ordering
//! and batching interact with their own latency budget.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sochdb_graph::NodeId;

/// One vector read: which node, stored in which block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IoRequest {
    pub node_id: NodeId,
    pub block_id: u64,
}

impl IoRequest {
    pub fn new(node_id: NodeId, block_id: u64) -> Self {
        Self { node_id, block_id }
    }
}

/// Ordered requests plus what submitting them would cost
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IoPlan {
    /// Requests in submission order
    pub ordered: Vec<IoRequest>,
    /// Sequential runs after merging adjacent blocks
    pub merged_ops: usize,
    /// Submissions of at most `max_batch_size` requests
    pub chunks: usize,
}

/// Orders and batches block reads
#[derive(Debug, Clone)]
pub struct DiskIoBatchScheduler {
    max_batch_size: usize,
    dispatch_delay: Duration,
}

impl DiskIoBatchScheduler {
    /// Create a scheduler. A zero batch size is treated as 1.
    pub fn new(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: max_batch_size.max(1),
            dispatch_delay: Duration::ZERO,
        }
    }

    /// Sleep this long per dispatched chunk in `execute`
    pub fn with_dispatch_delay(mut self, delay: Duration) -> Self {
        self.dispatch_delay = delay;
        self
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn dispatch_delay(&self) -> Duration {
        self.dispatch_delay
    }

    /// Order requests by (block id, node id) and simulate chunked submission.
    ///
    /// The result is a permutation of the input.
    pub fn execute(&self, requests: &[IoRequest]) -> Vec<IoRequest> {
        let ordered = Self::order(requests);
        if !self.dispatch_delay.is_zero() {
            for _chunk in self.dispatch_batches(&ordered) {
                std::thread::sleep(self.dispatch_delay);
            }
        }
        ordered
    }

    /// Chunks of at most `max_batch_size` requests, in submission order
    pub fn dispatch_batches<'a>(
        &self,
        ordered: &'a [IoRequest],
    ) -> impl Iterator<Item = &'a [IoRequest]> + 'a {
        ordered.chunks(self.max_batch_size)
    }

    /// Order without dispatching and report merged-op and chunk counts
    pub fn plan(&self, requests: &[IoRequest]) -> IoPlan {
        let ordered = Self::order(requests);
        let merged_ops = Self::estimate_merged_ops(&ordered);
        let chunks = ordered.len().div_ceil(self.max_batch_size);
        IoPlan {
            ordered,
            merged_ops,
            chunks,
        }
    }

    /// Count maximal runs where each block id is at most one past the previous
    pub fn estimate_merged_ops(ordered: &[IoRequest]) -> usize {
        if ordered.is_empty() {
            return 0;
        }
        let breaks = ordered
            .windows(2)
            .filter(|pair| pair[1].block_id > pair[0].block_id.saturating_add(1))
            .count();
        breaks + 1
    }

    fn order(requests: &[IoRequest]) -> Vec<IoRequest> {
        let mut ordered = requests.to_vec();
        ordered.sort_unstable_by_key(|req| (req.block_id, req.node_id));
        ordered
    }
}
