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

//! Recall and latency summaries for comparing the two search paths.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sochdb_graph::NodeId;

/// Aggregate result of [`DualEngineIndex::evaluate`](crate::DualEngineIndex::evaluate)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    /// Mean over queries of |approx ∩ exact| / |exact|
    pub recall_at_k: f64,
    pub memory_p50_us: f64,
    pub memory_p95_us: f64,
    pub disk_p50_us: f64,
    pub disk_p95_us: f64,
    /// Number of queries evaluated
    pub queries: usize,
}

/// Nearest-rank quantile over latency samples, 0 for no samples.
///
/// Sorts `samples` in place. Index is `floor((n - 1) * q)`.
pub fn percentile(samples: &mut [f64], quantile: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.sort_unstable_by(f64::total_cmp);
    let idx = ((samples.len() - 1) as f64 * quantile.clamp(0.0, 1.0)) as usize;
    samples[idx]
}

/// Fraction of `exact` ids also present in `approx`.
///
/// The denominator is `|exact|`, which is `min(top_k, N)` for a full exact
/// result, not `top_k`. When `top_k > N` both paths return all N vectors, and
/// dividing by `top_k` would cap recall below 1.0 even with a full rerank.
/// An empty `exact` set scores 0.
pub fn recall(exact: &[NodeId], approx: &[NodeId]) -> f64 {
    if exact.is_empty() {
        return 0.0;
    }
    let truth: HashSet<NodeId> = exact.iter().copied().collect();
    let found = approx.iter().filter(|id| truth.contains(id)).count();
    found as f64 / exact.len() as f64
}
