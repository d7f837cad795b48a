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

//! Dual-Engine Index
//!
//! Holds the same collection twice: raw vectors for exact search ("memory"
//! path) and rotated, quantized reconstructions standing in for a
//! disk-resident copy ("disk" path).
//!
//! ## Disk path
//!
//! ```text
//! query ─► rotate ─► IoRequest per vector ─► scheduler (block order)
//!       ─► coarse L2 vs decoded vectors ─► shortlist max(top_k, rerank_k)
//!       ─► exact L2 vs raw vectors ─► top_k
//! ```
//!
//! Coarse distances only rank the shortlist; every reported distance is the
//! exact one. With `rerank_k >= len()` the disk path returns exactly what the
//! memory path returns.

use std::time::Instant;

use ndarray::Array2;
use serde::{Deserialize, Serialize};
use sochdb_graph::{NodeId, l2_distance};

use crate::config::DualEngineConfig;
use crate::error::{QuantError, Result};
use crate::evaluation::{EvaluationMetrics, percentile, recall};
use crate::io_scheduler::{DiskIoBatchScheduler, IoRequest};
use crate::rabitq::RabitQCodec;
use crate::rotation::OpqProjector;

/// One search result
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: NodeId,
    pub distance: f32,
}

impl SearchHit {
    pub fn new(id: NodeId, distance: f32) -> Self {
        Self { id, distance }
    }
}

/// Exact and quantized-plus-rerank search over one vector collection
#[derive(Debug, Clone)]
pub struct DualEngineIndex {
    config: DualEngineConfig,
    projector: OpqProjector,
    codec: RabitQCodec,
    scheduler: DiskIoBatchScheduler,
    vectors: Vec<Vec<f32>>,
    codes: Vec<Vec<u8>>,
    decoded: Vec<Vec<f32>>,
    block_ids: Vec<u64>,
}

impl DualEngineIndex {
    /// Create an empty index. Fails on an unsupported bit width.
    pub fn new(dim: usize, bits: u8) -> Result<Self> {
        Self::with_config(DualEngineConfig::new(dim).bits(bits))
    }

    pub fn with_config(config: DualEngineConfig) -> Result<Self> {
        let codec = RabitQCodec::new(config.bits)?;
        if config.dim == 0 {
            return Err(QuantError::ZeroDimension);
        }
        let scheduler = DiskIoBatchScheduler::new(config.io_batch_size)
            .with_dispatch_delay(config.dispatch_delay);

        Ok(Self {
            projector: OpqProjector::new(config.dim),
            codec,
            scheduler,
            config,
            vectors: Vec::new(),
            codes: Vec::new(),
            decoded: Vec::new(),
            block_ids: Vec::new(),
        })
    }

    pub fn config(&self) -> &DualEngineConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.config.dim
    }

    pub fn bits(&self) -> u8 {
        self.config.bits
    }

    pub fn block_size(&self) -> usize {
        self.config.block_size
    }

    pub fn projector(&self) -> &OpqProjector {
        &self.projector
    }

    pub fn codec(&self) -> &RabitQCodec {
        &self.codec
    }

    pub fn vector(&self, id: NodeId) -> Option<&[f32]> {
        self.vectors.get(id as usize).map(Vec::as_slice)
    }

    pub fn block_id(&self, id: NodeId) -> Option<u64> {
        self.block_ids.get(id as usize).copied()
    }

    pub fn quant_code(&self, id: NodeId) -> Option<&[u8]> {
        self.codes.get(id as usize).map(Vec::as_slice)
    }

    /// Install a trained rotation.
    ///
    /// Stored vectors are re-encoded under the new rotation so the coarse
    /// space stays consistent with queries.
    pub fn set_rotation_matrix(&mut self, rotation: Array2<f32>) -> Result<()> {
        self.projector.set_rotation_matrix(rotation)?;
        if !self.vectors.is_empty() {
            let vectors = std::mem::take(&mut self.vectors);
            self.build(&vectors, self.config.block_size)?;
        }
        Ok(())
    }

    /// Load `vectors`, replacing everything stored before.
    ///
    /// An empty input leaves the index empty. On error the index is empty.
    pub fn build(&mut self, vectors: &[Vec<f32>], block_size: usize) -> Result<()> {
        self.clear();
        self.config.block_size = block_size.max(1);
        if vectors.is_empty() {
            return Ok(());
        }

        let result = self.load(vectors);
        if result.is_err() {
            self.clear();
        }
        result
    }

    fn load(&mut self, vectors: &[Vec<f32>]) -> Result<()> {
        let projected = vectors
            .iter()
            .map(|v| self.projector.transform(v))
            .collect::<Result<Vec<_>>>()?;

        self.codec.fit(&projected)?;
        self.codes = projected
            .iter()
            .map(|v| self.codec.encode(v))
            .collect::<Result<Vec<_>>>()?;
        self.decoded = self
            .codes
            .iter()
            .map(|code| self.codec.decode(code))
            .collect::<Result<Vec<_>>>()?;

        let block_size = self.config.block_size as u64;
        self.block_ids = (0..vectors.len() as u64).map(|i| i / block_size).collect();
        self.vectors = vectors.to_vec();

        tracing::info!(
            vectors = self.vectors.len(),
            dim = self.config.dim,
            bits = self.config.bits,
            blocks = self.block_ids.last().map_or(0, |last| last + 1),
            rotated = !self.projector.is_identity(),
            "dual-engine index built"
        );
        Ok(())
    }

    fn clear(&mut self) {
        self.vectors.clear();
        self.codes.clear();
        self.decoded.clear();
        self.block_ids.clear();
        self.codec.reset();
    }

    /// Exact brute-force search over raw vectors
    pub fn search_memory(&self, query: &[f32], top_k: usize) -> Vec<SearchHit> {
        if top_k == 0 || self.is_empty() || query.len() != self.config.dim {
            return Vec::new();
        }
        let hits = self
            .vectors
            .iter()
            .enumerate()
            .map(|(id, v)| SearchHit::new(id as NodeId, l2_distance(query, v)))
            .collect();
        select_smallest(hits, top_k)
    }

    /// Coarse search on quantized reconstructions, then exact rerank.
    ///
    /// The shortlist holds `max(top_k, rerank_k)` candidates.
    pub fn search_disk(&self, query: &[f32], top_k: usize, rerank_k: usize) -> Vec<SearchHit> {
        if top_k == 0 || self.is_empty() {
            return Vec::new();
        }
        let Ok(projected) = self.projector.transform(query) else {
            return Vec::new();
        };

        let requests: Vec<IoRequest> = self
            .block_ids
            .iter()
            .enumerate()
            .map(|(id, &block)| IoRequest::new(id as NodeId, block))
            .collect();
        let ordered = self.scheduler.execute(&requests);
        tracing::trace!(
            requests = ordered.len(),
            merged_ops = DiskIoBatchScheduler::estimate_merged_ops(&ordered),
            "disk path scheduled"
        );

        let coarse = ordered
            .iter()
            .map(|req| {
                let decoded = &self.decoded[req.node_id as usize];
                SearchHit::new(req.node_id, l2_distance(&projected, decoded))
            })
            .collect();
        let shortlist = select_smallest(coarse, top_k.max(rerank_k));

        let reranked = shortlist
            .into_iter()
            .map(|hit| SearchHit::new(hit.id, l2_distance(query, &self.vectors[hit.id as usize])))
            .collect();
        select_smallest(reranked, top_k)
    }

    /// Run every query through both paths and summarize recall and latency
    pub fn evaluate(&self, queries: &[Vec<f32>], top_k: usize, rerank_k: usize) -> EvaluationMetrics {
        if queries.is_empty() || top_k == 0 || self.is_empty() {
            return EvaluationMetrics::default();
        }

        let mut memory_us = Vec::with_capacity(queries.len());
        let mut disk_us = Vec::with_capacity(queries.len());
        let mut recall_sum = 0.0;

        for query in queries {
            let start = Instant::now();
            let exact = self.search_memory(query, top_k);
            memory_us.push(start.elapsed().as_secs_f64() * 1e6);

            let start = Instant::now();
            let approx = self.search_disk(query, top_k, rerank_k);
            disk_us.push(start.elapsed().as_secs_f64() * 1e6);

            let exact: Vec<NodeId> = exact.iter().map(|hit| hit.id).collect();
            let approx: Vec<NodeId> = approx.iter().map(|hit| hit.id).collect();
            recall_sum += recall(&exact, &approx);
        }

        let metrics = EvaluationMetrics {
            recall_at_k: recall_sum / queries.len() as f64,
            memory_p50_us: percentile(&mut memory_us, 0.50),
            memory_p95_us: percentile(&mut memory_us, 0.95),
            disk_p50_us: percentile(&mut disk_us, 0.50),
            disk_p95_us: percentile(&mut disk_us, 0.95),
            queries: queries.len(),
        };

        tracing::info!(
            queries = metrics.queries,
            top_k,
            rerank_k,
            recall = metrics.recall_at_k,
            memory_p95_us = metrics.memory_p95_us,
            disk_p95_us = metrics.disk_p95_us,
            "dual-engine evaluation"
        );
        metrics
    }
}

/// The `k` closest hits, ascending by distance then id
fn select_smallest(mut hits: Vec<SearchHit>, k: usize) -> Vec<SearchHit> {
    let by_distance =
        |a: &SearchHit, b: &SearchHit| a.distance.total_cmp(&b.distance).then(a.id.cmp(&b.id));
    if k < hits.len() {
        hits.select_nth_unstable_by(k, by_distance);
        hits.truncate(k);
    }
    hits.sort_unstable_by(by_distance);
    hits
}
