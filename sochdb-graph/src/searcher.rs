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

//! Overlapped-Prefetch Graph Searcher
//!
//! BFS over an immutable proximity graph feeding a [`TopKReducer`].
//!
//! ## Problem
//!
//! Every node expansion needs the node's neighbor list, which on a
//! disk-resident graph is a blocking read. The baseline traversal pays
//! `visited × fetch_latency` because compute and fetch strictly alternate.
//!
//! ## Solution
//!
//! Drain up to `batch_size` frontier nodes into a wave, start one scoped
//! prefetch thread per wave node, score the wave on the calling thread while
//! the fetches are in flight, then join. Every wave node gets its own thread,
//! so a wave costs roughly one fetch latency instead of `wave_size` of them,
//! independent of core count. If the OS refuses a thread, that node's list is
//! fetched inline after the join.
//!
//! ## Determinism
//!
//! Waves drain the FIFO frontier in order and enqueue discoveries in wave
//! order, so both variants visit the same nodes in the same sequence and feed
//! the reducer identical candidate streams. Concurrency changes latency only.

use std::collections::{HashSet, VecDeque};
use std::thread;
use std::time::Instant;

use smallvec::SmallVec;

use crate::config::SearcherConfig;
use crate::distance::l2_distance;
use crate::topk::TopKReducer;
use crate::types::{Candidate, GraphNode, NodeId, SearchRequest, SearchStats};

/// Inline capacity for a wave; larger waves spill to the heap
const INLINE_WAVE: usize = 64;

/// Searcher over an immutable graph
#[derive(Debug, Clone)]
pub struct GraphSearcher {
    graph: Vec<GraphNode>,
    config: SearcherConfig,
}

impl GraphSearcher {
    pub fn new(graph: Vec<GraphNode>) -> Self {
        Self::with_config(graph, SearcherConfig::default())
    }

    pub fn with_config(graph: Vec<GraphNode>, config: SearcherConfig) -> Self {
        Self { graph, config }
    }

    pub fn config(&self) -> &SearcherConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.graph.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.is_empty()
    }

    /// Search with the overlapped variant
    pub fn search(
        &self,
        request: &SearchRequest,
        entrypoint: NodeId,
        max_visit: usize,
        batch_size: usize,
        stats: Option<&mut SearchStats>,
    ) -> Vec<Candidate> {
        self.search_optimized(request, entrypoint, max_visit, batch_size, stats)
    }

    /// Search using the visit budget and wave size from [`SearcherConfig`]
    pub fn search_default(&self, request: &SearchRequest, entrypoint: NodeId) -> Vec<Candidate> {
        self.search_optimized(
            request,
            entrypoint,
            self.config.max_visit,
            self.config.batch_size,
            None,
        )
    }

    /// Serialized baseline: score one node, then block on its neighbor fetch.
    pub fn search_baseline(
        &self,
        request: &SearchRequest,
        entrypoint: NodeId,
        max_visit: usize,
        stats: Option<&mut SearchStats>,
    ) -> Vec<Candidate> {
        if !self.accepts(request, entrypoint) {
            return Vec::new();
        }

        let mut local = SearchStats::default();
        let mut reducer = TopKReducer::new(request.top_k);
        let mut frontier = VecDeque::from([entrypoint]);
        let mut visited = HashSet::from([entrypoint]);

        while local.visited < max_visit {
            let Some(current) = frontier.pop_front() else {
                break;
            };

            let compute_start = Instant::now();
            let candidate = self.score(request, current);
            local.compute_us += elapsed_us(compute_start);
            if !candidate.passed_filter {
                local.filtered_nodes += 1;
            }
            reducer.absorb(candidate);

            let fetch_start = Instant::now();
            let neighbors = self.prefetch_neighbors(current);
            local.prefetch_us += elapsed_us(fetch_start);

            self.enqueue_unvisited(&neighbors, &mut visited, &mut frontier);
            local.visited += 1;
            local.waves += 1;
        }

        self.finish(reducer, local, stats, "baseline")
    }

    /// Wave-batched search with one in-flight prefetch per wave node.
    pub fn search_optimized(
        &self,
        request: &SearchRequest,
        entrypoint: NodeId,
        max_visit: usize,
        batch_size: usize,
        stats: Option<&mut SearchStats>,
    ) -> Vec<Candidate> {
        if !self.accepts(request, entrypoint) {
            return Vec::new();
        }

        let batch_size = batch_size.max(1);
        let mut local = SearchStats::default();
        let mut reducer = TopKReducer::new(request.top_k);
        let mut frontier = VecDeque::from([entrypoint]);
        let mut visited = HashSet::from([entrypoint]);

        let mut wave: SmallVec<[NodeId; INLINE_WAVE]> = SmallVec::new();
        // caller sizes are unbounded; reserve only what a wave can hold
        let reserve = batch_size.min(max_visit).min(self.graph.len());
        let mut scored: Vec<Candidate> = Vec::with_capacity(reserve);
        let mut fetched: Vec<Vec<NodeId>> = Vec::with_capacity(reserve);

        while !frontier.is_empty() && local.visited < max_visit {
            let budget = batch_size.min(max_visit - local.visited);
            wave.clear();
            while wave.len() < budget {
                match frontier.pop_front() {
                    Some(node) => wave.push(node),
                    None => break,
                }
            }

            scored.clear();
            fetched.clear();

            let wave_start = Instant::now();
            let mut compute_us = 0;
            thread::scope(|scope| {
                let handles: SmallVec<[_; INLINE_WAVE]> = wave
                    .iter()
                    .map(|&node| {
                        thread::Builder::new()
                            .spawn_scoped(scope, move || self.prefetch_neighbors(node))
                            .ok()
                    })
                    .collect();

                let compute_start = Instant::now();
                scored.extend(wave.iter().map(|&node| self.score(request, node)));
                compute_us = elapsed_us(compute_start);

                for (handle, &node) in handles.into_iter().zip(wave.iter()) {
                    let neighbors = match handle.and_then(|handle| handle.join().ok()) {
                        Some(neighbors) => neighbors,
                        None => self.prefetch_neighbors(node),
                    };
                    fetched.push(neighbors);
                }
            });
            // join time not hidden behind compute
            local.prefetch_us += elapsed_us(wave_start).saturating_sub(compute_us);
            local.compute_us += compute_us;

            for neighbors in &fetched {
                self.enqueue_unvisited(neighbors, &mut visited, &mut frontier);
            }

            local.filtered_nodes += scored.iter().filter(|c| !c.passed_filter).count();
            local.visited += wave.len();
            local.waves += 1;
            reducer.absorb_batch(&scored);
        }

        self.finish(reducer, local, stats, "optimized")
    }

    fn accepts(&self, request: &SearchRequest, entrypoint: NodeId) -> bool {
        !self.graph.is_empty() && (entrypoint as usize) < self.graph.len() && !request.query.is_empty()
    }

    #[inline]
    fn score(&self, request: &SearchRequest, node_id: NodeId) -> Candidate {
        let node = &self.graph[node_id as usize];
        Candidate {
            id: node.id,
            distance: l2_distance(&request.query, &node.embedding),
            passed_filter: request.passes_filter(node.id),
        }
    }

    /// Models a blocking neighbor-list read with fixed latency
    fn prefetch_neighbors(&self, node_id: NodeId) -> Vec<NodeId> {
        if !self.config.fetch_latency.is_zero() {
            thread::sleep(self.config.fetch_latency);
        }
        self.graph[node_id as usize].neighbors.clone()
    }

    fn enqueue_unvisited(
        &self,
        neighbors: &[NodeId],
        visited: &mut HashSet<NodeId>,
        frontier: &mut VecDeque<NodeId>,
    ) {
        for &neighbor in neighbors {
            if (neighbor as usize) >= self.graph.len() {
                continue;
            }
            // filtered nodes still bridge connectivity
            if visited.insert(neighbor) {
                frontier.push_back(neighbor);
            }
        }
    }

    fn finish(
        &self,
        reducer: TopKReducer,
        local: SearchStats,
        stats: Option<&mut SearchStats>,
        variant: &'static str,
    ) -> Vec<Candidate> {
        tracing::debug!(
            variant,
            visited = local.visited,
            filtered = local.filtered_nodes,
            waves = local.waves,
            prefetch_us = local.prefetch_us,
            compute_us = local.compute_us,
            "graph search finished"
        );

        if let Some(stats) = stats {
            stats.visited += local.visited;
            stats.filtered_nodes += local.filtered_nodes;
            stats.prefetch_us += local.prefetch_us;
            stats.compute_us += local.compute_us;
            stats.waves += local.waves;
        }
        reducer.finalize()
    }
}

#[inline]
fn elapsed_us(start: Instant) -> u64 {
    start.elapsed().as_micros() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn line_graph(n: u32) -> Vec<GraphNode> {
        (0..n)
            .map(|id| {
                let neighbors = if id + 1 < n { vec![id + 1] } else { vec![] };
                GraphNode::new(id, vec![id as f32], neighbors)
            })
            .collect()
    }

    fn fast(graph: Vec<GraphNode>) -> GraphSearcher {
        GraphSearcher::with_config(graph, SearcherConfig::default().fetch_latency(Duration::ZERO))
    }

    #[test]
    fn test_empty_inputs() {
        let searcher = fast(line_graph(4));
        let empty_query = SearchRequest::new(vec![], 2);
        assert!(searcher.search_baseline(&empty_query, 0, 10, None).is_empty());
        assert!(searcher.search_optimized(&empty_query, 0, 10, 4, None).is_empty());

        let request = SearchRequest::new(vec![0.0], 2);
        assert!(searcher.search_baseline(&request, 4, 10, None).is_empty());
        assert!(searcher.search(&request, 99, 10, 4, None).is_empty());

        let nothing = fast(Vec::new());
        assert!(nothing.search(&request, 0, 10, 4, None).is_empty());
    }

    #[test]
    fn test_max_visit_bounds_traversal() {
        let searcher = fast(line_graph(10));
        let request = SearchRequest::new(vec![9.0], 10);

        let mut stats = SearchStats::default();
        let result = searcher.search_optimized(&request, 0, 3, 2, Some(&mut stats));
        assert_eq!(stats.visited, 3);
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].id, 2);

        let mut stats = SearchStats::default();
        searcher.search_baseline(&request, 0, 3, Some(&mut stats));
        assert_eq!(stats.visited, 3);
        assert_eq!(stats.waves, 3);
    }

    #[test]
    fn test_cycles_terminate() {
        let graph: Vec<GraphNode> = (0..5u32)
            .map(|id| GraphNode::new(id, vec![id as f32], vec![(id + 1) % 5, (id + 4) % 5, id]))
            .collect();
        let searcher = fast(graph);
        let request = SearchRequest::new(vec![0.0], 10);

        let mut stats = SearchStats::default();
        let result = searcher.search(&request, 2, 1000, 3, Some(&mut stats));
        assert_eq!(result.len(), 5);
        assert_eq!(stats.visited, 5);
    }

    #[test]
    fn test_filtered_nodes_bridge_traversal() {
        // 0 -> 1 -> 2, node 1 filtered: 2 must still be reached
        let searcher = fast(line_graph(3));
        let request = SearchRequest::new(vec![2.0], 3).with_filter(vec![1, 0, 1]);

        let mut stats = SearchStats::default();
        let result = searcher.search_optimized(&request, 0, 10, 1, Some(&mut stats));
        let ids: Vec<u32> = result.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2, 0]);
        assert_eq!(stats.filtered_nodes, 1);
    }

    #[test]
    fn test_out_of_range_neighbors_skipped() {
        let graph = vec![
            GraphNode::new(0, vec![0.0], vec![7, 1, 42]),
            GraphNode::new(1, vec![1.0], vec![0]),
        ];
        let searcher = fast(graph);
        let request = SearchRequest::new(vec![0.0], 5);
        assert_eq!(searcher.search(&request, 0, 10, 8, None).len(), 2);
    }

    #[test]
    fn test_dimension_mismatch_sorts_last() {
        let graph = vec![
            GraphNode::new(0, vec![0.0, 0.0], vec![1]),
            GraphNode::new(1, vec![5.0], vec![]),
        ];
        let searcher = fast(graph);
        let request = SearchRequest::new(vec![1.0, 1.0], 2);
        let result = searcher.search_baseline(&request, 0, 10, None);
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].id, 1);
        assert_eq!(result[1].distance, crate::MISMATCH_DISTANCE);
    }

    #[test]
    fn test_stats_accumulate_across_calls() {
        let searcher = fast(line_graph(4));
        let request = SearchRequest::new(vec![0.0], 2);
        let mut stats = SearchStats::default();
        searcher.search(&request, 0, 10, 2, Some(&mut stats));
        searcher.search(&request, 0, 10, 2, Some(&mut stats));
        assert_eq!(stats.visited, 8);
        assert_eq!(stats.waves, 8);
    }

    #[test]
    fn test_overlap_hides_fetch_latency() {
        // star: hub 0 connected to 16 leaves
        let mut graph = vec![GraphNode::new(0, vec![0.0], (1..=16).collect())];
        graph.extend((1..=16u32).map(|id| GraphNode::new(id, vec![id as f32], vec![])));
        let searcher = GraphSearcher::with_config(
            graph,
            SearcherConfig::default().fetch_latency(Duration::from_millis(2)),
        );
        let request = SearchRequest::new(vec![0.0], 4);

        let mut base = SearchStats::default();
        let baseline = searcher.search_baseline(&request, 0, 64, Some(&mut base));
        let mut opt = SearchStats::default();
        let optimized = searcher.search_optimized(&request, 0, 64, 16, Some(&mut opt));

        assert_eq!(baseline, optimized);
        assert_eq!(base.waves, 17);
        assert_eq!(opt.waves, 2);
        // 17 serialized fetches of 2ms each
        assert!(base.prefetch_us >= 34_000);
        // one fetch latency per wave, not one per node
        assert!(opt.prefetch_us >= 2 * 2_000);
        assert!(
            opt.prefetch_us < 3 * 2_000 * opt.waves as u64,
            "optimized prefetch {}us over {} waves",
            opt.prefetch_us,
            opt.waves
        );
    }

    #[test]
    fn test_wave_wider_than_cores_still_overlaps() {
        // 48 leaves in one wave: far more fetches than a small host has cores
        let mut graph = vec![GraphNode::new(0, vec![0.0], (1..=48).collect())];
        graph.extend((1..=48u32).map(|id| GraphNode::new(id, vec![id as f32], vec![])));
        let latency = Duration::from_millis(5);
        let searcher = GraphSearcher::with_config(graph, SearcherConfig::default().fetch_latency(latency));
        let request = SearchRequest::new(vec![3.0], 3);

        let start = std::time::Instant::now();
        let mut stats = SearchStats::default();
        let result = searcher.search_optimized(&request, 0, 64, 64, Some(&mut stats));
        let wall = start.elapsed();

        assert_eq!(result.iter().map(|c| c.id).collect::<Vec<_>>(), vec![3, 2, 4]);
        assert_eq!(stats.waves, 2);
        // serial cost would be 49 * 5ms
        assert!(wall < latency * 12, "wall {:?}", wall);
    }

    #[test]
    fn test_oversized_batch_and_top_k() {
        let searcher = fast(line_graph(6));

        let request = SearchRequest::new(vec![5.0], 2);
        let result = searcher.search_optimized(&request, 0, 10, usize::MAX, None);
        assert_eq!(result.iter().map(|c| c.id).collect::<Vec<_>>(), vec![5, 4]);

        let everything = SearchRequest::new(vec![0.0], usize::MAX);
        assert_eq!(searcher.search_baseline(&everything, 0, 10, None).len(), 6);
        assert_eq!(searcher.search(&everything, 0, usize::MAX, usize::MAX, None).len(), 6);
    }
}
