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

//! Determinism tests: the baseline and the overlapped searcher must return
//! identical results on identical inputs.

use std::collections::HashSet;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sochdb_graph::{GraphNode, GraphSearcher, SearchRequest, SearchStats, SearcherConfig};

/// 12-node ring with chords: neighbors (id+1, id+3, id+5) mod 12
fn ring_with_chords() -> Vec<GraphNode> {
    (0..12u32)
        .map(|id| {
            let s = id as f32 * 0.15;
            GraphNode::new(
                id,
                vec![s, s + 0.1, s + 0.2, s + 0.3],
                vec![(id + 1) % 12, (id + 3) % 12, (id + 5) % 12],
            )
        })
        .collect()
}

fn random_graph(n: usize, dim: usize, degree: usize, seed: u64) -> Vec<GraphNode> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n as u32)
        .map(|id| {
            let embedding = (0..dim).map(|_| rng.r#gen::<f32>()).collect();
            let mut neighbors = Vec::with_capacity(degree);
            while neighbors.len() < degree {
                let next = rng.gen_range(0..n as u32);
                if next != id {
                    neighbors.push(next);
                }
            }
            GraphNode::new(id, embedding, neighbors)
        })
        .collect()
}

fn no_latency() -> SearcherConfig {
    SearcherConfig::default().fetch_latency(Duration::ZERO)
}

#[test]
fn test_ring_with_chords_filtered() {
    let searcher = GraphSearcher::new(ring_with_chords());

    let mut filter = vec![1u8; 12];
    for id in [3, 4, 7] {
        filter[id] = 0;
    }
    let request = SearchRequest::new(vec![0.45, 0.55, 0.65, 0.75], 5).with_filter(filter);

    let mut base_stats = SearchStats::default();
    let mut opt_stats = SearchStats::default();
    let baseline = searcher.search_baseline(&request, 0, 128, Some(&mut base_stats));
    let optimized = searcher.search_optimized(&request, 0, 128, 4, Some(&mut opt_stats));

    assert_eq!(baseline.len(), 5);
    assert_eq!(baseline, optimized);

    let excluded: HashSet<u32> = [3, 4, 7].into_iter().collect();
    assert!(baseline.iter().all(|c| !excluded.contains(&c.id)));
    assert!(baseline.iter().all(|c| c.passed_filter));
    assert!(baseline.windows(2).all(|w| w[0].distance <= w[1].distance));

    let ids: HashSet<u32> = baseline.iter().map(|c| c.id).collect();
    let expected: HashSet<u32> = [0, 1, 2, 5, 6].into_iter().collect();
    assert_eq!(ids, expected);

    assert_eq!(base_stats.visited, 12);
    assert_eq!(opt_stats.visited, 12);
    assert_eq!(base_stats.filtered_nodes, 3);
    assert_eq!(opt_stats.filtered_nodes, 3);
}

#[test]
fn test_random_graphs_all_batch_sizes() {
    for seed in 0..4u64 {
        let graph = random_graph(400, 16, 8, seed);
        let searcher = GraphSearcher::with_config(graph, no_latency());

        let mut rng = StdRng::seed_from_u64(seed + 100);
        let query: Vec<f32> = (0..16).map(|_| rng.r#gen::<f32>()).collect();
        let filter: Vec<u8> = (0..400).map(|i| u8::from(i % 7 != 0)).collect();
        let request = SearchRequest::new(query, 10).with_filter(filter);

        for max_visit in [1usize, 17, 150, 1000] {
            let baseline = searcher.search_baseline(&request, 3, max_visit, None);
            for batch_size in [1usize, 2, 7, 32, 64, 500] {
                let optimized = searcher.search_optimized(&request, 3, max_visit, batch_size, None);
                assert_eq!(
                    baseline, optimized,
                    "seed={seed} max_visit={max_visit} batch_size={batch_size}"
                );
            }
        }
    }
}

#[test]
fn test_results_bounded_and_unfiltered() {
    let graph = random_graph(200, 8, 6, 7);
    let searcher = GraphSearcher::with_config(graph, no_latency());
    let filter: Vec<u8> = (0..200).map(|i| u8::from(i % 2 == 0)).collect();
    let request = SearchRequest::new(vec![0.5; 8], 12).with_filter(filter);

    let result = searcher.search(&request, 0, 256, 16, None);
    assert!(result.len() <= 12);
    assert!(result.iter().all(|c| c.id % 2 == 0));
    assert!(result.iter().all(|c| c.distance >= 0.0));
}

#[test]
fn test_default_search_uses_config() {
    let graph = random_graph(100, 4, 4, 11);
    let searcher = GraphSearcher::with_config(graph, no_latency().max_visit(10).batch_size(3));
    let request = SearchRequest::new(vec![0.1; 4], 50);

    let result = searcher.search_default(&request, 0);
    assert!(result.len() <= 10);
    assert_eq!(result, searcher.search_baseline(&request, 0, 10, None));
}
