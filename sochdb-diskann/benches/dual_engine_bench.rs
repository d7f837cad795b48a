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

//! Dual-Engine Benchmarks
//!
//! Exact memory search against the quantized disk path at several shortlist
//! sizes, and the cost of building the quantized copy.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sochdb_diskann::{DiskIoBatchScheduler, DualEngineIndex, IoRequest};

const VECTORS: usize = 20_000;
const DIM: usize = 64;
const TOP_K: usize = 10;

fn random_vectors(n: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| (0..DIM).map(|_| rng.gen_range(-1.0f32..1.0)).collect())
        .collect()
}

fn bench_search_paths(c: &mut Criterion) {
    let vectors = random_vectors(VECTORS, 42);
    let query = random_vectors(1, 7).remove(0);
    let mut index = DualEngineIndex::new(DIM, 6).expect("valid bit width");
    index.build(&vectors, 64).expect("uniform dimensions");

    let mut group = c.benchmark_group("dual_engine_search");
    group.sample_size(30);

    group.bench_function("memory", |b| {
        b.iter(|| black_box(index.search_memory(black_box(&query), TOP_K)))
    });

    for rerank_k in [TOP_K, 64, 256] {
        group.bench_with_input(BenchmarkId::new("disk", rerank_k), &rerank_k, |b, &rerank_k| {
            b.iter(|| black_box(index.search_disk(black_box(&query), TOP_K, rerank_k)))
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let vectors = random_vectors(VECTORS / 4, 3);
    let mut group = c.benchmark_group("dual_engine_build");
    group.sample_size(10);

    for bits in [4u8, 6, 7] {
        group.bench_with_input(BenchmarkId::from_parameter(bits), &bits, |b, &bits| {
            b.iter(|| {
                let mut index = DualEngineIndex::new(DIM, bits).expect("valid bit width");
                index.build(black_box(&vectors), 64).expect("uniform dimensions");
                index
            })
        });
    }
    group.finish();
}

fn bench_scheduler(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(9);
    let requests: Vec<IoRequest> = (0..VECTORS as u32)
        .map(|id| IoRequest::new(id, rng.gen_range(0..(VECTORS as u64 / 64))))
        .collect();
    let scheduler = DiskIoBatchScheduler::new(16);

    c.bench_function("io_scheduler_plan", |b| {
        b.iter(|| black_box(scheduler.plan(black_box(&requests))))
    });
}

criterion_group!(benches, bench_search_paths, bench_build, bench_scheduler);
criterion_main!(benches);
