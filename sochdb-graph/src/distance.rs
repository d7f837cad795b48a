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

//! Euclidean distance kernel.
//!
//! Vectors of different lengths are a caller bug. Rather than panic inside a
//! traversal, the kernel returns [`MISMATCH_DISTANCE`], which sorts after every
//! real distance so a malformed node can never displace a valid result.

/// Sentinel returned for vectors of mismatched length
pub const MISMATCH_DISTANCE: f32 = f32::MAX;

/// Chunk width for the unrolled accumulation loop (one AVX register of f32)
const CHUNK: usize = 8;

/// L2 (Euclidean) distance between two equal-length vectors.
///
/// Returns [`MISMATCH_DISTANCE`] when the lengths differ.
#[inline]
pub fn l2_distance(lhs: &[f32], rhs: &[f32]) -> f32 {
    if lhs.len() != rhs.len() {
        return MISMATCH_DISTANCE;
    }
    l2_distance_squared(lhs, rhs).sqrt()
}

/// Squared L2 distance. Returns [`MISMATCH_DISTANCE`] when the lengths differ.
#[inline]
pub fn l2_distance_squared(lhs: &[f32], rhs: &[f32]) -> f32 {
    if lhs.len() != rhs.len() {
        return MISMATCH_DISTANCE;
    }

    let mut lanes = [0.0f32; CHUNK];
    let lhs_chunks = lhs.chunks_exact(CHUNK);
    let rhs_chunks = rhs.chunks_exact(CHUNK);
    let lhs_tail = lhs_chunks.remainder();
    let rhs_tail = rhs_chunks.remainder();

    for (a, b) in lhs_chunks.zip(rhs_chunks) {
        for lane in 0..CHUNK {
            let diff = a[lane] - b[lane];
            lanes[lane] += diff * diff;
        }
    }

    let mut sum: f32 = lanes.iter().sum();
    for (a, b) in lhs_tail.iter().zip(rhs_tail) {
        let diff = a - b;
        sum += diff * diff;
    }
    sum
}
