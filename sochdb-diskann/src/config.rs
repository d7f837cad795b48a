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

//! Engine configuration and compile-time defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default quantization width per dimension
pub const DEFAULT_BITS: u8 = 6;

/// Narrowest supported code width
pub const MIN_BITS: u8 = 4;

/// Widest supported code width (one spare bit per byte)
pub const MAX_BITS: u8 = 7;

/// Floor on a dimension's fitted span, guards zero-variance dimensions
pub const MIN_SPAN: f32 = 1e-6;

/// Vectors per storage block
pub const DEFAULT_BLOCK_SIZE: usize = 64;

/// Default coarse shortlist size for the disk path
pub const DEFAULT_RERANK_K: usize = 64;

/// Requests dispatched per simulated IO submission
pub const DEFAULT_IO_BATCH_SIZE: usize = 16;

/// Modelled cost of one IO submission
pub const DEFAULT_DISPATCH_DELAY: Duration = Duration::from_micros(80);

/// Configuration for [`DualEngineIndex`](crate::DualEngineIndex)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DualEngineConfig {
    /// Vector dimension
    pub dim: usize,

    /// Code width per dimension, in [4, 7]
    pub bits: u8,

    /// Vectors per storage block, used for block ids
    pub block_size: usize,

    /// Requests per simulated IO submission
    pub io_batch_size: usize,

    /// Simulated delay per IO submission. Zero disables the simulation.
    pub dispatch_delay: Duration,
}

impl DualEngineConfig {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            bits: DEFAULT_BITS,
            block_size: DEFAULT_BLOCK_SIZE,
            io_batch_size: DEFAULT_IO_BATCH_SIZE,
            dispatch_delay: Duration::ZERO,
        }
    }

    /// Set code width
    pub fn bits(mut self, bits: u8) -> Self {
        self.bits = bits;
        self
    }

    /// Set block size
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Set IO submission batch size
    pub fn io_batch_size(mut self, io_batch_size: usize) -> Self {
        self.io_batch_size = io_batch_size.max(1);
        self
    }

    /// Set simulated IO submission delay
    pub fn dispatch_delay(mut self, delay: Duration) -> Self {
        self.dispatch_delay = delay;
        self
    }

    /// Use [`DEFAULT_DISPATCH_DELAY`] to model real submission cost
    pub fn simulate_io(self) -> Self {
        self.dispatch_delay(DEFAULT_DISPATCH_DELAY)
    }
}
