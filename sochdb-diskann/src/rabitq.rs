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

//! Per-dimension scalar quantization codec.
//!
//! Fit learns `min[i]` and `scale[i] = levels / max(max[i] - min[i], MIN_SPAN)`
//! for every dimension, with `levels = 2^bits - 1`. A component then encodes
//! to one byte:
//!
//! ```text
//! code[i]  = round(clamp((v[i] - min[i]) * scale[i], 0, levels))
//! decode   = code[i] / scale[i] + min[i]
//! ```
//!
//! For values inside the fitted range the reconstruction error per component
//! is at most half a quantization step, `0.5 / scale[i]`.
//!
//! The parameters are learned once and are read-only afterwards; encode and
//! decode take `&self` and can be called from any number of threads.

use sochdb_graph::l2_distance;

use crate::config::{MAX_BITS, MIN_BITS, MIN_SPAN};
use crate::error::{QuantError, Result};

/// Scalar quantizer with 4-7 bit codes stored one byte per dimension
#[derive(Debug, Clone)]
pub struct RabitQCodec {
    bits: u8,
    min: Vec<f32>,
    scale: Vec<f32>,
}

impl RabitQCodec {
    pub fn new(bits: u8) -> Result<Self> {
        if !(MIN_BITS..=MAX_BITS).contains(&bits) {
            return Err(QuantError::InvalidBits(bits));
        }
        Ok(Self {
            bits,
            min: Vec::new(),
            scale: Vec::new(),
        })
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Highest code value, `2^bits - 1`
    pub fn levels(&self) -> u8 {
        ((1u16 << self.bits) - 1) as u8
    }

    /// Fitted dimension, 0 before `fit`
    pub fn dim(&self) -> usize {
        self.min.len()
    }

    pub fn is_fitted(&self) -> bool {
        !self.min.is_empty()
    }

    pub fn min(&self) -> &[f32] {
        &self.min
    }

    pub fn scale(&self) -> &[f32] {
        &self.scale
    }

    /// Drop fitted parameters
    pub fn reset(&mut self) {
        self.min.clear();
        self.scale.clear();
    }

    /// Learn per-dimension ranges. Refitting replaces earlier parameters.
    pub fn fit(&mut self, training: &[Vec<f32>]) -> Result<()> {
        let first = training.first().ok_or(QuantError::EmptyTrainingSet)?;
        let dim = first.len();
        if dim == 0 {
            return Err(QuantError::ZeroDimension);
        }

        let mut lo = vec![f32::INFINITY; dim];
        let mut hi = vec![f32::NEG_INFINITY; dim];
        for vector in training {
            if vector.len() != dim {
                return Err(QuantError::mismatch("training vector", dim, vector.len()));
            }
            for (i, &value) in vector.iter().enumerate() {
                lo[i] = lo[i].min(value);
                hi[i] = hi[i].max(value);
            }
        }

        let levels = self.levels() as f32;
        self.scale = lo
            .iter()
            .zip(&hi)
            .map(|(&lo, &hi)| levels / (hi - lo).max(MIN_SPAN))
            .collect();
        self.min = lo;
        Ok(())
    }

    pub fn encode(&self, vector: &[f32]) -> Result<Vec<u8>> {
        self.check("encode input", vector.len())?;
        let levels = self.levels() as f32;
        Ok(vector
            .iter()
            .zip(self.min.iter().zip(&self.scale))
            .map(|(&value, (&min, &scale))| ((value - min) * scale).clamp(0.0, levels).round() as u8)
            .collect())
    }

    pub fn decode(&self, code: &[u8]) -> Result<Vec<f32>> {
        self.check("decode input", code.len())?;
        Ok(code
            .iter()
            .zip(self.min.iter().zip(&self.scale))
            .map(|(&level, (&min, &scale))| level as f32 / scale + min)
            .collect())
    }

    /// L2 distance between `vector` and its reconstruction
    pub fn reconstruction_error(&self, vector: &[f32]) -> Result<f32> {
        let restored = self.decode(&self.encode(vector)?)?;
        Ok(l2_distance(vector, &restored))
    }

    fn check(&self, context: &'static str, len: usize) -> Result<()> {
        if !self.is_fitted() {
            return Err(QuantError::NotFitted);
        }
        if len != self.dim() {
            return Err(QuantError::mismatch(context, self.dim(), len));
        }
        Ok(())
    }
}
