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

//! Orthogonal rotation applied ahead of scalar quantization.
//!
//! Scalar quantization loses the most precision on dimensions whose range is
//! dominated by a few outliers. Rotating by a trained orthogonal matrix (OPQ
//! style) spreads variance across dimensions before the per-dimension ranges
//! are fitted. Training the rotation happens elsewhere; this module only
//! applies one.
//!
//! A fresh projector holds the identity, so the codec path works unchanged
//! until a trained matrix is installed.

use ndarray::{Array2, ArrayView1};

use crate::error::{QuantError, Result};

/// Applies a dim×dim rotation to vectors
#[derive(Debug, Clone)]
pub struct OpqProjector {
    dim: usize,
    rotation: Array2<f32>,
}

impl OpqProjector {
    /// Identity projector of the given dimension
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            rotation: Array2::eye(dim),
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn rotation(&self) -> &Array2<f32> {
        &self.rotation
    }

    /// True while the installed matrix is exactly the identity
    pub fn is_identity(&self) -> bool {
        self.rotation
            .indexed_iter()
            .all(|((row, col), &value)| value == if row == col { 1.0 } else { 0.0 })
    }

    /// Install a rotation matrix. Must be exactly dim×dim.
    pub fn set_rotation_matrix(&mut self, rotation: Array2<f32>) -> Result<()> {
        let (rows, cols) = rotation.dim();
        if rows != self.dim {
            return Err(QuantError::mismatch("rotation rows", self.dim, rows));
        }
        if cols != self.dim {
            return Err(QuantError::mismatch("rotation columns", self.dim, cols));
        }
        self.rotation = rotation;
        Ok(())
    }

    /// Install a rotation given as row vectors
    pub fn set_rotation_rows(&mut self, rows: &[Vec<f32>]) -> Result<()> {
        if rows.len() != self.dim {
            return Err(QuantError::mismatch("rotation rows", self.dim, rows.len()));
        }
        let mut flat = Vec::with_capacity(self.dim * self.dim);
        for row in rows {
            if row.len() != self.dim {
                return Err(QuantError::mismatch("rotation columns", self.dim, row.len()));
            }
            flat.extend_from_slice(row);
        }
        let rotation = Array2::from_shape_vec((self.dim, self.dim), flat)
            .map_err(|_| QuantError::mismatch("rotation shape", self.dim * self.dim, rows.len()))?;
        self.set_rotation_matrix(rotation)
    }

    /// rotation · v
    pub fn transform(&self, vector: &[f32]) -> Result<Vec<f32>> {
        if vector.len() != self.dim {
            return Err(QuantError::mismatch("projector input", self.dim, vector.len()));
        }
        Ok(self.rotation.dot(&ArrayView1::from(vector)).to_vec())
    }
}
