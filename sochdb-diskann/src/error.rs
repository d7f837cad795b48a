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

//! Error types for the quantization and dual-engine layers.
//!
//! Two families are kept apart: shape and configuration problems
//! (`InvalidBits`, `EmptyTrainingSet`, `ZeroDimension`, `DimensionMismatch`)
//! and call-order problems (`NotFitted`). Search paths never return errors;
//! they degrade to empty or partial results.

/// Quantization / engine error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuantError {
    #[error("bit width must be in [4, 7], got {0}")]
    InvalidBits(u8),

    #[error("training set is empty")]
    EmptyTrainingSet,

    #[error("training vectors have zero dimension")]
    ZeroDimension,

    #[error("{context}: dimension mismatch, expected {expected}, got {actual}")]
    DimensionMismatch {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("codec is not fitted")]
    NotFitted,
}

impl QuantError {
    pub(crate) fn mismatch(context: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            context,
            expected,
            actual,
        }
    }

    /// Shape or configuration error, as opposed to a call-order error
    pub fn is_invalid_argument(&self) -> bool {
        !matches!(self, Self::NotFitted)
    }
}

pub type Result<T> = std::result::Result<T, QuantError>;
