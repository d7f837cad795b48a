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

//! SochDB Quantized Disk Path
//!
//! Rotation, scalar quantization and IO scheduling for vectors that live on
//! disk, plus an index that runs exact and quantized-plus-rerank search side
//! by side.
//!
//! ## Components
//!
//! - **OpqProjector** (`rotation`): applies an externally trained orthogonal
//!   rotation; identity until one is installed.
//! - **RabitQCodec** (`rabitq`): per-dimension min/scale scalar quantizer,
//!   4 to 7 bits, one byte per dimension.
//! - **DiskIoBatchScheduler** (`io_scheduler`): sorts reads by block and
//!   models chunked submission.
//! - **DualEngineIndex** (`dual_engine`): memory and disk search paths with
//!   recall/latency evaluation.
//!
//! ## Example
//!
//! ```rust
//! use sochdb_diskann::DualEngineIndex;
//!
//! let vectors: Vec<Vec<f32>> = (0..100).map(|i| vec![i as f32, (i % 7) as f32]).collect();
//! let mut index = DualEngineIndex::new(2, 6)?;
//! index.build(&vectors, 16)?;
//!
//! let exact = index.search_memory(&[42.0, 0.0], 5);
//! let approx = index.search_disk(&[42.0, 0.0], 5, 100);
//! assert_eq!(exact, approx);
//! # Ok::<(), sochdb_diskann::QuantError>(())
//! ```

pub mod config;
pub mod dual_engine;
pub mod error;
pub mod evaluation;
pub mod io_scheduler;
pub mod rabitq;
pub mod rotation;

pub use config::DualEngineConfig;
pub use dual_engine::{DualEngineIndex, SearchHit};
pub use error::{QuantError, Result};
pub use evaluation::EvaluationMetrics;
pub use io_scheduler::{DiskIoBatchScheduler, IoPlan, IoRequest};
pub use rabitq::RabitQCodec;
pub use rotation::OpqProjector;
