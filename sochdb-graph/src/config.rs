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

//! Search configuration and compile-time defaults.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default cap on nodes scored per search.
pub const DEFAULT_MAX_VISIT: usize = 256;

/// Default number of frontier nodes drained into one prefetch wave.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// Modelled latency of one neighbor-list fetch (disk or remote read).
pub const DEFAULT_FETCH_LATENCY: Duration = Duration::from_micros(15);

/// Default optimistic read attempts per node in `VersionedGraph`.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Configuration for [`GraphSearcher`](crate::GraphSearcher)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearcherConfig {
    /// Blocking latency charged to every neighbor-list fetch.
    /// `Duration::ZERO` turns the fetch into a plain copy.
    pub fetch_latency: Duration,

    /// Default visit budget used by [`GraphSearcher::search_default`](crate::GraphSearcher::search_default)
    pub max_visit: usize,

    /// Default wave size used by [`GraphSearcher::search_default`](crate::GraphSearcher::search_default)
    pub batch_size: usize,
}

impl Default for SearcherConfig {
    fn default() -> Self {
        Self {
            fetch_latency: DEFAULT_FETCH_LATENCY,
            max_visit: DEFAULT_MAX_VISIT,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl SearcherConfig {
    /// Set fetch latency
    pub fn fetch_latency(mut self, latency: Duration) -> Self {
        self.fetch_latency = latency;
        self
    }

    /// Set visit budget
    pub fn max_visit(mut self, max_visit: usize) -> Self {
        self.max_visit = max_visit;
        self
    }

    /// Set wave size
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }
}
