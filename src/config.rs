// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::error::{invalid, Result};

/// Frames per group when nothing else is asked for.
pub const DEFAULT_GROUP_SIZE: usize = 5;

/// Everything a `Carver` needs to know before it starts.
///
/// The worker pool is sized here once and handed to the carver; there
/// is no process-wide pool to discover.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CarveConfig {
    /// Width of every output frame.
    pub target_width: u32,

    /// Height of every output frame.
    pub target_height: u32,

    /// Threads carving frame groups concurrently within a pass.
    pub workers: usize,

    /// Maximum number of consecutive frames sharing one seam per pass.
    pub group_size: usize,

    /// Threads sharing each row of a seam search.  One means the rows
    /// are relaxed on the group's own thread.
    pub column_workers: usize,

    /// Rows narrower than this are never split across column workers.
    pub min_parallel_width: usize,
}

impl Default for CarveConfig {
    fn default() -> Self {
        Self {
            target_width: 1,
            target_height: 1,
            workers: num_cpus::get(),
            group_size: DEFAULT_GROUP_SIZE,
            column_workers: 1,
            min_parallel_width: 512,
        }
    }
}

impl CarveConfig {
    pub fn new(target_width: u32, target_height: u32) -> Self {
        Self {
            target_width,
            target_height,
            ..Self::default()
        }
    }

    pub fn set_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn set_group_size(mut self, group_size: usize) -> Self {
        self.group_size = group_size;
        self
    }

    pub fn set_column_workers(mut self, column_workers: usize) -> Self {
        self.column_workers = column_workers;
        self
    }

    pub fn set_min_parallel_width(mut self, width: usize) -> Self {
        self.min_parallel_width = width;
        self
    }

    /// Reject settings no carve could run with.
    pub fn validate(&self) -> Result<()> {
        if self.target_width == 0 || self.target_height == 0 {
            return invalid(format!(
                "target dimensions must be positive, got {}x{}",
                self.target_width, self.target_height
            ));
        }
        if self.workers == 0 {
            return invalid("worker pool must have at least one worker");
        }
        if self.group_size == 0 {
            return invalid("frame groups must hold at least one frame");
        }
        if self.column_workers == 0 {
            return invalid("seam search needs at least one column worker");
        }
        Ok(())
    }
}
