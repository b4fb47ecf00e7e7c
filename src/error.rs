// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors raised while carving.
//!
//! Every failure is reported at the component that detects it and is
//! passed up unchanged.  Nothing in the carving pipeline retries: a
//! single group re-run on its own would carve a different seam than
//! its siblings in the same pass.

use std::collections::TryReserveError;
use thiserror::Error;

/// The error type for every fallible carving operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CarveError {
    /// Empty sequences, mismatched dimensions, out-of-range seams,
    /// zero-sized energy maps, or nonsensical configuration.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A working buffer could not be allocated.
    #[error("Resource exhausted: {0}")]
    ResourceExhaustion(String),

    /// A worker thread failed while executing a task.
    #[error("Compute failure: {0}")]
    ComputeFailure(String),
}

impl From<TryReserveError> for CarveError {
    fn from(err: TryReserveError) -> Self {
        CarveError::ResourceExhaustion(err.to_string())
    }
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, CarveError>;

/// Shorthand for raising `InvalidInput` with a formatted message.
pub(crate) fn invalid<T>(msg: impl Into<String>) -> Result<T> {
    Err(CarveError::InvalidInput(msg.into()))
}
