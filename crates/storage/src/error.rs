// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage error type.

use thiserror::Error;

/// Errors surfaced by repository implementations.
///
/// Missing rows are `Ok(None)` from getters, not errors; services decide
/// which misses are fatal.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness or compare-and-set constraint failed.
    #[error("conflict: {0}")]
    Conflict(String),
    /// A stored blob failed to (de)serialize.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<StoreError> for orq_core::Error {
    fn from(err: StoreError) -> Self {
        orq_core::Error::Storage(err.to_string())
    }
}
