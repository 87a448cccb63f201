// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Queue contract and the in-memory reference queue.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use thiserror::Error;

use crate::job::{decode, encode, RunJob};

/// Errors from queue operations.
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("queue codec error: {0}")]
    Codec(String),
    #[error("queue unavailable: {0}")]
    Unavailable(String),
}

impl From<QueueError> for orq_core::Error {
    fn from(err: QueueError) -> Self {
        orq_core::Error::Queue(err.to_string())
    }
}

/// The only cross-process coordination primitive: accepts enqueues from any
/// handler and preserves FIFO order per partition. Enqueue is at-least-once;
/// the worker owns step-level idempotency.
#[async_trait]
pub trait JobQueue: Send + Sync {
    async fn enqueue(&self, job: &RunJob) -> Result<(), QueueError>;
}

/// In-memory FIFO queue for tests and single-process deployments.
///
/// Jobs are stored encoded, exactly as a Redis-backed queue would hold them,
/// so tests exercise the codec path too.
#[derive(Default)]
pub struct MemoryQueue {
    partitions: Mutex<HashMap<String, VecDeque<Vec<u8>>>>,
}

impl MemoryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total queued jobs across all partitions.
    pub fn len(&self) -> usize {
        self.partitions.lock().values().map(VecDeque::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pop the oldest job from one partition.
    pub fn pop(&self, partition: &str) -> Option<RunJob> {
        let bytes = self.partitions.lock().get_mut(partition)?.pop_front()?;
        decode(&bytes).ok()
    }

    /// Drain every partition in FIFO order, oldest first per partition.
    pub fn drain(&self) -> Vec<RunJob> {
        let mut partitions = self.partitions.lock();
        let mut out = Vec::new();
        for queue in partitions.values_mut() {
            while let Some(bytes) = queue.pop_front() {
                if let Ok(job) = decode(&bytes) {
                    out.push(job);
                }
            }
        }
        out
    }
}

#[async_trait]
impl JobQueue for MemoryQueue {
    async fn enqueue(&self, job: &RunJob) -> Result<(), QueueError> {
        let bytes = encode(job)?;
        self.partitions.lock().entry(job.partition()).or_default().push_back(bytes);
        Ok(())
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
