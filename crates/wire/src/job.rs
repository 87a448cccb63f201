// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The job envelope handed to the step worker.

use orq_core::{ProjectId, RunId, StepId, TenantId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use crate::queue::QueueError;

/// How much of the graph the worker should execute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Run the whole flow from the target start step.
    Full,
    /// Run exactly one step.
    SingleStep,
    /// Re-run the forward closure from the target step.
    Resume,
}

orq_core::simple_display! {
    ExecutionMode {
        Full => "full",
        SingleStep => "single_step",
        Resume => "resume",
    }
}

/// JSON envelope enqueued for the worker. Delivery is at-least-once; the
/// worker deduplicates step attempts on (run_id, step_id, attempt).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunJob {
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    /// 0 means "resolve from the current draft at dequeue time".
    pub project_version: u32,
    pub run_id: RunId,
    #[serde(default)]
    pub input: Value,
    pub execution_mode: ExecutionMode,
    /// Start step for full runs; the step to execute for the other modes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_step_id: Option<StepId>,
    /// Input override for single-step and resume modes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub step_input: Option<Value>,
    /// Prior step outputs keyed by step id, shipped inline so the worker
    /// never reads earlier runs from storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injected_outputs: Option<HashMap<String, Value>>,
    /// Tenant owning the project definition when it differs from `tenant_id`
    /// (system projects executed on behalf of another tenant).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_tenant_id: Option<TenantId>,
}

impl RunJob {
    /// Partition key for FIFO ordering: one lane per triggering tenant.
    pub fn partition(&self) -> String {
        self.tenant_id.to_string()
    }
}

/// Encode a job for the queue.
pub fn encode(job: &RunJob) -> Result<Vec<u8>, QueueError> {
    serde_json::to_vec(job).map_err(|e| QueueError::Codec(e.to_string()))
}

/// Decode a job read off the queue.
pub fn decode(bytes: &[u8]) -> Result<RunJob, QueueError> {
    serde_json::from_slice(bytes).map_err(|e| QueueError::Codec(e.to_string()))
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
