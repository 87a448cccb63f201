// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run and step-run aggregates.

use async_trait::async_trait;
use orq_core::{ProjectId, Run, RunId, StepId, StepRun};

use super::MemoryStore;
use crate::error::StoreError;
use crate::repo::{RunRepo, StepRunRepo};

type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
impl RunRepo for MemoryStore {
    async fn create(&self, run: &Run) -> Result<()> {
        let mut runs = self.runs.write();
        if runs.contains_key(&run.id) {
            return Err(StoreError::Conflict(format!("run {} already exists", run.id)));
        }
        runs.insert(run.id, run.clone());
        Ok(())
    }

    async fn get(&self, id: RunId) -> Result<Option<Run>> {
        Ok(self.runs.read().get(&id).cloned())
    }

    async fn update(&self, run: &Run) -> Result<()> {
        self.runs.write().insert(run.id, run.clone());
        Ok(())
    }

    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Run>> {
        let mut out: Vec<Run> =
            self.runs.read().values().filter(|r| r.project_id == project).cloned().collect();
        out.sort_by_key(|r| r.created_at);
        Ok(out)
    }
}

/// Chronological ordering for step-run listings: by sequence number when the
/// worker has assigned one, then by creation time.
fn chronological(a: &StepRun, b: &StepRun) -> std::cmp::Ordering {
    match (a.sequence_number, b.sequence_number) {
        (Some(x), Some(y)) => x.cmp(&y),
        _ => a.created_at.cmp(&b.created_at),
    }
}

#[async_trait]
impl StepRunRepo for MemoryStore {
    async fn create(&self, step_run: &StepRun) -> Result<()> {
        let mut step_runs = self.step_runs.write();
        // At-least-once dispatch: (run, step, attempt) is the idempotency key.
        if step_runs.iter().any(|sr| {
            sr.run_id == step_run.run_id
                && sr.step_id == step_run.step_id
                && sr.attempt == step_run.attempt
        }) {
            return Err(StoreError::Conflict(format!(
                "step run attempt {} for ({}, {}) already recorded",
                step_run.attempt, step_run.run_id, step_run.step_id
            )));
        }
        step_runs.push(step_run.clone());
        Ok(())
    }

    async fn list_by_run(&self, run: RunId) -> Result<Vec<StepRun>> {
        let mut out: Vec<StepRun> =
            self.step_runs.read().iter().filter(|sr| sr.run_id == run).cloned().collect();
        out.sort_by(chronological);
        Ok(out)
    }

    async fn list_by_step(&self, run: RunId, step: StepId) -> Result<Vec<StepRun>> {
        let mut out: Vec<StepRun> = self
            .step_runs
            .read()
            .iter()
            .filter(|sr| sr.run_id == run && sr.step_id == step)
            .cloned()
            .collect();
        out.sort_by(chronological);
        Ok(out)
    }

    async fn latest_by_step(&self, run: RunId, step: StepId) -> Result<Option<StepRun>> {
        Ok(self
            .step_runs
            .read()
            .iter()
            .filter(|sr| sr.run_id == run && sr.step_id == step)
            .max_by_key(|sr| sr.attempt)
            .cloned())
    }

    async fn completed_by_run(&self, run: RunId) -> Result<Vec<StepRun>> {
        let mut out: Vec<StepRun> = self
            .step_runs
            .read()
            .iter()
            .filter(|sr| sr.run_id == run && sr.is_completed())
            .cloned()
            .collect();
        out.sort_by(chronological);
        Ok(out)
    }

    async fn max_attempt(&self, run: RunId) -> Result<u32> {
        Ok(self
            .step_runs
            .read()
            .iter()
            .filter(|sr| sr.run_id == run)
            .map(|sr| sr.attempt)
            .max()
            .unwrap_or(0))
    }
}
