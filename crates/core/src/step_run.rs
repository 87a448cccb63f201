// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! StepRun: one attempt of one step within a run.

use crate::run::RunId;
use crate::step::StepId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Unique identifier for a step run.
    pub struct StepRunId;
}

/// Status of one step attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepRunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Skipped,
}

crate::simple_display! {
    StepRunStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Skipped => "skipped",
    }
}

/// One attempt of one step within a run.
///
/// Attempts are numbered from 1 and increment against the run-wide maximum,
/// so re-executing any step always produces a strictly larger attempt.
/// `sequence_number` is chronological within the run and assigned by the
/// worker when the attempt starts; multiple attempts never share one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepRun {
    pub id: StepRunId,
    pub run_id: RunId,
    pub step_id: StepId,
    pub step_name: String,
    pub attempt: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_number: Option<u32>,
    pub status: StepRunStatus,
    #[serde(default)]
    pub input: Value,
    #[serde(default)]
    pub output: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StepRun {
    /// A fresh, not-yet-persisted attempt. The worker assigns the sequence
    /// number when execution actually starts.
    pub fn new_attempt(
        run_id: RunId,
        step_id: StepId,
        step_name: impl Into<String>,
        attempt: u32,
        input: Value,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: StepRunId::new(),
            run_id,
            step_id,
            step_name: step_name.into(),
            attempt,
            sequence_number: None,
            status: StepRunStatus::Pending,
            input,
            output: Value::Null,
            error: None,
            started_at: None,
            finished_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == StepRunStatus::Completed
    }
}

crate::builder! {
    pub struct StepRunBuilder => StepRun {
        into {
            step_name: String = "test-step",
        }
        set {
            id: StepRunId = StepRunId::new(),
            run_id: RunId = RunId::new(),
            step_id: StepId = StepId::new(),
            attempt: u32 = 1,
            status: StepRunStatus = StepRunStatus::Completed,
            input: Value = Value::Null,
            output: Value = Value::Null,
        }
        option {
            sequence_number: u32 = None,
            error: String = None,
            started_at: DateTime<Utc> = None,
            finished_at: DateTime<Utc> = None,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
            updated_at: DateTime<Utc> = Utc::now(),
        }
    }
}
