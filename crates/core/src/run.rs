// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run: one execution of a project version, and its state machine.

use crate::error::{Error, Result};
use crate::id::{TenantId, UserId};
use crate::project::ProjectId;
use crate::step::StepId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Unique identifier for a run.
    pub struct RunId;
}

/// Sentinel project version meaning "resolve from the current draft at
/// dequeue time". Used only by inline-test runs.
pub const VERSION_CURRENT_DRAFT: u32 = 0;

/// Run lifecycle: pending -> running -> {completed, failed, cancelled}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

crate::simple_display! {
    RunStatus {
        Pending => "pending",
        Running => "running",
        Completed => "completed",
        Failed => "failed",
        Cancelled => "cancelled",
    }
}

impl RunStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// What caused a run to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggeredBy {
    Manual,
    Schedule,
    Webhook,
    Internal,
    Test,
}

crate::simple_display! {
    TriggeredBy {
        Manual => "manual",
        Schedule => "schedule",
        Webhook => "webhook",
        Internal => "internal",
        Test => "test",
    }
}

/// One execution instance of a project version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    /// 0 is the current-draft sentinel ([`VERSION_CURRENT_DRAFT`]).
    pub project_version: u32,
    pub status: RunStatus,
    #[serde(default)]
    pub input: Value,
    pub triggered_by: TriggeredBy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_by_user: Option<UserId>,
    /// Selects which Start flow to enter for multi-entry projects.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_step_id: Option<StepId>,
    /// Set only when triggered_by = internal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_trigger_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_trigger_metadata: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Run {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// pending -> running. Idempotent when already running.
    pub fn start(&mut self, now: DateTime<Utc>) {
        if self.status == RunStatus::Pending {
            self.status = RunStatus::Running;
            self.started_at = Some(now);
            self.updated_at = now;
        }
    }

    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.status = RunStatus::Completed;
        self.finished_at = Some(now);
        self.updated_at = now;
    }

    pub fn fail(&mut self, now: DateTime<Utc>) {
        self.status = RunStatus::Failed;
        self.finished_at = Some(now);
        self.updated_at = now;
    }

    /// Accepted only in pending or running.
    pub fn cancel(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.is_terminal() {
            return Err(Error::RunNotCancellable(self.status.to_string()));
        }
        self.status = RunStatus::Cancelled;
        self.finished_at = Some(now);
        self.updated_at = now;
        Ok(())
    }
}

crate::builder! {
    pub struct RunBuilder => Run {
        set {
            id: RunId = RunId::new(),
            tenant_id: TenantId = TenantId::new(),
            project_id: ProjectId = ProjectId::new(),
            project_version: u32 = 1,
            status: RunStatus = RunStatus::Pending,
            input: Value = Value::Null,
            triggered_by: TriggeredBy = TriggeredBy::Manual,
        }
        option {
            triggered_by_user: UserId = None,
            start_step_id: StepId = None,
            internal_trigger_source: String = None,
            internal_trigger_metadata: Value = None,
            started_at: DateTime<Utc> = None,
            finished_at: DateTime<Utc> = None,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
            updated_at: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
