// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project aggregate: the authoring unit and its draft overlay.

use crate::edge::Edge;
use crate::error::{Error, Result};
use crate::id::TenantId;
use crate::step::Step;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Unique identifier for a project.
    pub struct ProjectId;
}

/// Publication status of a project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    Draft,
    Published,
    Archived,
}

crate::simple_display! {
    ProjectStatus {
        Draft => "draft",
        Published => "published",
        Archived => "archived",
    }
}

/// Unvalidated authoring overlay stored on the project itself.
///
/// Kept as an embedded blob rather than shadow rows so the steps/edges
/// tables only ever hold the last saved state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub variables: Value,
    pub steps: Vec<Step>,
    pub edges: Vec<Edge>,
    pub updated_at: DateTime<Utc>,
}

/// The authoring unit. Owns steps, edges, block groups, and one immutable
/// snapshot per saved version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub tenant_id: TenantId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Opaque configuration blob exposed to executing steps.
    #[serde(default)]
    pub variables: Value,
    /// Monotonic save counter. >= 1 once published.
    pub version: u32,
    pub status: ProjectStatus,
    /// System projects are process-wide and cannot be deleted by tenants.
    #[serde(default)]
    pub is_system: bool,
    /// Lookup slug, populated for system projects invoked by entry point.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default)]
    pub has_draft: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<ProjectDraft>,
    /// Best-effort input schema derived from the first reachable step.
    /// Authoritative only for validation UX.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a fresh draft project.
    pub fn new(tenant_id: TenantId, name: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: ProjectId::new(),
            tenant_id,
            name: name.into(),
            description: String::new(),
            variables: Value::Null,
            version: 0,
            status: ProjectStatus::Draft,
            is_system: false,
            slug: None,
            has_draft: false,
            draft: None,
            input_schema: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// True when tenants may delete this project.
    pub fn is_deletable(&self) -> bool {
        !self.is_system
    }

    /// Store the draft overlay. Invariant: `has_draft` tracks `draft`.
    pub fn set_draft(&mut self, draft: ProjectDraft, now: DateTime<Utc>) {
        self.draft = Some(draft);
        self.has_draft = true;
        self.updated_at = now;
    }

    /// Drop the draft overlay.
    pub fn clear_draft(&mut self, now: DateTime<Utc>) {
        self.draft = None;
        self.has_draft = false;
        self.updated_at = now;
    }

    /// Advance the save counter and mark the project published.
    ///
    /// Returns the new version so callers can stamp the snapshot.
    pub fn increment_version(&mut self, now: DateTime<Utc>) -> u32 {
        self.version += 1;
        self.status = ProjectStatus::Published;
        self.updated_at = now;
        self.version
    }

    pub fn archive(&mut self, now: DateTime<Utc>) {
        self.status = ProjectStatus::Archived;
        self.updated_at = now;
    }

    /// Guard used before tenant-initiated deletes.
    pub fn ensure_deletable(&self) -> Result<()> {
        if self.is_system {
            return Err(Error::ForbiddenDeleteSystem);
        }
        Ok(())
    }
}

crate::builder! {
    pub struct ProjectBuilder => Project {
        into {
            name: String = "test-project",
            description: String = "",
        }
        set {
            id: ProjectId = ProjectId::new(),
            tenant_id: TenantId = TenantId::new(),
            variables: Value = Value::Null,
            version: u32 = 0,
            status: ProjectStatus = ProjectStatus::Draft,
            is_system: bool = false,
            has_draft: bool = false,
        }
        option {
            slug: String = None,
            draft: ProjectDraft = None,
            input_schema: Value = None,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
            updated_at: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
