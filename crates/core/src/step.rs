// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step: a node in the project DAG.

use crate::block_group::BlockGroupId;
use crate::credential::CredentialId;
use crate::error::{Error, Result};
use crate::id::TenantId;
use crate::project::ProjectId;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Unique identifier for a step.
    pub struct StepId;
}

crate::define_id! {
    /// Unique identifier for a block definition.
    pub struct BlockDefinitionId;
}

/// Block slugs understood without a registered block definition.
pub const BUILT_IN_TYPES: &[&str] = &[
    "start",
    "manual_trigger",
    "schedule_trigger",
    "webhook_trigger",
    "function",
    "http",
    "llm",
    "condition",
    "switch",
    "approval",
];

/// Start-family slugs. These are flow entry points: they may not be the
/// target of any edge and may not belong to a block group.
pub const START_TYPES: &[&str] =
    &["start", "manual_trigger", "schedule_trigger", "webhook_trigger"];

/// Slugs whose multiple outgoing edges represent a branch. Branching outside
/// a block group is rejected at save time.
pub const BRANCHING_TYPES: &[&str] = &["condition", "switch"];

pub fn is_built_in_type(slug: &str) -> bool {
    BUILT_IN_TYPES.contains(&slug)
}

pub fn is_start_type(slug: &str) -> bool {
    START_TYPES.contains(&slug)
}

pub fn is_branching_type(slug: &str) -> bool {
    BRANCHING_TYPES.contains(&slug)
}

/// How a start-family step is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerType {
    Manual,
    Schedule,
    Webhook,
}

crate::simple_display! {
    TriggerType {
        Manual => "manual",
        Schedule => "schedule",
        Webhook => "webhook",
    }
}

/// Canvas coordinates for the authoring UI.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// A node in the project DAG.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub name: String,
    /// Block slug: a built-in or a registered block definition.
    #[serde(rename = "type")]
    pub step_type: String,
    /// Opaque per-block configuration.
    #[serde(default)]
    pub config: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_definition_id: Option<BlockDefinitionId>,
    /// Populated only for start-family steps.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_type: Option<TriggerType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_config: Option<Value>,
    /// Logical credential slot name -> credential id.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub credential_bindings: IndexMap<String, CredentialId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_group_id: Option<BlockGroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_role: Option<String>,
    #[serde(default)]
    pub position: Position,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Step {
    pub fn is_start(&self) -> bool {
        is_start_type(&self.step_type)
    }

    pub fn is_branching(&self) -> bool {
        is_branching_type(&self.step_type)
    }

    /// Attach the step to a block group under the given role.
    ///
    /// Start steps are entry points and never group members.
    pub fn attach_to_group(
        &mut self,
        group_id: BlockGroupId,
        role: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if self.is_start() {
            return Err(Error::StepCannotBeInGroup);
        }
        let role = role.into();
        if role.is_empty() {
            return Err(Error::validation("group_role", "group role is required"));
        }
        self.block_group_id = Some(group_id);
        self.group_role = Some(role);
        self.updated_at = now;
        Ok(())
    }

    /// Clear group membership.
    pub fn detach_from_group(&mut self, now: DateTime<Utc>) {
        self.block_group_id = None;
        self.group_role = None;
        self.updated_at = now;
    }

    /// The entry-point label on a start step's trigger config, when present.
    pub fn entry_point(&self) -> Option<&str> {
        self.trigger_config.as_ref()?.get("entry_point")?.as_str()
    }
}

crate::builder! {
    pub struct StepBuilder => Step {
        into {
            name: String = "test-step",
            step_type: String = "function",
        }
        set {
            id: StepId = StepId::new(),
            tenant_id: TenantId = TenantId::new(),
            project_id: ProjectId = ProjectId::new(),
            config: Value = Value::Null,
            credential_bindings: IndexMap<String, CredentialId> = IndexMap::new(),
            position: Position = Position::default(),
        }
        option {
            block_definition_id: BlockDefinitionId = None,
            trigger_type: TriggerType = None,
            trigger_config: Value = None,
            block_group_id: BlockGroupId = None,
            group_role: String = None,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
            updated_at: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "step_tests.rs"]
mod tests;
