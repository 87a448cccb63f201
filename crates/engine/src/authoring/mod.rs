// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! DAG authoring engine: step/edge/group CRUD, validation, draft overlay,
//! and save-as-version.

mod edges;
mod groups;
mod save;
mod steps;
mod validate;

pub use groups::GroupInput;
pub use validate::{PublishCheck, PublishReport, PublishStatus};

use orq_core::{
    BlockGroup, BlockGroupId, Clock, Edge, Position, Project, ProjectId, Result, Step, StepId,
    TenantId, TriggerType,
};
use orq_storage::{
    BlockDefinitionRepo, BlockGroupRepo, EdgeRepo, ProjectRepo, StepRepo,
};
use serde_json::Value;
use std::sync::Arc;

use crate::guard::{check_editable, check_exists};
use crate::versions::VersionStore;

/// Fields accepted when creating or updating a step.
#[derive(Debug, Clone)]
pub struct StepInput {
    pub name: String,
    pub step_type: String,
    pub config: Value,
    pub trigger_type: Option<TriggerType>,
    pub trigger_config: Option<Value>,
    /// Raw bindings blob; empty objects and the literal `"null"` are skipped.
    pub credential_bindings: Option<Value>,
    pub position: Position,
}

impl StepInput {
    pub fn new(name: impl Into<String>, step_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            step_type: step_type.into(),
            config: Value::Null,
            trigger_type: None,
            trigger_config: None,
            credential_bindings: None,
            position: Position::default(),
        }
    }

    orq_core::setters! {
        set {
            config: Value,
            position: Position,
        }
        option {
            trigger_type: TriggerType,
            trigger_config: Value,
            credential_bindings: Value,
        }
    }
}

/// Fields accepted when creating an edge.
#[derive(Debug, Clone, Default)]
pub struct EdgeInput {
    pub source_step_id: Option<StepId>,
    pub source_block_group_id: Option<BlockGroupId>,
    pub target_step_id: Option<StepId>,
    pub target_block_group_id: Option<BlockGroupId>,
    pub source_port: String,
    pub target_port: String,
    pub condition: Option<String>,
}

impl EdgeInput {
    /// Plain step-to-step edge on default ports.
    pub fn between(source: StepId, target: StepId) -> Self {
        Self { source_step_id: Some(source), target_step_id: Some(target), ..Self::default() }
    }

    orq_core::setters! {
        into {
            source_port: String,
            target_port: String,
        }
        option {
            condition: String,
        }
    }
}

/// The full payload applied by `save` (and by `restore_version`).
#[derive(Debug, Clone)]
pub struct SaveProject {
    pub name: String,
    pub description: String,
    pub variables: Value,
    pub steps: Vec<Step>,
    pub edges: Vec<Edge>,
}

/// A project together with its (possibly draft-overlaid) children.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectDetails {
    pub project: Project,
    pub steps: Vec<Step>,
    pub edges: Vec<Edge>,
    pub block_groups: Vec<BlockGroup>,
}

/// The authoring engine. Every mutation is gated by an authorization guard.
pub struct Authoring<C: Clock> {
    pub(crate) projects: Arc<dyn ProjectRepo>,
    pub(crate) steps: Arc<dyn StepRepo>,
    pub(crate) edges: Arc<dyn EdgeRepo>,
    pub(crate) groups: Arc<dyn BlockGroupRepo>,
    pub(crate) versions: VersionStore,
    /// When absent, port validation is skipped entirely.
    pub(crate) block_definitions: Option<Arc<dyn BlockDefinitionRepo>>,
    pub(crate) clock: C,
}

impl<C: Clock> Authoring<C> {
    pub fn new(
        projects: Arc<dyn ProjectRepo>,
        steps: Arc<dyn StepRepo>,
        edges: Arc<dyn EdgeRepo>,
        groups: Arc<dyn BlockGroupRepo>,
        versions: VersionStore,
        block_definitions: Option<Arc<dyn BlockDefinitionRepo>>,
        clock: C,
    ) -> Self {
        Self { projects, steps, edges, groups, versions, block_definitions, clock }
    }

    /// The version store this engine snapshots into.
    pub fn versions(&self) -> &VersionStore {
        &self.versions
    }

    /// Create a fresh draft project.
    pub async fn create_project(
        &self,
        tenant: TenantId,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Project> {
        let name = name.into();
        if name.is_empty() {
            return Err(orq_core::Error::validation("name", "project name is required"));
        }
        let mut project = Project::new(tenant, name, self.clock.now());
        project.description = description.into();
        self.projects.create(&project).await?;
        tracing::info!(project_id = %project.id, tenant_id = %tenant, "project created");
        Ok(project)
    }

    /// Update the project's descriptive fields.
    pub async fn update_project(
        &self,
        tenant: TenantId,
        id: ProjectId,
        name: Option<String>,
        description: Option<String>,
        variables: Option<Value>,
    ) -> Result<Project> {
        let mut project = check_editable(self.projects.as_ref(), tenant, id).await?;
        if let Some(name) = name {
            if name.is_empty() {
                return Err(orq_core::Error::validation("name", "project name is required"));
            }
            project.name = name;
        }
        if let Some(description) = description {
            project.description = description;
        }
        if let Some(variables) = variables {
            project.variables = variables;
        }
        project.updated_at = self.clock.now();
        self.projects.update(&project).await?;
        Ok(project)
    }

    /// Delete a project and everything it owns. System projects are refused.
    pub async fn delete_project(&self, tenant: TenantId, id: ProjectId) -> Result<()> {
        let project = check_exists(self.projects.as_ref(), tenant, id).await?;
        project.ensure_deletable()?;

        // Children first, edges before steps.
        self.edges.delete_by_project(id).await?;
        self.steps.delete_by_project(id).await?;
        for group in self.groups.list_by_project(id).await? {
            self.groups.delete(group.id).await?;
        }
        self.projects.delete(id).await?;
        tracing::info!(project_id = %id, tenant_id = %tenant, "project deleted");
        Ok(())
    }

    /// Project plus children, with the draft overlaid when one exists.
    pub async fn get_with_details(&self, tenant: TenantId, id: ProjectId) -> Result<ProjectDetails> {
        let project = check_exists(self.projects.as_ref(), tenant, id).await?;
        let block_groups = self.groups.list_by_project(id).await?;

        if let Some(draft) = project.draft.clone() {
            let mut overlaid = project.clone();
            overlaid.name = draft.name.clone();
            overlaid.description = draft.description.clone();
            overlaid.variables = draft.variables.clone();
            return Ok(ProjectDetails {
                project: overlaid,
                steps: draft.steps,
                edges: draft.edges,
                block_groups,
            });
        }

        let steps = self.steps.list_by_project(id).await?;
        let edges = self.edges.list_by_project(id).await?;
        Ok(ProjectDetails { project, steps, edges, block_groups })
    }
}

#[cfg(test)]
#[path = "../authoring_tests.rs"]
mod tests;
