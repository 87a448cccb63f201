// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Step CRUD and group membership.

use indexmap::IndexMap;
use orq_core::{
    is_built_in_type, is_start_type, BlockDefinitionId, BlockGroupId, Clock, CredentialId, Error,
    ProjectId, Resource, Result, Step, StepId, TenantId,
};
use serde_json::Value;

use super::{Authoring, StepInput};
use crate::guard::check_editable;

impl<C: Clock> Authoring<C> {
    /// Create a step on a project.
    pub async fn create_step(
        &self,
        tenant: TenantId,
        project: ProjectId,
        input: StepInput,
    ) -> Result<Step> {
        check_editable(self.projects.as_ref(), tenant, project).await?;
        let now = self.clock.now();

        if input.name.is_empty() {
            return Err(Error::validation("name", "step name is required"));
        }
        let block_definition_id = self.resolve_step_type(tenant, &input.step_type).await?;

        if !is_start_type(&input.step_type)
            && (input.trigger_type.is_some() || input.trigger_config.is_some())
        {
            return Err(Error::validation(
                "trigger_type",
                "trigger fields are only valid on start steps",
            ));
        }

        let credential_bindings = parse_credential_bindings(input.credential_bindings.as_ref())?;

        let step = Step {
            id: StepId::new(),
            tenant_id: tenant,
            project_id: project,
            name: input.name,
            step_type: input.step_type,
            config: input.config,
            block_definition_id,
            trigger_type: input.trigger_type,
            trigger_config: input.trigger_config,
            credential_bindings,
            block_group_id: None,
            group_role: None,
            position: input.position,
            created_at: now,
            updated_at: now,
        };
        self.steps.create(&step).await?;
        tracing::info!(step_id = %step.id, project_id = %project, step_type = %step.step_type, "step created");
        Ok(step)
    }

    /// Apply new fields onto an existing step.
    pub async fn update_step(
        &self,
        tenant: TenantId,
        project: ProjectId,
        step_id: StepId,
        input: StepInput,
    ) -> Result<Step> {
        check_editable(self.projects.as_ref(), tenant, project).await?;
        let mut step = self.require_step(project, step_id).await?;

        if input.name.is_empty() {
            return Err(Error::validation("name", "step name is required"));
        }
        let block_definition_id = self.resolve_step_type(tenant, &input.step_type).await?;

        step.name = input.name;
        step.step_type = input.step_type;
        step.config = input.config;
        step.block_definition_id = block_definition_id;
        step.trigger_type = input.trigger_type;
        step.trigger_config = input.trigger_config;
        if input.credential_bindings.is_some() {
            step.credential_bindings =
                parse_credential_bindings(input.credential_bindings.as_ref())?;
        }
        step.position = input.position;
        step.updated_at = self.clock.now();

        self.steps.update(&step).await?;
        Ok(step)
    }

    /// Delete a step and any edges touching it.
    pub async fn delete_step(
        &self,
        tenant: TenantId,
        project: ProjectId,
        step_id: StepId,
    ) -> Result<()> {
        check_editable(self.projects.as_ref(), tenant, project).await?;
        self.require_step(project, step_id).await?;

        for edge in self.edges.list_by_project(project).await? {
            if edge.source_step_id == Some(step_id) || edge.target_step_id == Some(step_id) {
                self.edges.delete(edge.id).await?;
            }
        }
        self.steps.delete(step_id).await?;
        tracing::info!(step_id = %step_id, project_id = %project, "step deleted");
        Ok(())
    }

    /// Attach a step to a block group under a role.
    pub async fn add_step_to_group(
        &self,
        tenant: TenantId,
        project: ProjectId,
        step_id: StepId,
        group_id: BlockGroupId,
        role: &str,
    ) -> Result<Step> {
        check_editable(self.projects.as_ref(), tenant, project).await?;
        let mut step = self.require_step(project, step_id).await?;
        let group = self
            .groups
            .get(group_id)
            .await?
            .filter(|g| g.project_id == project)
            .ok_or_else(|| Error::not_found(Resource::BlockGroup, group_id))?;

        step.attach_to_group(group.id, role, self.clock.now())?;
        self.steps.update(&step).await?;
        Ok(step)
    }

    /// Clear a step's group membership.
    pub async fn remove_step_from_group(
        &self,
        tenant: TenantId,
        project: ProjectId,
        step_id: StepId,
    ) -> Result<Step> {
        check_editable(self.projects.as_ref(), tenant, project).await?;
        let mut step = self.require_step(project, step_id).await?;
        step.detach_from_group(self.clock.now());
        self.steps.update(&step).await?;
        Ok(step)
    }

    pub(crate) async fn require_step(&self, project: ProjectId, step_id: StepId) -> Result<Step> {
        self.steps
            .get(step_id)
            .await?
            .filter(|s| s.project_id == project)
            .ok_or_else(|| Error::not_found(Resource::Step, step_id))
    }

    /// A step type is a built-in slug or a registered block definition,
    /// tenant-scoped first, then system-scoped.
    pub(crate) async fn resolve_step_type(
        &self,
        tenant: TenantId,
        slug: &str,
    ) -> Result<Option<BlockDefinitionId>> {
        if slug.is_empty() {
            return Err(Error::validation("type", "step type is required"));
        }
        let Some(definitions) = &self.block_definitions else {
            if is_built_in_type(slug) {
                return Ok(None);
            }
            return Err(Error::validation("type", format!("unknown step type {slug:?}")));
        };

        if let Some(def) = definitions.find_by_slug(Some(tenant), slug).await? {
            return Ok(Some(def.id));
        }
        if let Some(def) = definitions.find_by_slug(None, slug).await? {
            return Ok(Some(def.id));
        }
        if is_built_in_type(slug) {
            return Ok(None);
        }
        Err(Error::validation("type", format!("unknown step type {slug:?}")))
    }
}

/// Parse the raw bindings blob. Empty maps and the literal `"null"` are
/// treated as absent.
fn parse_credential_bindings(raw: Option<&Value>) -> Result<IndexMap<String, CredentialId>> {
    let mut bindings = IndexMap::new();
    let raw = match raw {
        None | Some(Value::Null) => return Ok(bindings),
        Some(Value::String(s)) if s == "null" || s.is_empty() => return Ok(bindings),
        Some(value) => value,
    };
    let Some(fields) = raw.as_object() else {
        return Err(Error::validation("credential_bindings", "expected an object"));
    };
    for (slot, id) in fields {
        let Some(id) = id.as_str() else {
            return Err(Error::validation(
                "credential_bindings",
                format!("binding {slot:?} must be a credential id string"),
            ));
        };
        bindings.insert(slot.clone(), CredentialId::parse(id)?);
    }
    Ok(bindings)
}
