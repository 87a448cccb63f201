// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Block group CRUD.

use orq_core::{
    BlockGroup, BlockGroupId, BlockGroupType, Clock, Error, ProjectId, Resource, Result, TenantId,
};
use serde_json::Value;

use super::Authoring;
use crate::guard::check_editable;

/// Fields accepted when creating or updating a block group.
#[derive(Debug, Clone)]
pub struct GroupInput {
    pub name: String,
    pub group_type: BlockGroupType,
    pub parent_group_id: Option<BlockGroupId>,
    pub config: Value,
    pub pre_process: Option<String>,
    pub post_process: Option<String>,
}

impl GroupInput {
    pub fn new(name: impl Into<String>, group_type: BlockGroupType) -> Self {
        Self {
            name: name.into(),
            group_type,
            parent_group_id: None,
            config: Value::Null,
            pre_process: None,
            post_process: None,
        }
    }

    orq_core::setters! {
        set {
            config: Value,
        }
        option {
            parent_group_id: BlockGroupId,
            pre_process: String,
            post_process: String,
        }
    }
}

impl<C: Clock> Authoring<C> {
    /// Create a block group, optionally nested under an existing group.
    pub async fn create_group(
        &self,
        tenant: TenantId,
        project: ProjectId,
        input: GroupInput,
    ) -> Result<BlockGroup> {
        check_editable(self.projects.as_ref(), tenant, project).await?;
        if input.name.is_empty() {
            return Err(Error::validation("name", "block group name is required"));
        }
        if let Some(parent) = input.parent_group_id {
            self.require_group(project, parent).await?;
        }
        let now = self.clock.now();
        let group = BlockGroup {
            id: BlockGroupId::new(),
            tenant_id: tenant,
            project_id: project,
            name: input.name,
            group_type: input.group_type,
            parent_group_id: input.parent_group_id,
            config: input.config,
            pre_process: input.pre_process,
            post_process: input.post_process,
            created_at: now,
            updated_at: now,
        };
        self.groups.create(&group).await?;
        tracing::info!(group_id = %group.id, project_id = %project, group_type = %group.group_type, "block group created");
        Ok(group)
    }

    /// Update a block group. Self-parenting is rejected.
    pub async fn update_group(
        &self,
        tenant: TenantId,
        project: ProjectId,
        group_id: BlockGroupId,
        input: GroupInput,
    ) -> Result<BlockGroup> {
        check_editable(self.projects.as_ref(), tenant, project).await?;
        let mut group = self.require_group(project, group_id).await?;

        if input.name.is_empty() {
            return Err(Error::validation("name", "block group name is required"));
        }
        if let Some(parent) = input.parent_group_id {
            if parent != group_id {
                self.require_group(project, parent).await?;
            }
        }
        let now = self.clock.now();
        group.set_parent(input.parent_group_id, now)?;
        group.name = input.name;
        group.group_type = input.group_type;
        group.config = input.config;
        group.pre_process = input.pre_process;
        group.post_process = input.post_process;
        group.updated_at = now;

        self.groups.update(&group).await?;
        Ok(group)
    }

    /// Delete a block group, detaching its member steps and edges.
    pub async fn delete_group(
        &self,
        tenant: TenantId,
        project: ProjectId,
        group_id: BlockGroupId,
    ) -> Result<()> {
        check_editable(self.projects.as_ref(), tenant, project).await?;
        self.require_group(project, group_id).await?;
        let now = self.clock.now();

        for mut step in self.steps.list_by_project(project).await? {
            if step.block_group_id == Some(group_id) {
                step.detach_from_group(now);
                self.steps.update(&step).await?;
            }
        }
        for edge in self.edges.list_by_project(project).await? {
            if edge.source_block_group_id == Some(group_id)
                || edge.target_block_group_id == Some(group_id)
            {
                self.edges.delete(edge.id).await?;
            }
        }
        self.groups.delete(group_id).await?;
        tracing::info!(group_id = %group_id, project_id = %project, "block group deleted");
        Ok(())
    }

    pub(crate) async fn require_group(
        &self,
        project: ProjectId,
        group_id: BlockGroupId,
    ) -> Result<BlockGroup> {
        self.groups
            .get(group_id)
            .await?
            .filter(|g| g.project_id == project)
            .ok_or_else(|| Error::not_found(Resource::BlockGroup, group_id))
    }
}
