// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Authoring aggregates: projects, steps, edges, groups, snapshots,
//! block definitions.

use async_trait::async_trait;
use orq_core::{
    BlockDefinition, BlockGroup, BlockGroupId, Edge, EdgeId, Project, ProjectId, ProjectVersion,
    Step, StepId, TenantId,
};

use super::MemoryStore;
use crate::error::StoreError;
use crate::repo::{
    BlockDefinitionRepo, BlockGroupRepo, EdgeRepo, ProjectRepo, StepRepo, VersionRepo,
};

type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
impl ProjectRepo for MemoryStore {
    async fn create(&self, project: &Project) -> Result<()> {
        let mut projects = self.projects.write();
        if projects.contains_key(&project.id) {
            return Err(StoreError::Conflict(format!("project {} already exists", project.id)));
        }
        projects.insert(project.id, project.clone());
        Ok(())
    }

    async fn get(&self, id: ProjectId) -> Result<Option<Project>> {
        Ok(self.projects.read().get(&id).cloned())
    }

    async fn update(&self, project: &Project) -> Result<()> {
        self.projects.write().insert(project.id, project.clone());
        Ok(())
    }

    async fn update_versioned(&self, project: &Project, expected_version: u32) -> Result<()> {
        let mut projects = self.projects.write();
        match projects.get(&project.id) {
            Some(stored) if stored.version == expected_version => {
                projects.insert(project.id, project.clone());
                Ok(())
            }
            Some(stored) => Err(StoreError::Conflict(format!(
                "project {} version moved: expected {expected_version}, found {}",
                project.id, stored.version
            ))),
            None => Err(StoreError::Conflict(format!("project {} vanished", project.id))),
        }
    }

    async fn delete(&self, id: ProjectId) -> Result<()> {
        self.projects.write().remove(&id);
        Ok(())
    }

    async fn list_by_tenant(&self, tenant: TenantId) -> Result<Vec<Project>> {
        let mut out: Vec<Project> =
            self.projects.read().values().filter(|p| p.tenant_id == tenant).cloned().collect();
        out.sort_by_key(|p| p.created_at);
        Ok(out)
    }

    async fn find_system_by_slug(&self, slug: &str) -> Result<Option<Project>> {
        Ok(self
            .projects
            .read()
            .values()
            .find(|p| p.is_system && p.slug.as_deref() == Some(slug))
            .cloned())
    }
}

#[async_trait]
impl StepRepo for MemoryStore {
    async fn create(&self, step: &Step) -> Result<()> {
        self.steps.write().push(step.clone());
        Ok(())
    }

    async fn get(&self, id: StepId) -> Result<Option<Step>> {
        Ok(self.steps.read().iter().find(|s| s.id == id).cloned())
    }

    async fn update(&self, step: &Step) -> Result<()> {
        let mut steps = self.steps.write();
        if let Some(slot) = steps.iter_mut().find(|s| s.id == step.id) {
            *slot = step.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: StepId) -> Result<()> {
        self.steps.write().retain(|s| s.id != id);
        Ok(())
    }

    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Step>> {
        Ok(self.steps.read().iter().filter(|s| s.project_id == project).cloned().collect())
    }

    async fn delete_by_project(&self, project: ProjectId) -> Result<()> {
        self.steps.write().retain(|s| s.project_id != project);
        Ok(())
    }
}

#[async_trait]
impl EdgeRepo for MemoryStore {
    async fn create(&self, edge: &Edge) -> Result<()> {
        self.edges.write().push(edge.clone());
        Ok(())
    }

    async fn get(&self, id: EdgeId) -> Result<Option<Edge>> {
        Ok(self.edges.read().iter().find(|e| e.id == id).cloned())
    }

    async fn delete(&self, id: EdgeId) -> Result<()> {
        self.edges.write().retain(|e| e.id != id);
        Ok(())
    }

    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Edge>> {
        Ok(self.edges.read().iter().filter(|e| e.project_id == project).cloned().collect())
    }

    async fn delete_by_project(&self, project: ProjectId) -> Result<()> {
        self.edges.write().retain(|e| e.project_id != project);
        Ok(())
    }
}

#[async_trait]
impl BlockGroupRepo for MemoryStore {
    async fn create(&self, group: &BlockGroup) -> Result<()> {
        self.block_groups.write().push(group.clone());
        Ok(())
    }

    async fn get(&self, id: BlockGroupId) -> Result<Option<BlockGroup>> {
        Ok(self.block_groups.read().iter().find(|g| g.id == id).cloned())
    }

    async fn update(&self, group: &BlockGroup) -> Result<()> {
        let mut groups = self.block_groups.write();
        if let Some(slot) = groups.iter_mut().find(|g| g.id == group.id) {
            *slot = group.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: BlockGroupId) -> Result<()> {
        self.block_groups.write().retain(|g| g.id != id);
        Ok(())
    }

    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<BlockGroup>> {
        Ok(self
            .block_groups
            .read()
            .iter()
            .filter(|g| g.project_id == project)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl VersionRepo for MemoryStore {
    async fn append(&self, version: &ProjectVersion) -> Result<()> {
        let mut versions = self.versions.write();
        if versions
            .iter()
            .any(|v| v.project_id == version.project_id && v.version == version.version)
        {
            return Err(StoreError::Conflict(format!(
                "snapshot ({}, {}) already exists",
                version.project_id, version.version
            )));
        }
        versions.push(version.clone());
        Ok(())
    }

    async fn get(&self, project: ProjectId, version: u32) -> Result<Option<ProjectVersion>> {
        Ok(self
            .versions
            .read()
            .iter()
            .find(|v| v.project_id == project && v.version == version)
            .cloned())
    }

    async fn latest(&self, project: ProjectId) -> Result<Option<ProjectVersion>> {
        Ok(self
            .versions
            .read()
            .iter()
            .filter(|v| v.project_id == project)
            .max_by_key(|v| v.version)
            .cloned())
    }

    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<ProjectVersion>> {
        let mut out: Vec<ProjectVersion> =
            self.versions.read().iter().filter(|v| v.project_id == project).cloned().collect();
        out.sort_by_key(|v| v.version);
        Ok(out)
    }
}

#[async_trait]
impl BlockDefinitionRepo for MemoryStore {
    async fn create(&self, definition: &BlockDefinition) -> Result<()> {
        let mut definitions = self.block_definitions.write();
        if definitions
            .iter()
            .any(|d| d.tenant_id == definition.tenant_id && d.slug == definition.slug)
        {
            return Err(StoreError::Conflict(format!(
                "block definition {:?} already exists in that scope",
                definition.slug
            )));
        }
        definitions.push(definition.clone());
        Ok(())
    }

    async fn get(&self, id: orq_core::BlockDefinitionId) -> Result<Option<BlockDefinition>> {
        Ok(self.block_definitions.read().iter().find(|d| d.id == id).cloned())
    }

    async fn find_by_slug(
        &self,
        tenant: Option<TenantId>,
        slug: &str,
    ) -> Result<Option<BlockDefinition>> {
        Ok(self
            .block_definitions
            .read()
            .iter()
            .find(|d| d.tenant_id == tenant && d.slug == slug)
            .cloned())
    }
}
