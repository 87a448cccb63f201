// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Save, draft overlay, and restore-to-version.

use orq_core::{
    Clock, Edge, ProjectDefinition, ProjectDraft, ProjectId, ProjectVersion, Result, Step,
    TenantId,
};
use serde_json::Value;
use std::collections::HashMap;

use super::{Authoring, ProjectDetails, SaveProject};
use crate::guard::check_editable;

impl<C: Clock> Authoring<C> {
    /// The composite save: validate, replace steps and edges, bump the
    /// version, snapshot, persist.
    ///
    /// Concurrent saves on one project serialize on the snapshot append (the
    /// (project, version) key is write-once) and on the final
    /// compare-and-set project update; the loser fails with a conflict and
    /// no state is lost.
    pub async fn save(
        &self,
        tenant: TenantId,
        project_id: ProjectId,
        payload: SaveProject,
    ) -> Result<ProjectDetails> {
        let mut project = check_editable(self.projects.as_ref(), tenant, project_id).await?;
        let old_version = project.version;
        let now = self.clock.now();

        // Working copy of the incoming children, stamped for this project.
        let mut steps = payload.steps;
        let mut edges = payload.edges;
        for step in &mut steps {
            step.tenant_id = tenant;
            step.project_id = project_id;
        }
        for edge in &mut edges {
            edge.tenant_id = tenant;
            edge.project_id = project_id;
        }

        super::validate::validate_dag(&steps, &edges)?;

        let groups = self.groups.list_by_project(project_id).await?;
        let steps_by_id: HashMap<_, _> = steps.iter().map(|s| (s.id, s)).collect();
        let groups_by_id: HashMap<_, _> = groups.iter().map(|g| (g.id, g)).collect();
        for edge in &edges {
            self.validate_edge_ports(tenant, edge, &steps_by_id, &groups_by_id).await?;
        }

        project.name = payload.name;
        project.description = payload.description;
        project.variables = payload.variables;
        project.input_schema = self.derive_input_schema(tenant, &steps, &edges).await?;

        // Replace children wholesale, edges first for foreign-key ordering.
        self.edges.delete_by_project(project_id).await?;
        self.steps.delete_by_project(project_id).await?;
        for edge in &edges {
            self.edges.create(edge).await?;
        }
        for step in &steps {
            self.steps.create(step).await?;
        }

        let new_version = project.increment_version(now);
        project.clear_draft(now);

        // Snapshot with the freshly reloaded groups. The append doubles as
        // the save lock: a concurrent save targeting the same version
        // conflicts here before the project row moves.
        let groups = self.groups.list_by_project(project_id).await?;
        let definition =
            ProjectDefinition::from_parts(&project, steps.clone(), edges.clone(), groups.clone());
        let snapshot = ProjectVersion::new(project_id, new_version, definition, now);
        self.versions.append(&snapshot).await?;

        self.projects.update_versioned(&project, old_version).await?;
        tracing::info!(
            project_id = %project_id,
            version = new_version,
            steps = steps.len(),
            edges = edges.len(),
            "project saved"
        );

        Ok(ProjectDetails { project, steps, edges, block_groups: groups })
    }

    /// Store the draft overlay. No structural validation, no version, no
    /// writes to the steps and edges tables.
    pub async fn save_draft(
        &self,
        tenant: TenantId,
        project_id: ProjectId,
        payload: SaveProject,
    ) -> Result<()> {
        let mut project = check_editable(self.projects.as_ref(), tenant, project_id).await?;
        let now = self.clock.now();

        let mut steps = payload.steps;
        let mut edges = payload.edges;
        for step in &mut steps {
            step.tenant_id = tenant;
            step.project_id = project_id;
        }
        for edge in &mut edges {
            edge.tenant_id = tenant;
            edge.project_id = project_id;
        }

        project.set_draft(
            ProjectDraft {
                name: payload.name,
                description: payload.description,
                variables: payload.variables,
                steps,
                edges,
                updated_at: now,
            },
            now,
        );
        self.projects.update(&project).await?;
        tracing::info!(project_id = %project_id, "draft saved");
        Ok(())
    }

    /// Drop the draft and re-read children from storage.
    pub async fn discard_draft(
        &self,
        tenant: TenantId,
        project_id: ProjectId,
    ) -> Result<ProjectDetails> {
        let mut project = check_editable(self.projects.as_ref(), tenant, project_id).await?;
        project.clear_draft(self.clock.now());
        self.projects.update(&project).await?;

        let steps = self.steps.list_by_project(project_id).await?;
        let edges = self.edges.list_by_project(project_id).await?;
        let block_groups = self.groups.list_by_project(project_id).await?;
        tracing::info!(project_id = %project_id, "draft discarded");
        Ok(ProjectDetails { project, steps, edges, block_groups })
    }

    /// Restore a project to a snapshot by saving the snapshot's contents as
    /// a new version.
    pub async fn restore_version(
        &self,
        tenant: TenantId,
        project_id: ProjectId,
        target_version: u32,
    ) -> Result<ProjectDetails> {
        let snapshot = self.versions.get(project_id, target_version).await?;
        let definition = snapshot.definition;
        self.save(
            tenant,
            project_id,
            SaveProject {
                name: definition.name,
                description: definition.description,
                variables: definition.variables,
                steps: definition.steps,
                edges: definition.edges,
            },
        )
        .await
    }

    /// Best-effort input schema: the declared schema of the first step
    /// reachable from the project's start block. Unknown definitions skip
    /// derivation silently.
    async fn derive_input_schema(
        &self,
        tenant: TenantId,
        steps: &[Step],
        edges: &[Edge],
    ) -> Result<Option<Value>> {
        let Some(start) = steps.iter().find(|s| s.is_start()) else { return Ok(None) };

        let first = edges
            .iter()
            .find(|e| e.source_step_id == Some(start.id))
            .and_then(|e| e.target_step_id)
            .and_then(|id| steps.iter().find(|s| s.id == id))
            .unwrap_or(start);

        match self.step_definition(tenant, first).await {
            Ok(Some(def)) => Ok(def.input_schema),
            Ok(None) => Ok(None),
            // Derivation is advisory; lookup failures never block a save.
            Err(err) => {
                tracing::warn!(error = %err, "input schema derivation skipped");
                Ok(None)
            }
        }
    }
}
