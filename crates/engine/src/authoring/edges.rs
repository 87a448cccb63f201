// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Edge CRUD with cycle and port validation.

use orq_core::{
    BlockDefinition, BlockGroup, Clock, Edge, EdgeId, Endpoint, Error, ProjectId, Resource,
    Result, Step, TenantId, GROUP_INPUT_PORT,
};
use std::collections::HashMap;

use super::Authoring;
use crate::graph::would_cycle;
use crate::guard::check_editable;

impl<C: Clock> Authoring<C> {
    /// Create an edge, enforcing endpoint, cycle, and port rules.
    pub async fn create_edge(
        &self,
        tenant: TenantId,
        project: ProjectId,
        input: super::EdgeInput,
    ) -> Result<Edge> {
        check_editable(self.projects.as_ref(), tenant, project).await?;
        let now = self.clock.now();

        let edge = Edge {
            id: EdgeId::new(),
            tenant_id: tenant,
            project_id: project,
            source_step_id: input.source_step_id,
            source_block_group_id: input.source_block_group_id,
            target_step_id: input.target_step_id,
            target_block_group_id: input.target_block_group_id,
            source_port: input.source_port,
            target_port: input.target_port,
            condition: input.condition,
            created_at: now,
            updated_at: now,
        };

        // Endpoint shape first: exactly one of step/group per side.
        let source = edge.source()?;
        let target = edge.target()?;
        if edge.is_self_loop() {
            return Err(Error::EdgeSelfLoop);
        }

        let steps = self.steps.list_by_project(project).await?;
        let groups = self.groups.list_by_project(project).await?;
        let steps_by_id: HashMap<_, _> = steps.iter().map(|s| (s.id, s)).collect();
        let groups_by_id: HashMap<_, _> = groups.iter().map(|g| (g.id, g)).collect();

        for (side, endpoint) in [("source", source), ("target", target)] {
            match endpoint {
                Endpoint::Step(id) if !steps_by_id.contains_key(&id) => {
                    return Err(Error::not_found(Resource::Step, format!("{side} {id}")));
                }
                Endpoint::Group(id) if !groups_by_id.contains_key(&id) => {
                    return Err(Error::not_found(Resource::BlockGroup, format!("{side} {id}")));
                }
                _ => {}
            }
        }

        // Start steps are entry points, never edge targets.
        if let Endpoint::Step(id) = target {
            if steps_by_id.get(&id).is_some_and(|s| s.is_start()) {
                return Err(Error::validation(
                    "target_step_id",
                    "start steps cannot be edge targets",
                ));
            }
        }

        // Step-to-step connections must keep the step subgraph acyclic.
        if let (Endpoint::Step(source), Endpoint::Step(target)) = (source, target) {
            let existing = self.edges.list_by_project(project).await?;
            if would_cycle(&existing, source, target) {
                return Err(Error::EdgeCreatesCycle);
            }
        }

        self.validate_edge_ports(tenant, &edge, &steps_by_id, &groups_by_id).await?;

        self.edges.create(&edge).await?;
        tracing::info!(edge_id = %edge.id, project_id = %project, "edge created");
        Ok(edge)
    }

    pub async fn delete_edge(
        &self,
        tenant: TenantId,
        project: ProjectId,
        edge_id: EdgeId,
    ) -> Result<()> {
        check_editable(self.projects.as_ref(), tenant, project).await?;
        self.edges
            .get(edge_id)
            .await?
            .filter(|e| e.project_id == project)
            .ok_or_else(|| Error::not_found(Resource::Edge, edge_id))?;
        self.edges.delete(edge_id).await?;
        Ok(())
    }

    /// Port validation against block definitions.
    ///
    /// Skipped entirely when no definition repository is configured, for any
    /// empty port, and for endpoints whose definition is unknown (legacy
    /// blocks). The virtual `group-input` port is always valid on group
    /// targets.
    pub(crate) async fn validate_edge_ports(
        &self,
        tenant: TenantId,
        edge: &Edge,
        steps_by_id: &HashMap<orq_core::StepId, &Step>,
        groups_by_id: &HashMap<orq_core::BlockGroupId, &BlockGroup>,
    ) -> Result<()> {
        if self.block_definitions.is_none() {
            return Ok(());
        }

        if !edge.source_port.is_empty() {
            if let Some(def) =
                self.endpoint_definition(tenant, edge.source()?, steps_by_id, groups_by_id).await?
            {
                if !def.has_output_port(&edge.source_port) {
                    return Err(Error::SourcePortNotFound {
                        port: edge.source_port.clone(),
                        block: def.slug,
                    });
                }
            }
        }

        if !edge.target_port.is_empty() {
            let target = edge.target()?;
            if matches!(target, Endpoint::Group(_)) && edge.target_port == GROUP_INPUT_PORT {
                return Ok(());
            }
            if let Some(def) =
                self.endpoint_definition(tenant, target, steps_by_id, groups_by_id).await?
            {
                if !def.has_input_port(&edge.target_port) {
                    return Err(Error::TargetPortNotFound {
                        port: edge.target_port.clone(),
                        block: def.slug,
                    });
                }
            }
        }
        Ok(())
    }

    /// Definition for an endpoint: by the step's `block_definition_id` when
    /// present, else by slug (step type or group type), tenant first then
    /// system. `None` when unknown.
    async fn endpoint_definition(
        &self,
        tenant: TenantId,
        endpoint: Endpoint,
        steps_by_id: &HashMap<orq_core::StepId, &Step>,
        groups_by_id: &HashMap<orq_core::BlockGroupId, &BlockGroup>,
    ) -> Result<Option<BlockDefinition>> {
        let Some(definitions) = &self.block_definitions else {
            return Ok(None);
        };
        let slug = match endpoint {
            Endpoint::Step(id) => {
                let Some(step) = steps_by_id.get(&id) else { return Ok(None) };
                if let Some(def_id) = step.block_definition_id {
                    if let Some(def) = definitions.get(def_id).await? {
                        return Ok(Some(def));
                    }
                }
                step.step_type.clone()
            }
            Endpoint::Group(id) => {
                let Some(group) = groups_by_id.get(&id) else { return Ok(None) };
                group.group_type.to_string()
            }
        };
        if let Some(def) = definitions.find_by_slug(Some(tenant), &slug).await? {
            return Ok(Some(def));
        }
        Ok(definitions.find_by_slug(None, &slug).await?)
    }
}
