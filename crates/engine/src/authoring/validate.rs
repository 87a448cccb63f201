// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural DAG validation and the pre-publish check list.

use orq_core::{Clock, Edge, Error, Result, Step, TenantId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::Authoring;
use crate::graph::has_cycle;

/// Outcome of a single publish check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStatus {
    Passed,
    Warning,
    Error,
}

orq_core::simple_display! {
    PublishStatus {
        Passed => "passed",
        Warning => "warning",
        Error => "error",
    }
}

/// One entry in the pre-publish report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishCheck {
    pub id: String,
    pub label: String,
    pub status: PublishStatus,
    pub message: String,
}

impl PublishCheck {
    fn passed(id: &str, label: &str, message: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into(), status: PublishStatus::Passed, message: message.into() }
    }

    fn warning(id: &str, label: &str, message: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into(), status: PublishStatus::Warning, message: message.into() }
    }

    fn error(id: &str, label: &str, message: impl Into<String>) -> Self {
        Self { id: id.into(), label: label.into(), status: PublishStatus::Error, message: message.into() }
    }
}

/// The full pre-publish report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishReport {
    pub checks: Vec<PublishCheck>,
    pub can_publish: bool,
}

impl PublishReport {
    fn from_checks(checks: Vec<PublishCheck>) -> Self {
        let can_publish = checks.iter().all(|c| c.status != PublishStatus::Error);
        Self { checks, can_publish }
    }

    pub fn errors(&self) -> impl Iterator<Item = &PublishCheck> {
        self.checks.iter().filter(|c| c.status == PublishStatus::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &PublishCheck> {
        self.checks.iter().filter(|c| c.status == PublishStatus::Warning)
    }
}

/// A step counts as connected when it is an edge endpoint itself or belongs
/// to a group that is one.
fn connected_step_ids(steps: &[Step], edges: &[Edge]) -> HashSet<orq_core::StepId> {
    let mut group_endpoints = HashSet::new();
    let mut connected = HashSet::new();
    for edge in edges {
        if let Some(id) = edge.source_step_id {
            connected.insert(id);
        }
        if let Some(id) = edge.target_step_id {
            connected.insert(id);
        }
        if let Some(id) = edge.source_block_group_id {
            group_endpoints.insert(id);
        }
        if let Some(id) = edge.target_block_group_id {
            group_endpoints.insert(id);
        }
    }
    for step in steps {
        if step.block_group_id.is_some_and(|g| group_endpoints.contains(&g)) {
            connected.insert(step.id);
        }
    }
    connected
}

/// Structural validation run by `save`.
///
/// Rules: at least one step; the step subgraph is acyclic; with two or more
/// steps every step is connected; condition/switch steps with two or more
/// outgoing edges must live inside a block group.
pub(crate) fn validate_dag(steps: &[Step], edges: &[Edge]) -> Result<()> {
    if steps.is_empty() {
        return Err(Error::validation("steps", "at least one step is required"));
    }
    if has_cycle(edges) {
        return Err(Error::ProjectHasCycle);
    }
    if steps.len() >= 2 {
        let connected = connected_step_ids(steps, edges);
        if let Some(orphan) = steps.iter().find(|s| !connected.contains(&s.id)) {
            return Err(Error::ProjectHasUnconnected(orphan.name.clone()));
        }
    }
    for step in steps {
        if !step.is_branching() || step.block_group_id.is_some() {
            continue;
        }
        let outgoing = edges.iter().filter(|e| e.source_step_id == Some(step.id)).count();
        if outgoing >= 2 {
            return Err(Error::BranchOutsideGroup(step.name.clone()));
        }
    }
    Ok(())
}

impl<C: Clock> Authoring<C> {
    /// Produce the pre-publish check list for a project's current details.
    pub async fn validate_for_publish(
        &self,
        tenant: TenantId,
        project: orq_core::ProjectId,
    ) -> Result<PublishReport> {
        let details = self.get_with_details(tenant, project).await?;
        let steps = &details.steps;
        let edges = &details.edges;
        let mut checks = Vec::new();

        // 1. A start block exists.
        if steps.iter().any(Step::is_start) {
            checks.push(PublishCheck::passed("start_block", "Start block", "a start block exists"));
        } else {
            checks.push(PublishCheck::error(
                "start_block",
                "Start block",
                "the flow has no start block",
            ));
        }

        // 2. All blocks connected (warning).
        if steps.len() >= 2 {
            let connected = connected_step_ids(steps, edges);
            let orphans: Vec<&str> = steps
                .iter()
                .filter(|s| !connected.contains(&s.id))
                .map(|s| s.name.as_str())
                .collect();
            if orphans.is_empty() {
                checks.push(PublishCheck::passed(
                    "all_connected",
                    "Connectivity",
                    "all blocks are connected",
                ));
            } else {
                checks.push(PublishCheck::warning(
                    "all_connected",
                    "Connectivity",
                    format!("disconnected blocks: {}", orphans.join(", ")),
                ));
            }
        } else {
            checks.push(PublishCheck::passed(
                "all_connected",
                "Connectivity",
                "single-step flows are exempt",
            ));
        }

        // 3. No loops (error).
        if has_cycle(edges) {
            checks.push(PublishCheck::error("no_loops", "Loops", "the flow contains a cycle"));
        } else {
            checks.push(PublishCheck::passed("no_loops", "Loops", "no cycles detected"));
        }

        // 4. Required credential bindings (warning per missing slot).
        // 6. Required step-config fields (warning per missing field).
        for step in steps {
            let Some(def) = self.step_definition(tenant, step).await? else { continue };
            for slot in &def.required_credentials {
                if !step.credential_bindings.contains_key(slot) {
                    checks.push(PublishCheck::warning(
                        "credential_bindings",
                        "Credentials",
                        format!("step {:?} is missing credential {slot:?}", step.name),
                    ));
                }
            }
            for field in &def.required_config_fields {
                if step.config.get(field).is_none() {
                    checks.push(PublishCheck::warning(
                        "required_config",
                        "Configuration",
                        format!("step {:?} is missing config field {field:?}", step.name),
                    ));
                }
            }
        }

        // 5. Trigger enabled (warning).
        let start_steps: Vec<&Step> = steps.iter().filter(|s| s.is_start()).collect();
        if !start_steps.is_empty() {
            if start_steps.iter().any(|s| s.trigger_type.is_some()) {
                checks.push(PublishCheck::passed(
                    "trigger_enabled",
                    "Trigger",
                    "a trigger is configured",
                ));
            } else {
                checks.push(PublishCheck::warning(
                    "trigger_enabled",
                    "Trigger",
                    "no start block has a trigger configured",
                ));
            }
        }

        Ok(PublishReport::from_checks(checks))
    }

    /// Definition for one step, by id then slug, tenant first then system.
    pub(crate) async fn step_definition(
        &self,
        tenant: TenantId,
        step: &Step,
    ) -> Result<Option<orq_core::BlockDefinition>> {
        let Some(definitions) = &self.block_definitions else { return Ok(None) };
        if let Some(def_id) = step.block_definition_id {
            if let Some(def) = definitions.get(def_id).await? {
                return Ok(Some(def));
            }
        }
        if let Some(def) = definitions.find_by_slug(Some(tenant), &step.step_type).await? {
            return Ok(Some(def));
        }
        Ok(definitions.find_by_slug(None, &step.step_type).await?)
    }
}
