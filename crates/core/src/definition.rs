// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Immutable project definition snapshots.

use crate::block_group::BlockGroup;
use crate::edge::Edge;
use crate::project::{Project, ProjectId};
use crate::step::{Step, StepId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Unique identifier for a project version row.
    pub struct VersionId;
}

/// The full serialized shape of a project at one version.
///
/// This is the authoritative input for every run of that version; the live
/// project rows may drift after later edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub variables: Value,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub block_groups: Vec<BlockGroup>,
}

impl ProjectDefinition {
    /// Assemble a definition from the project row and its reloaded children.
    pub fn from_parts(
        project: &Project,
        steps: Vec<Step>,
        edges: Vec<Edge>,
        block_groups: Vec<BlockGroup>,
    ) -> Self {
        Self {
            name: project.name.clone(),
            description: project.description.clone(),
            variables: project.variables.clone(),
            steps,
            edges,
            block_groups,
        }
    }

    pub fn find_step(&self, id: StepId) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }
}

/// An immutable snapshot row. Unique on (project_id, version); never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectVersion {
    pub id: VersionId,
    pub project_id: ProjectId,
    pub version: u32,
    pub definition: ProjectDefinition,
    pub saved_at: DateTime<Utc>,
}

impl ProjectVersion {
    pub fn new(
        project_id: ProjectId,
        version: u32,
        definition: ProjectDefinition,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self { id: VersionId::new(), project_id, version, definition, saved_at }
    }
}
