// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Edge: a directed connection between steps and block groups.

use crate::block_group::BlockGroupId;
use crate::error::{Error, Result};
use crate::id::TenantId;
use crate::project::ProjectId;
use crate::step::StepId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for an edge.
    pub struct EdgeId;
}

/// Virtual port accepted on any edge that targets a block group.
pub const GROUP_INPUT_PORT: &str = "group-input";

/// One side of an edge: a step or a block group, never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Step(StepId),
    Group(BlockGroupId),
}

/// A directed connection in the project DAG.
///
/// Each side references a step XOR a block group. An empty port string means
/// the block's default port.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_step_id: Option<StepId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_block_group_id: Option<BlockGroupId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_step_id: Option<StepId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_block_group_id: Option<BlockGroupId>,
    #[serde(default)]
    pub source_port: String,
    #[serde(default)]
    pub target_port: String,
    /// Optional condition expression evaluated by the worker.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Edge {
    /// The source endpoint, validating the step-XOR-group invariant.
    pub fn source(&self) -> Result<Endpoint> {
        endpoint("source", self.source_step_id, self.source_block_group_id)
    }

    /// The target endpoint, validating the step-XOR-group invariant.
    pub fn target(&self) -> Result<Endpoint> {
        endpoint("target", self.target_step_id, self.target_block_group_id)
    }

    /// True when both endpoints reference the same node.
    pub fn is_self_loop(&self) -> bool {
        match (self.source(), self.target()) {
            (Ok(s), Ok(t)) => s == t,
            _ => false,
        }
    }
}

fn endpoint(
    side: &str,
    step: Option<StepId>,
    group: Option<BlockGroupId>,
) -> Result<Endpoint> {
    match (step, group) {
        (Some(step), None) => Ok(Endpoint::Step(step)),
        (None, Some(group)) => Ok(Endpoint::Group(group)),
        (Some(_), Some(_)) => Err(Error::validation(
            side,
            "edge endpoint references both a step and a block group",
        )),
        (None, None) => Err(Error::validation(
            side,
            "edge endpoint references neither a step nor a block group",
        )),
    }
}

crate::builder! {
    pub struct EdgeBuilder => Edge {
        into {
            source_port: String = "",
            target_port: String = "",
        }
        set {
            id: EdgeId = EdgeId::new(),
            tenant_id: TenantId = TenantId::new(),
            project_id: ProjectId = ProjectId::new(),
        }
        option {
            source_step_id: StepId = None,
            source_block_group_id: BlockGroupId = None,
            target_step_id: StepId = None,
            target_block_group_id: BlockGroupId = None,
            condition: String = None,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
            updated_at: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "edge_tests.rs"]
mod tests;
