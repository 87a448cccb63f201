// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Block group: a composite container of steps.

use crate::error::{Error, Result};
use crate::id::TenantId;
use crate::project::ProjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Unique identifier for a block group.
    pub struct BlockGroupId;
}

/// Semantic type of a block group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockGroupType {
    /// Children run concurrently; config carries the concurrency limit.
    Parallel,
    /// Children run with error-branch routing.
    TryCatch,
    /// Children run once per element of an input collection.
    Foreach,
    /// Children repeat while a loop condition holds; config carries guards.
    While,
}

crate::simple_display! {
    BlockGroupType {
        Parallel => "parallel",
        TryCatch => "try_catch",
        Foreach => "foreach",
        While => "while",
    }
}

/// Composite container wrapping child steps. Steps attach themselves via
/// `block_group_id` + `group_role`; groups nest via `parent_group_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockGroup {
    pub id: BlockGroupId,
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(rename = "type")]
    pub group_type: BlockGroupType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_group_id: Option<BlockGroupId>,
    /// Type-specific settings: concurrency limits, iteration guards, loop conditions.
    #[serde(default)]
    pub config: Value,
    /// Inline JS transform: external input -> internal input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_process: Option<String>,
    /// Inline JS transform: internal output -> external output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_process: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlockGroup {
    /// Re-parent the group. A group can never be its own parent.
    pub fn set_parent(&mut self, parent: Option<BlockGroupId>, now: DateTime<Utc>) -> Result<()> {
        if parent == Some(self.id) {
            return Err(Error::validation(
                "parent_group_id",
                "block group cannot be its own parent",
            ));
        }
        self.parent_group_id = parent;
        self.updated_at = now;
        Ok(())
    }
}

crate::builder! {
    pub struct BlockGroupBuilder => BlockGroup {
        into {
            name: String = "test-group",
        }
        set {
            id: BlockGroupId = BlockGroupId::new(),
            tenant_id: TenantId = TenantId::new(),
            project_id: ProjectId = ProjectId::new(),
            group_type: BlockGroupType = BlockGroupType::TryCatch,
            config: Value = Value::Null,
        }
        option {
            parent_group_id: BlockGroupId = None,
            pre_process: String = None,
            post_process: String = None,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
            updated_at: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "block_group_tests.rs"]
mod tests;
