// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Block definition: a reusable computation unit identified by a slug.

use crate::id::TenantId;
use crate::step::BlockDefinitionId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declares a block's ports and configuration contract.
///
/// Tenant-scoped definitions shadow system definitions (`tenant_id: None`)
/// with the same slug.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDefinition {
    pub id: BlockDefinitionId,
    /// None for system-scoped definitions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<TenantId>,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub input_ports: Vec<String>,
    #[serde(default)]
    pub output_ports: Vec<String>,
    /// JSON schema for the block's config blob.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_schema: Option<Value>,
    /// Config keys that must be present for the block to run.
    #[serde(default)]
    pub required_config_fields: Vec<String>,
    /// Credential slot names that must be bound before publish.
    #[serde(default)]
    pub required_credentials: Vec<String>,
    /// Declared input schema for start-family blocks; best-effort source for
    /// the project-level input schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BlockDefinition {
    pub fn has_output_port(&self, port: &str) -> bool {
        self.output_ports.iter().any(|p| p == port)
    }

    pub fn has_input_port(&self, port: &str) -> bool {
        self.input_ports.iter().any(|p| p == port)
    }
}

crate::builder! {
    pub struct BlockDefinitionBuilder => BlockDefinition {
        into {
            slug: String = "function",
            name: String = "Function",
        }
        set {
            id: BlockDefinitionId = BlockDefinitionId::new(),
            input_ports: Vec<String> = vec!["input".to_string()],
            output_ports: Vec<String> = vec!["output".to_string()],
            required_config_fields: Vec<String> = Vec::new(),
            required_credentials: Vec<String> = Vec::new(),
        }
        option {
            tenant_id: TenantId = None,
            config_schema: Value = None,
            input_schema: Value = None,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
            updated_at: DateTime<Utc> = Utc::now(),
        }
    }
}
