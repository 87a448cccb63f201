// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only audit record.

use crate::id::{TenantId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Unique identifier for an audit log row.
    pub struct AuditLogId;
}

/// One append-only audit row. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditLog {
    pub id: AuditLogId,
    pub tenant_id: TenantId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_email: Option<String>,
    /// Verb, e.g. "project.save" or "credential.share".
    pub action: String,
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(default)]
    pub metadata: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Filters for listing audit rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditFilter {
    pub actor_id: Option<UserId>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub limit: usize,
    pub offset: usize,
}

impl AuditFilter {
    /// True when the row passes every set filter.
    pub fn matches(&self, row: &AuditLog) -> bool {
        if let Some(actor) = self.actor_id {
            if row.actor_id != Some(actor) {
                return false;
            }
        }
        if let Some(action) = &self.action {
            if &row.action != action {
                return false;
            }
        }
        if let Some(rt) = &self.resource_type {
            if &row.resource_type != rt {
                return false;
            }
        }
        if let Some(rid) = &self.resource_id {
            if row.resource_id.as_deref() != Some(rid.as_str()) {
                return false;
            }
        }
        if let Some(from) = self.from {
            if row.created_at < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if row.created_at > to {
                return false;
            }
        }
        true
    }
}

crate::builder! {
    pub struct AuditLogBuilder => AuditLog {
        into {
            action: String = "project.save",
            resource_type: String = "project",
        }
        set {
            id: AuditLogId = AuditLogId::new(),
            tenant_id: TenantId = TenantId::new(),
            metadata: Value = Value::Null,
        }
        option {
            actor_id: UserId = None,
            actor_email: String = None,
            resource_id: String = None,
            ip_address: String = None,
            user_agent: String = None,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
        }
    }
}
