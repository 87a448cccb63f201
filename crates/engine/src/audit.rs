// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only audit logging.

use orq_core::{AuditFilter, AuditLog, AuditLogId, Clock, Result, TenantId, UserId};
use orq_storage::AuditRepo;
use serde_json::Value;
use std::sync::Arc;

/// One event to record.
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub tenant_id: TenantId,
    pub actor_id: Option<UserId>,
    pub actor_email: Option<String>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub metadata: Value,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl AuditEntry {
    pub fn new(
        tenant_id: TenantId,
        action: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id,
            actor_id: None,
            actor_email: None,
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: None,
            metadata: Value::Null,
            ip_address: None,
            user_agent: None,
        }
    }

    orq_core::setters! {
        set {
            metadata: Value,
        }
        option {
            actor_id: UserId,
            actor_email: String,
            resource_id: String,
            ip_address: String,
            user_agent: String,
        }
    }
}

/// Writes audit rows; rows are never updated or deleted.
#[derive(Clone)]
pub struct AuditLogger<C: Clock> {
    audit: Arc<dyn AuditRepo>,
    clock: C,
}

impl<C: Clock> AuditLogger<C> {
    pub fn new(audit: Arc<dyn AuditRepo>, clock: C) -> Self {
        Self { audit, clock }
    }

    /// Append one row.
    pub async fn log(&self, entry: AuditEntry) -> Result<()> {
        let row = AuditLog {
            id: AuditLogId::new(),
            tenant_id: entry.tenant_id,
            actor_id: entry.actor_id,
            actor_email: entry.actor_email,
            action: entry.action,
            resource_type: entry.resource_type,
            resource_id: entry.resource_id,
            metadata: entry.metadata,
            ip_address: entry.ip_address,
            user_agent: entry.user_agent,
            created_at: self.clock.now(),
        };
        self.audit.append(&row).await?;
        tracing::debug!(
            tenant_id = %row.tenant_id,
            action = %row.action,
            resource_type = %row.resource_type,
            "audit row appended"
        );
        Ok(())
    }

    /// List rows matching the filter, tenant-scoped.
    pub async fn list(&self, tenant: TenantId, filter: &AuditFilter) -> Result<Vec<AuditLog>> {
        Ok(self.audit.list(tenant, filter).await?)
    }
}

#[cfg(test)]
#[path = "audit_tests.rs"]
mod tests;
