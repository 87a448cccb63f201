// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhooks, audit rows, and copilot sessions.

use async_trait::async_trait;
use orq_core::{
    AuditFilter, AuditLog, CopilotSession, ProjectId, SessionId, SessionMessage, TenantId, UserId,
    Webhook, WebhookId,
};

use super::MemoryStore;
use crate::error::StoreError;
use crate::repo::{AuditRepo, SessionRepo, WebhookRepo};

type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
impl WebhookRepo for MemoryStore {
    async fn create(&self, webhook: &Webhook) -> Result<()> {
        let mut webhooks = self.webhooks.write();
        if webhooks.contains_key(&webhook.id) {
            return Err(StoreError::Conflict(format!("webhook {} already exists", webhook.id)));
        }
        webhooks.insert(webhook.id, webhook.clone());
        Ok(())
    }

    async fn get(&self, id: WebhookId) -> Result<Option<Webhook>> {
        Ok(self.webhooks.read().get(&id).cloned())
    }

    async fn update(&self, webhook: &Webhook) -> Result<()> {
        self.webhooks.write().insert(webhook.id, webhook.clone());
        Ok(())
    }

    async fn delete(&self, id: WebhookId) -> Result<()> {
        self.webhooks.write().remove(&id);
        Ok(())
    }

    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Webhook>> {
        let mut out: Vec<Webhook> =
            self.webhooks.read().values().filter(|w| w.project_id == project).cloned().collect();
        out.sort_by_key(|w| w.created_at);
        Ok(out)
    }
}

#[async_trait]
impl AuditRepo for MemoryStore {
    async fn append(&self, entry: &AuditLog) -> Result<()> {
        self.audit.write().push(entry.clone());
        Ok(())
    }

    async fn list(&self, tenant: TenantId, filter: &AuditFilter) -> Result<Vec<AuditLog>> {
        let rows = self.audit.read();
        let limit = if filter.limit == 0 { usize::MAX } else { filter.limit };
        Ok(rows
            .iter()
            .filter(|row| row.tenant_id == tenant && filter.matches(row))
            .skip(filter.offset)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SessionRepo for MemoryStore {
    async fn create_session(&self, session: &CopilotSession) -> Result<()> {
        self.sessions.write().insert(session.id, session.clone());
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<CopilotSession>> {
        Ok(self.sessions.read().get(&id).cloned())
    }

    async fn list_sessions_by_user(&self, user: UserId) -> Result<Vec<CopilotSession>> {
        let mut out: Vec<CopilotSession> =
            self.sessions.read().values().filter(|s| s.user_id == user).cloned().collect();
        out.sort_by_key(|s| s.created_at);
        Ok(out)
    }

    async fn append_message(&self, message: &SessionMessage) -> Result<()> {
        self.messages.write().push(message.clone());
        Ok(())
    }

    async fn list_messages(&self, session: SessionId) -> Result<Vec<SessionMessage>> {
        Ok(self
            .messages
            .read()
            .iter()
            .filter(|m| m.session_id == session)
            .cloned()
            .collect())
    }
}
