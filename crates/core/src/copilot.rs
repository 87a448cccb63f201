// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Copilot and builder sessions with their message logs.

use crate::id::{TenantId, UserId};
use crate::project::ProjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a copilot or builder session.
    pub struct SessionId;
}

crate::define_id! {
    /// Unique identifier for a session message.
    pub struct MessageId;
}

/// Which authoring surface owns the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Builder,
    Copilot,
}

crate::simple_display! {
    SessionKind {
        Builder => "builder",
        Copilot => "copilot",
    }
}

/// Role of a session message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    Tool,
}

crate::simple_display! {
    MessageRole {
        User => "user",
        Assistant => "assistant",
        Tool => "tool",
    }
}

/// A tenant-scoped conversation with the LLM authoring helper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CopilotSession {
    pub id: SessionId,
    pub tenant_id: TenantId,
    pub user_id: UserId,
    pub kind: SessionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<ProjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One message in a session log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionMessage {
    pub id: MessageId,
    pub session_id: SessionId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl SessionMessage {
    pub fn new(
        session_id: SessionId,
        role: MessageRole,
        content: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self { id: MessageId::new(), session_id, role, content: content.into(), created_at: now }
    }
}
