// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Copilot sessions and the two structured authoring operations.

use orq_core::{
    is_built_in_type, Clock, CopilotSession, Error, MessageRole, Position, ProjectId, Resource,
    Result, SessionId, SessionKind, SessionMessage, TenantId, UserId,
};
use orq_storage::SessionRepo;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::client::{strip_code_fences, ChatClient, ChatMessage};

/// Output of analyze-and-propose: what the copilot believes the user wants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectProposal {
    #[serde(default)]
    pub assumed_trigger: String,
    #[serde(default)]
    pub frequency: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub integrations: Vec<String>,
}

/// One step spec in a generated flow. `temp_id` is the LLM's own handle,
/// used only to wire generated edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedStep {
    pub temp_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub step_type: String,
    #[serde(default)]
    pub config: Value,
    #[serde(default)]
    pub position: Position,
}

/// One edge spec in a generated flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedEdge {
    pub source_temp_id: String,
    pub target_temp_id: String,
    #[serde(default)]
    pub source_port: String,
}

/// A generated flow, filtered against the known block-type set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedProject {
    #[serde(default)]
    pub steps: Vec<GeneratedStep>,
    #[serde(default)]
    pub edges: Vec<GeneratedEdge>,
}

const CHAT_SYSTEM_PROMPT: &str = "You are a workflow-authoring copilot. Help the user design \
automation flows made of typed blocks connected into a DAG. Be concise.";

const ANALYZE_SYSTEM_PROMPT: &str = "Analyze the user's automation request. Respond with JSON \
only: {\"assumed_trigger\": string, \"frequency\": string, \"steps\": [string], \
\"integrations\": [string]}.";

const GENERATE_SYSTEM_PROMPT: &str = "Design a workflow for the user's request. Respond with \
JSON only: {\"steps\": [{\"temp_id\", \"name\", \"type\", \"config\", \"position\": {\"x\", \
\"y\"}}], \"edges\": [{\"source_temp_id\", \"target_temp_id\", \"source_port\"}]}. Valid step \
types: start, manual_trigger, schedule_trigger, webhook_trigger, function, http, llm, \
condition, switch, approval.";

/// Session management plus the structured authoring calls.
pub struct CopilotService<C: Clock> {
    sessions: Arc<dyn SessionRepo>,
    client: Arc<dyn ChatClient>,
    clock: C,
}

impl<C: Clock> CopilotService<C> {
    pub fn new(sessions: Arc<dyn SessionRepo>, client: Arc<dyn ChatClient>, clock: C) -> Self {
        Self { sessions, client, clock }
    }

    /// Open a session for a user, optionally pinned to a project.
    pub async fn create_session(
        &self,
        tenant: TenantId,
        user: UserId,
        kind: SessionKind,
        project_id: Option<ProjectId>,
    ) -> Result<CopilotSession> {
        let now = self.clock.now();
        let session = CopilotSession {
            id: SessionId::new(),
            tenant_id: tenant,
            user_id: user,
            kind,
            project_id,
            title: None,
            created_at: now,
            updated_at: now,
        };
        self.sessions.create_session(&session).await?;
        Ok(session)
    }

    /// Plain chat: append the user message, call the model with the full
    /// history, record and return the assistant reply.
    pub async fn send_message(
        &self,
        session_id: SessionId,
        content: impl Into<String>,
    ) -> Result<SessionMessage> {
        let session = self.require_session(session_id).await?;
        let now = self.clock.now();

        let user_message = SessionMessage::new(session.id, MessageRole::User, content, now);
        self.sessions.append_message(&user_message).await?;

        let mut messages = vec![ChatMessage::system(CHAT_SYSTEM_PROMPT)];
        for stored in self.sessions.list_messages(session.id).await? {
            messages.push(ChatMessage { role: stored.role.to_string(), content: stored.content });
        }
        let reply = self.client.chat(&messages).await?;

        let assistant_message =
            SessionMessage::new(session.id, MessageRole::Assistant, reply, self.clock.now());
        self.sessions.append_message(&assistant_message).await?;
        Ok(assistant_message)
    }

    pub async fn list_messages(&self, session_id: SessionId) -> Result<Vec<SessionMessage>> {
        self.require_session(session_id).await?;
        Ok(self.sessions.list_messages(session_id).await?)
    }

    /// Analyze a request and propose trigger, frequency, steps, and
    /// integrations. Advisory only.
    pub async fn analyze_request(&self, request: &str) -> Result<ProjectProposal> {
        let messages =
            [ChatMessage::system(ANALYZE_SYSTEM_PROMPT), ChatMessage::user(request)];
        let raw = self.client.chat(&messages).await?;
        parse_llm_json(&raw)
    }

    /// Generate step and edge specs for a request, filtered against the
    /// known block-type set. Edges referencing dropped steps are dropped too.
    pub async fn generate_project(&self, request: &str) -> Result<GeneratedProject> {
        let messages =
            [ChatMessage::system(GENERATE_SYSTEM_PROMPT), ChatMessage::user(request)];
        let raw = self.client.chat(&messages).await?;
        let mut generated: GeneratedProject = parse_llm_json(&raw)?;

        let before = generated.steps.len();
        generated.steps.retain(|s| is_built_in_type(&s.step_type));
        if generated.steps.len() < before {
            tracing::warn!(
                dropped = before - generated.steps.len(),
                "generated steps with unknown types dropped"
            );
        }
        let keep: std::collections::HashSet<&str> =
            generated.steps.iter().map(|s| s.temp_id.as_str()).collect();
        generated.edges.retain(|e| {
            keep.contains(e.source_temp_id.as_str()) && keep.contains(e.target_temp_id.as_str())
        });
        Ok(generated)
    }

    async fn require_session(&self, session_id: SessionId) -> Result<CopilotSession> {
        self.sessions
            .get_session(session_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Session, session_id))
    }
}

/// Parse a JSON answer, tolerating markdown fences.
fn parse_llm_json<T: serde::de::DeserializeOwned>(raw: &str) -> Result<T> {
    let cleaned = strip_code_fences(raw);
    serde_json::from_str(cleaned)
        .map_err(|e| Error::LlmCallFailed(format!("model returned invalid JSON: {e}")))
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
