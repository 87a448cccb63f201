// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Repository contracts, one trait per aggregate.
//!
//! Getters return `Ok(None)` on a miss. Mutations that violate a constraint
//! (unique name, compare-and-set version) return [`StoreError::Conflict`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orq_core::{
    AuditFilter, AuditLog, BlockDefinition, BlockGroup, BlockGroupId, ConnectionId, CopilotSession,
    Credential, CredentialId, CredentialShare, Edge, EdgeId, OAuth2App, OAuth2AppId,
    OAuth2Connection, OAuth2Provider, Project, ProjectId, ProjectVersion, ProviderId, Run, RunId,
    SessionId, SessionMessage, ShareId, Step, StepId, StepRun, TenantId, UserId, Webhook,
    WebhookId,
};

use crate::error::StoreError;

type Result<T> = std::result::Result<T, StoreError>;

/// Projects: the authoring aggregate root.
#[async_trait]
pub trait ProjectRepo: Send + Sync {
    async fn create(&self, project: &Project) -> Result<()>;
    async fn get(&self, id: ProjectId) -> Result<Option<Project>>;
    async fn update(&self, project: &Project) -> Result<()>;
    /// Persist a save, failing with `Conflict` unless the stored version
    /// still equals `expected_version`. Serializes concurrent saves.
    async fn update_versioned(&self, project: &Project, expected_version: u32) -> Result<()>;
    async fn delete(&self, id: ProjectId) -> Result<()>;
    async fn list_by_tenant(&self, tenant: TenantId) -> Result<Vec<Project>>;
    /// Cross-tenant lookup used to resolve system projects.
    async fn find_system_by_slug(&self, slug: &str) -> Result<Option<Project>>;
}

/// Steps of a project, replaced wholesale on save.
#[async_trait]
pub trait StepRepo: Send + Sync {
    async fn create(&self, step: &Step) -> Result<()>;
    async fn get(&self, id: StepId) -> Result<Option<Step>>;
    async fn update(&self, step: &Step) -> Result<()>;
    async fn delete(&self, id: StepId) -> Result<()>;
    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Step>>;
    async fn delete_by_project(&self, project: ProjectId) -> Result<()>;
}

/// Edges of a project, replaced wholesale on save (deleted before steps).
#[async_trait]
pub trait EdgeRepo: Send + Sync {
    async fn create(&self, edge: &Edge) -> Result<()>;
    async fn get(&self, id: EdgeId) -> Result<Option<Edge>>;
    async fn delete(&self, id: EdgeId) -> Result<()>;
    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Edge>>;
    async fn delete_by_project(&self, project: ProjectId) -> Result<()>;
}

/// Block groups of a project.
#[async_trait]
pub trait BlockGroupRepo: Send + Sync {
    async fn create(&self, group: &BlockGroup) -> Result<()>;
    async fn get(&self, id: BlockGroupId) -> Result<Option<BlockGroup>>;
    async fn update(&self, group: &BlockGroup) -> Result<()>;
    async fn delete(&self, id: BlockGroupId) -> Result<()>;
    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<BlockGroup>>;
}

/// Write-only snapshot store keyed by (project, version).
#[async_trait]
pub trait VersionRepo: Send + Sync {
    /// Append a snapshot. A duplicate (project, version) key is a conflict;
    /// snapshots are never mutated.
    async fn append(&self, version: &ProjectVersion) -> Result<()>;
    async fn get(&self, project: ProjectId, version: u32) -> Result<Option<ProjectVersion>>;
    async fn latest(&self, project: ProjectId) -> Result<Option<ProjectVersion>>;
    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<ProjectVersion>>;
}

/// Block definitions, tenant-scoped with system fallback.
#[async_trait]
pub trait BlockDefinitionRepo: Send + Sync {
    async fn create(&self, definition: &BlockDefinition) -> Result<()>;
    async fn get(&self, id: orq_core::BlockDefinitionId) -> Result<Option<BlockDefinition>>;
    /// Exact (tenant, slug) lookup. Pass `None` for system definitions.
    async fn find_by_slug(&self, tenant: Option<TenantId>, slug: &str)
        -> Result<Option<BlockDefinition>>;
}

/// Runs.
#[async_trait]
pub trait RunRepo: Send + Sync {
    async fn create(&self, run: &Run) -> Result<()>;
    async fn get(&self, id: RunId) -> Result<Option<Run>>;
    async fn update(&self, run: &Run) -> Result<()>;
    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Run>>;
}

/// Step runs within a run.
#[async_trait]
pub trait StepRunRepo: Send + Sync {
    async fn create(&self, step_run: &StepRun) -> Result<()>;
    async fn list_by_run(&self, run: RunId) -> Result<Vec<StepRun>>;
    async fn list_by_step(&self, run: RunId, step: StepId) -> Result<Vec<StepRun>>;
    /// Most recent attempt of one step within a run.
    async fn latest_by_step(&self, run: RunId, step: StepId) -> Result<Option<StepRun>>;
    async fn completed_by_run(&self, run: RunId) -> Result<Vec<StepRun>>;
    /// Highest attempt number across the whole run; 0 when none exist.
    async fn max_attempt(&self, run: RunId) -> Result<u32>;
}

/// Credentials.
#[async_trait]
pub trait CredentialRepo: Send + Sync {
    /// Create, enforcing per-tenant name uniqueness.
    async fn create(&self, credential: &Credential) -> Result<()>;
    async fn get(&self, id: CredentialId) -> Result<Option<Credential>>;
    async fn update(&self, credential: &Credential) -> Result<()>;
    async fn delete(&self, id: CredentialId) -> Result<()>;
    async fn list_by_tenant(&self, tenant: TenantId) -> Result<Vec<Credential>>;
}

/// Credential shares. All listings filter expired rows at this boundary.
#[async_trait]
pub trait ShareRepo: Send + Sync {
    async fn create(&self, share: &CredentialShare) -> Result<()>;
    async fn get(&self, id: ShareId) -> Result<Option<CredentialShare>>;
    async fn update(&self, share: &CredentialShare) -> Result<()>;
    async fn delete(&self, id: ShareId) -> Result<()>;
    async fn list_by_credential(
        &self,
        credential: CredentialId,
        now: DateTime<Utc>,
    ) -> Result<Vec<CredentialShare>>;
    async fn list_by_user(&self, user: UserId, now: DateTime<Utc>)
        -> Result<Vec<CredentialShare>>;
    async fn list_by_project(
        &self,
        project: ProjectId,
        now: DateTime<Utc>,
    ) -> Result<Vec<CredentialShare>>;
    /// Remove expired rows; returns the delete count.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize>;
}

/// Global OAuth2 providers.
#[async_trait]
pub trait OAuth2ProviderRepo: Send + Sync {
    async fn create(&self, provider: &OAuth2Provider) -> Result<()>;
    async fn get(&self, id: ProviderId) -> Result<Option<OAuth2Provider>>;
    async fn find_by_slug(&self, slug: &str) -> Result<Option<OAuth2Provider>>;
}

/// Per-tenant OAuth2 app registrations, unique per (tenant, provider).
#[async_trait]
pub trait OAuth2AppRepo: Send + Sync {
    async fn create(&self, app: &OAuth2App) -> Result<()>;
    async fn get(&self, id: OAuth2AppId) -> Result<Option<OAuth2App>>;
    async fn find(&self, tenant: TenantId, provider: ProviderId) -> Result<Option<OAuth2App>>;
    async fn update(&self, app: &OAuth2App) -> Result<()>;
}

/// OAuth2 connections.
#[async_trait]
pub trait OAuth2ConnectionRepo: Send + Sync {
    async fn create(&self, connection: &OAuth2Connection) -> Result<()>;
    async fn get(&self, id: ConnectionId) -> Result<Option<OAuth2Connection>>;
    async fn get_by_credential(&self, credential: CredentialId)
        -> Result<Option<OAuth2Connection>>;
    /// Atomically claim the pending connection holding `state`, clearing the
    /// state marker so a second callback with the same state misses.
    async fn claim_by_state(&self, state: &str) -> Result<Option<OAuth2Connection>>;
    async fn update(&self, connection: &OAuth2Connection) -> Result<()>;
    async fn delete(&self, id: ConnectionId) -> Result<()>;
}

/// Webhooks. Lookup is by id alone; the signature guards access.
#[async_trait]
pub trait WebhookRepo: Send + Sync {
    async fn create(&self, webhook: &Webhook) -> Result<()>;
    async fn get(&self, id: WebhookId) -> Result<Option<Webhook>>;
    async fn update(&self, webhook: &Webhook) -> Result<()>;
    async fn delete(&self, id: WebhookId) -> Result<()>;
    async fn list_by_project(&self, project: ProjectId) -> Result<Vec<Webhook>>;
}

/// Append-only audit log.
#[async_trait]
pub trait AuditRepo: Send + Sync {
    async fn append(&self, entry: &AuditLog) -> Result<()>;
    async fn list(&self, tenant: TenantId, filter: &AuditFilter) -> Result<Vec<AuditLog>>;
}

/// Copilot/builder sessions and their message logs.
#[async_trait]
pub trait SessionRepo: Send + Sync {
    async fn create_session(&self, session: &CopilotSession) -> Result<()>;
    async fn get_session(&self, id: SessionId) -> Result<Option<CopilotSession>>;
    async fn list_sessions_by_user(&self, user: UserId) -> Result<Vec<CopilotSession>>;
    async fn append_message(&self, message: &SessionMessage) -> Result<()>;
    async fn list_messages(&self, session: SessionId) -> Result<Vec<SessionMessage>>;
}
