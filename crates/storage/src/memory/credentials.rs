// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential, share, and OAuth2 aggregates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use orq_core::{
    ConnectionId, Credential, CredentialId, CredentialShare, OAuth2App, OAuth2AppId,
    OAuth2Connection, OAuth2Provider, ProjectId, ProviderId, ShareId, TenantId, UserId,
};

use super::MemoryStore;
use crate::error::StoreError;
use crate::repo::{
    CredentialRepo, OAuth2AppRepo, OAuth2ConnectionRepo, OAuth2ProviderRepo, ShareRepo,
};

type Result<T> = std::result::Result<T, StoreError>;

#[async_trait]
impl CredentialRepo for MemoryStore {
    async fn create(&self, credential: &Credential) -> Result<()> {
        let mut credentials = self.credentials.write();
        if credentials
            .values()
            .any(|c| c.tenant_id == credential.tenant_id && c.name == credential.name)
        {
            return Err(StoreError::Conflict(format!(
                "credential name {:?} already used in tenant",
                credential.name
            )));
        }
        credentials.insert(credential.id, credential.clone());
        Ok(())
    }

    async fn get(&self, id: CredentialId) -> Result<Option<Credential>> {
        Ok(self.credentials.read().get(&id).cloned())
    }

    async fn update(&self, credential: &Credential) -> Result<()> {
        self.credentials.write().insert(credential.id, credential.clone());
        Ok(())
    }

    async fn delete(&self, id: CredentialId) -> Result<()> {
        self.credentials.write().remove(&id);
        Ok(())
    }

    async fn list_by_tenant(&self, tenant: TenantId) -> Result<Vec<Credential>> {
        let mut out: Vec<Credential> =
            self.credentials.read().values().filter(|c| c.tenant_id == tenant).cloned().collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}

#[async_trait]
impl ShareRepo for MemoryStore {
    async fn create(&self, share: &CredentialShare) -> Result<()> {
        self.shares.write().push(share.clone());
        Ok(())
    }

    async fn get(&self, id: ShareId) -> Result<Option<CredentialShare>> {
        Ok(self.shares.read().iter().find(|s| s.id == id).cloned())
    }

    async fn update(&self, share: &CredentialShare) -> Result<()> {
        let mut shares = self.shares.write();
        if let Some(slot) = shares.iter_mut().find(|s| s.id == share.id) {
            *slot = share.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: ShareId) -> Result<()> {
        self.shares.write().retain(|s| s.id != id);
        Ok(())
    }

    async fn list_by_credential(
        &self,
        credential: CredentialId,
        now: DateTime<Utc>,
    ) -> Result<Vec<CredentialShare>> {
        Ok(self
            .shares
            .read()
            .iter()
            .filter(|s| s.credential_id == credential && !s.is_expired(now))
            .cloned()
            .collect())
    }

    async fn list_by_user(
        &self,
        user: UserId,
        now: DateTime<Utc>,
    ) -> Result<Vec<CredentialShare>> {
        Ok(self
            .shares
            .read()
            .iter()
            .filter(|s| s.shared_with_user_id == Some(user) && !s.is_expired(now))
            .cloned()
            .collect())
    }

    async fn list_by_project(
        &self,
        project: ProjectId,
        now: DateTime<Utc>,
    ) -> Result<Vec<CredentialShare>> {
        Ok(self
            .shares
            .read()
            .iter()
            .filter(|s| s.shared_with_project_id == Some(project) && !s.is_expired(now))
            .cloned()
            .collect())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut shares = self.shares.write();
        let before = shares.len();
        shares.retain(|s| !s.is_expired(now));
        Ok(before - shares.len())
    }
}

#[async_trait]
impl OAuth2ProviderRepo for MemoryStore {
    async fn create(&self, provider: &OAuth2Provider) -> Result<()> {
        let mut providers = self.providers.write();
        if providers.values().any(|p| p.slug == provider.slug) {
            return Err(StoreError::Conflict(format!(
                "provider slug {:?} already registered",
                provider.slug
            )));
        }
        providers.insert(provider.id, provider.clone());
        Ok(())
    }

    async fn get(&self, id: ProviderId) -> Result<Option<OAuth2Provider>> {
        Ok(self.providers.read().get(&id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<OAuth2Provider>> {
        Ok(self.providers.read().values().find(|p| p.slug == slug).cloned())
    }
}

#[async_trait]
impl OAuth2AppRepo for MemoryStore {
    async fn create(&self, app: &OAuth2App) -> Result<()> {
        let mut apps = self.apps.write();
        if apps
            .values()
            .any(|a| a.tenant_id == app.tenant_id && a.provider_id == app.provider_id)
        {
            return Err(StoreError::Conflict(
                "oauth2 app already exists for that provider".into(),
            ));
        }
        apps.insert(app.id, app.clone());
        Ok(())
    }

    async fn get(&self, id: OAuth2AppId) -> Result<Option<OAuth2App>> {
        Ok(self.apps.read().get(&id).cloned())
    }

    async fn find(&self, tenant: TenantId, provider: ProviderId) -> Result<Option<OAuth2App>> {
        Ok(self
            .apps
            .read()
            .values()
            .find(|a| a.tenant_id == tenant && a.provider_id == provider)
            .cloned())
    }

    async fn update(&self, app: &OAuth2App) -> Result<()> {
        self.apps.write().insert(app.id, app.clone());
        Ok(())
    }
}

#[async_trait]
impl OAuth2ConnectionRepo for MemoryStore {
    async fn create(&self, connection: &OAuth2Connection) -> Result<()> {
        let mut connections = self.connections.write();
        if connections.contains_key(&connection.id) {
            return Err(StoreError::Conflict(format!(
                "connection {} already exists",
                connection.id
            )));
        }
        connections.insert(connection.id, connection.clone());
        Ok(())
    }

    async fn get(&self, id: ConnectionId) -> Result<Option<OAuth2Connection>> {
        Ok(self.connections.read().get(&id).cloned())
    }

    async fn get_by_credential(
        &self,
        credential: CredentialId,
    ) -> Result<Option<OAuth2Connection>> {
        Ok(self
            .connections
            .read()
            .values()
            .find(|c| c.credential_id == credential)
            .cloned())
    }

    async fn claim_by_state(&self, state: &str) -> Result<Option<OAuth2Connection>> {
        // One write lock covers find + clear, so a second callback carrying
        // the same state observes the cleared marker and misses.
        let mut connections = self.connections.write();
        let id = connections
            .values()
            .find(|c| c.state.as_deref() == Some(state))
            .map(|c| c.id);
        match id {
            Some(id) => {
                if let Some(conn) = connections.get_mut(&id) {
                    conn.state = None;
                    return Ok(Some(conn.clone()));
                }
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn update(&self, connection: &OAuth2Connection) -> Result<()> {
        self.connections.write().insert(connection.id, connection.clone());
        Ok(())
    }

    async fn delete(&self, id: ConnectionId) -> Result<()> {
        self.connections.write().remove(&id);
        Ok(())
    }
}
