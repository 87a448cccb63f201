// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential sharing: grants, access resolution, and cleanup.

use chrono::{DateTime, Utc};
use orq_core::{
    Clock, Credential, CredentialId, CredentialScope, CredentialShare, Error, ProjectId, Resource,
    Result, ShareId, SharePermission, TenantId, UserId,
};
use orq_storage::{CredentialRepo, ShareRepo};
use std::sync::Arc;

/// Mutable fields of an existing share.
#[derive(Debug, Clone, Default)]
pub struct ShareUpdate {
    pub permission: Option<SharePermission>,
    pub expires_at: Option<Option<DateTime<Utc>>>,
    pub note: Option<Option<String>>,
}

/// Share management and the access check used at execution time.
pub struct SharingService<C: Clock> {
    credentials: Arc<dyn CredentialRepo>,
    shares: Arc<dyn ShareRepo>,
    clock: C,
}

impl<C: Clock> SharingService<C> {
    pub fn new(
        credentials: Arc<dyn CredentialRepo>,
        shares: Arc<dyn ShareRepo>,
        clock: C,
    ) -> Self {
        Self { credentials, shares, clock }
    }

    /// Grant a user access to a credential.
    pub async fn share_with_user(
        &self,
        tenant: TenantId,
        caller: UserId,
        credential_id: CredentialId,
        target: UserId,
        permission: SharePermission,
        expires_at: Option<DateTime<Utc>>,
        note: Option<String>,
    ) -> Result<CredentialShare> {
        let credential = self.require_credential(tenant, credential_id).await?;
        self.require_share_authority(&credential, caller).await?;

        let now = self.clock.now();
        let existing = self.shares.list_by_credential(credential_id, now).await?;
        if existing.iter().any(|s| s.shared_with_user_id == Some(target)) {
            return Err(Error::CredentialShareDuplicate);
        }

        let share = CredentialShare {
            id: ShareId::new(),
            tenant_id: tenant,
            credential_id,
            shared_with_user_id: Some(target),
            shared_with_project_id: None,
            permission,
            shared_by_user_id: caller,
            expires_at,
            note,
            created_at: now,
            updated_at: now,
        };
        self.shares.create(&share).await?;
        tracing::info!(
            credential_id = %credential_id,
            target_user = %target,
            permission = %permission,
            "credential shared with user"
        );
        Ok(share)
    }

    /// Grant a project's members access to a credential.
    pub async fn share_with_project(
        &self,
        tenant: TenantId,
        caller: UserId,
        credential_id: CredentialId,
        target: ProjectId,
        permission: SharePermission,
        expires_at: Option<DateTime<Utc>>,
        note: Option<String>,
    ) -> Result<CredentialShare> {
        let credential = self.require_credential(tenant, credential_id).await?;
        self.require_share_authority(&credential, caller).await?;

        let now = self.clock.now();
        let existing = self.shares.list_by_credential(credential_id, now).await?;
        if existing.iter().any(|s| s.shared_with_project_id == Some(target)) {
            return Err(Error::CredentialShareDuplicate);
        }

        let share = CredentialShare {
            id: ShareId::new(),
            tenant_id: tenant,
            credential_id,
            shared_with_user_id: None,
            shared_with_project_id: Some(target),
            permission,
            shared_by_user_id: caller,
            expires_at,
            note,
            created_at: now,
            updated_at: now,
        };
        self.shares.create(&share).await?;
        tracing::info!(
            credential_id = %credential_id,
            target_project = %target,
            permission = %permission,
            "credential shared with project"
        );
        Ok(share)
    }

    /// Update an existing share's permission, expiry, or note.
    pub async fn update_share(
        &self,
        tenant: TenantId,
        caller: UserId,
        share_id: ShareId,
        update: ShareUpdate,
    ) -> Result<CredentialShare> {
        let mut share = self
            .shares
            .get(share_id)
            .await?
            .filter(|s| s.tenant_id == tenant)
            .ok_or_else(|| Error::not_found(Resource::CredentialShare, share_id))?;
        let credential = self.require_credential(tenant, share.credential_id).await?;
        self.require_share_authority(&credential, caller).await?;

        if let Some(permission) = update.permission {
            share.permission = permission;
        }
        if let Some(expires_at) = update.expires_at {
            share.expires_at = expires_at;
        }
        if let Some(note) = update.note {
            share.note = note;
        }
        share.updated_at = self.clock.now();
        self.shares.update(&share).await?;
        Ok(share)
    }

    /// Revoke a share.
    pub async fn revoke_share(
        &self,
        tenant: TenantId,
        caller: UserId,
        share_id: ShareId,
    ) -> Result<()> {
        let share = self
            .shares
            .get(share_id)
            .await?
            .filter(|s| s.tenant_id == tenant)
            .ok_or_else(|| Error::not_found(Resource::CredentialShare, share_id))?;
        let credential = self.require_credential(tenant, share.credential_id).await?;
        self.require_share_authority(&credential, caller).await?;

        self.shares.delete(share_id).await?;
        tracing::info!(share_id = %share_id, credential_id = %share.credential_id, "share revoked");
        Ok(())
    }

    /// Shares on one credential. Requires owner or edit-level access.
    pub async fn list_by_credential(
        &self,
        tenant: TenantId,
        caller: UserId,
        credential_id: CredentialId,
    ) -> Result<Vec<CredentialShare>> {
        let credential = self.require_credential(tenant, credential_id).await?;
        let effective = self.check_access_to(&credential, caller, None).await?;
        if !effective.can_edit() {
            return Err(Error::CredentialAccessDenied);
        }
        Ok(self.shares.list_by_credential(credential_id, self.clock.now()).await?)
    }

    pub async fn list_by_user(&self, user: UserId) -> Result<Vec<CredentialShare>> {
        Ok(self.shares.list_by_user(user, self.clock.now()).await?)
    }

    pub async fn list_by_project(&self, project: ProjectId) -> Result<Vec<CredentialShare>> {
        Ok(self.shares.list_by_project(project, self.clock.now()).await?)
    }

    /// Effective permission for (user, credential, optional project context).
    ///
    /// Resolution order: owner, direct user share, project share,
    /// organization-scope fallback (`use`). Anything else is denied.
    pub async fn check_access(
        &self,
        tenant: TenantId,
        user: UserId,
        credential_id: CredentialId,
        project_context: Option<ProjectId>,
    ) -> Result<SharePermission> {
        let credential = self.require_credential(tenant, credential_id).await?;
        self.check_access_to(&credential, user, project_context).await
    }

    /// Drop expired shares; returns the delete count.
    pub async fn cleanup_expired(&self) -> Result<usize> {
        let removed = self.shares.delete_expired(self.clock.now()).await?;
        if removed > 0 {
            tracing::info!(removed, "expired credential shares removed");
        }
        Ok(removed)
    }

    async fn check_access_to(
        &self,
        credential: &Credential,
        user: UserId,
        project_context: Option<ProjectId>,
    ) -> Result<SharePermission> {
        if credential.is_owned_by(user) {
            return Ok(SharePermission::Admin);
        }
        let now = self.clock.now();

        let user_shares = self.shares.list_by_user(user, now).await?;
        if let Some(share) = user_shares.iter().find(|s| s.credential_id == credential.id) {
            return Ok(share.permission);
        }

        if let Some(project) = project_context {
            let project_shares = self.shares.list_by_project(project, now).await?;
            if let Some(share) =
                project_shares.iter().find(|s| s.credential_id == credential.id)
            {
                return Ok(share.permission);
            }
        }

        if credential.scope == CredentialScope::Organization {
            return Ok(SharePermission::Use);
        }
        Err(Error::CredentialAccessDenied)
    }

    /// Sharing and revocation demand ownership or an unexpired admin share.
    async fn require_share_authority(
        &self,
        credential: &Credential,
        caller: UserId,
    ) -> Result<()> {
        match self.check_access_to(credential, caller, None).await {
            Ok(permission) if permission.can_admin() => Ok(()),
            Ok(_) | Err(Error::CredentialAccessDenied) => Err(Error::CredentialAccessDenied),
            Err(other) => Err(other),
        }
    }

    async fn require_credential(
        &self,
        tenant: TenantId,
        credential_id: CredentialId,
    ) -> Result<Credential> {
        self.credentials
            .get(credential_id)
            .await?
            .filter(|c| c.tenant_id == tenant)
            .ok_or_else(|| Error::not_found(Resource::Credential, credential_id))
    }
}

#[cfg(test)]
#[path = "sharing_tests.rs"]
mod tests;
