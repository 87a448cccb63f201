// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential: a named, scoped secret.

use crate::error::{Error, Result};
use crate::id::{TenantId, UserId};
use crate::project::ProjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a credential.
    pub struct CredentialId;
}

/// An encrypted field as stored: base64 ciphertext plus the nonce used to
/// seal it. Sealing itself lives in the credentials crate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sealed {
    pub ciphertext: String,
    pub nonce: String,
}

/// Kind of secret held by a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialType {
    ApiKey,
    OAuth2,
    BasicAuth,
}

crate::simple_display! {
    CredentialType {
        ApiKey => "api_key",
        OAuth2 => "oauth2",
        BasicAuth => "basic_auth",
    }
}

/// Visibility scope of a credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialScope {
    /// Visible to every user in the tenant.
    Organization,
    /// Bound to one project.
    Project,
    /// Owned by one user.
    Personal,
}

crate::simple_display! {
    CredentialScope {
        Organization => "organization",
        Project => "project",
        Personal => "personal",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialStatus {
    Active,
    Disabled,
}

crate::simple_display! {
    CredentialStatus {
        Active => "active",
        Disabled => "disabled",
    }
}

/// A named secret. The payload is sealed before it reaches this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    pub id: CredentialId,
    pub tenant_id: TenantId,
    /// Unique per tenant.
    pub name: String,
    #[serde(rename = "type")]
    pub credential_type: CredentialType,
    pub scope: CredentialScope,
    /// Required iff scope = personal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_user_id: Option<UserId>,
    /// Set iff scope = project.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_project_id: Option<ProjectId>,
    pub status: CredentialStatus,
    /// Sealed payload fields, keyed by logical field name.
    #[serde(default, skip_serializing_if = "std::collections::BTreeMap::is_empty")]
    pub data: std::collections::BTreeMap<String, Sealed>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Credential {
    /// Validate the scope/owner pairing invariant.
    pub fn validate_scope(&self) -> Result<()> {
        match self.scope {
            CredentialScope::Personal if self.owner_user_id.is_none() => Err(Error::validation(
                "owner_user_id",
                "personal credentials require an owner user",
            )),
            CredentialScope::Project if self.owner_project_id.is_none() => Err(Error::validation(
                "owner_project_id",
                "project credentials require an owner project",
            )),
            _ => Ok(()),
        }
    }

    /// True when the given user owns this credential outright.
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.scope == CredentialScope::Personal && self.owner_user_id == Some(user)
    }
}

crate::builder! {
    pub struct CredentialBuilder => Credential {
        into {
            name: String = "test-credential",
        }
        set {
            id: CredentialId = CredentialId::new(),
            tenant_id: TenantId = TenantId::new(),
            credential_type: CredentialType = CredentialType::ApiKey,
            scope: CredentialScope = CredentialScope::Organization,
            status: CredentialStatus = CredentialStatus::Active,
            data: std::collections::BTreeMap<String, Sealed> = std::collections::BTreeMap::new(),
        }
        option {
            owner_user_id: UserId = None,
            owner_project_id: ProjectId = None,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
            updated_at: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "credential_tests.rs"]
mod tests;
