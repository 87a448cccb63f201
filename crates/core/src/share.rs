// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Credential shares and the nested permission levels.

use crate::credential::CredentialId;
use crate::error::{Error, Result};
use crate::id::{TenantId, UserId};
use crate::project::ProjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a credential share.
    pub struct ShareId;
}

/// Permission level granted by a share. Strictly nested:
/// admin implies edit, edit implies use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SharePermission {
    /// Invoke only.
    Use,
    /// Modify credential data but not its sharing.
    Edit,
    /// Everything, including re-sharing and revocation.
    Admin,
}

crate::simple_display! {
    SharePermission {
        Use => "use",
        Edit => "edit",
        Admin => "admin",
    }
}

impl SharePermission {
    /// True when this level grants at least `required`.
    pub fn allows(&self, required: SharePermission) -> bool {
        *self >= required
    }

    pub fn can_view(&self) -> bool {
        self.allows(SharePermission::Use)
    }

    pub fn can_edit(&self) -> bool {
        self.allows(SharePermission::Edit)
    }

    pub fn can_admin(&self) -> bool {
        self.allows(SharePermission::Admin)
    }
}

/// A grant of access to a credential for a user or a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CredentialShare {
    pub id: ShareId,
    pub tenant_id: TenantId,
    pub credential_id: CredentialId,
    /// Exactly one of the two targets is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_with_user_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shared_with_project_id: Option<ProjectId>,
    pub permission: SharePermission,
    pub shared_by_user_id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CredentialShare {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    /// Validate the user-XOR-project target invariant.
    pub fn validate_target(&self) -> Result<()> {
        match (self.shared_with_user_id, self.shared_with_project_id) {
            (Some(_), None) | (None, Some(_)) => Ok(()),
            _ => Err(Error::validation(
                "shared_with",
                "share targets exactly one of a user or a project",
            )),
        }
    }
}

crate::builder! {
    pub struct CredentialShareBuilder => CredentialShare {
        set {
            id: ShareId = ShareId::new(),
            tenant_id: TenantId = TenantId::new(),
            credential_id: CredentialId = CredentialId::new(),
            permission: SharePermission = SharePermission::Use,
            shared_by_user_id: UserId = UserId::new(),
        }
        option {
            shared_with_user_id: UserId = None,
            shared_with_project_id: ProjectId = None,
            expires_at: DateTime<Utc> = None,
            note: String = None,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
            updated_at: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "share_tests.rs"]
mod tests;
