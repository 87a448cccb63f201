// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth2 three-tier records: provider, per-tenant app, per-credential
//! connection, with the connection lifecycle state machine.

use crate::credential::{CredentialId, Sealed};
use crate::id::TenantId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

crate::define_id! {
    /// Unique identifier for an OAuth2 provider.
    pub struct ProviderId;
}

crate::define_id! {
    /// Unique identifier for a tenant's OAuth2 app registration.
    pub struct OAuth2AppId;
}

crate::define_id! {
    /// Unique identifier for an OAuth2 connection.
    pub struct ConnectionId;
}

/// Global provider record: endpoint URLs and protocol quirks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuth2Provider {
    pub id: ProviderId,
    pub slug: String,
    pub name: String,
    pub authorization_url: String,
    pub token_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub userinfo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoke_url: Option<String>,
    #[serde(default)]
    pub requires_pkce: bool,
    #[serde(default)]
    pub default_scopes: Vec<String>,
    #[serde(default)]
    pub is_preset: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OAuth2AppStatus {
    Active,
    Disabled,
}

crate::simple_display! {
    OAuth2AppStatus {
        Active => "active",
        Disabled => "disabled",
    }
}

/// Per-tenant registration with a provider: sealed client credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuth2App {
    pub id: OAuth2AppId,
    pub tenant_id: TenantId,
    pub provider_id: ProviderId,
    pub name: String,
    pub client_id: Sealed,
    pub client_secret: Sealed,
    #[serde(default)]
    pub custom_scopes: Vec<String>,
    pub status: OAuth2AppStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    Pending,
    Connected,
    Expired,
    Error,
    Revoked,
}

crate::simple_display! {
    ConnectionStatus {
        Pending => "pending",
        Connected => "connected",
        Expired => "expired",
        Error => "error",
        Revoked => "revoked",
    }
}

/// Per-credential OAuth2 token state.
///
/// `state` and `code_verifier` exist only while the authorization handshake
/// is in flight; the callback clears them, making the state single-use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuth2Connection {
    pub id: ConnectionId,
    pub tenant_id: TenantId,
    pub credential_id: CredentialId,
    pub app_id: OAuth2AppId,
    pub status: ConnectionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<Sealed>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<Sealed>,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_expires_at: Option<DateTime<Utc>>,
    /// Transient CSRF token for the authorization redirect.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Transient PKCE verifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_userinfo: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_refresh_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OAuth2Connection {
    /// A pending connection holding the handshake secrets.
    pub fn pending(
        tenant_id: TenantId,
        credential_id: CredentialId,
        app_id: OAuth2AppId,
        state: String,
        code_verifier: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ConnectionId::new(),
            tenant_id,
            credential_id,
            app_id,
            status: ConnectionStatus::Pending,
            access_token: None,
            refresh_token: None,
            token_type: String::new(),
            access_token_expires_at: None,
            state: Some(state),
            code_verifier,
            account_id: None,
            account_email: None,
            account_name: None,
            raw_userinfo: None,
            last_refresh_at: None,
            last_used_at: None,
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Install the first token set and transition to connected.
    ///
    /// Clears the handshake secrets so the state becomes single-use.
    pub fn mark_connected(
        &mut self,
        access_token: Sealed,
        refresh_token: Option<Sealed>,
        token_type: String,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) {
        self.access_token = Some(access_token);
        self.refresh_token = refresh_token;
        self.token_type = token_type;
        self.access_token_expires_at = expires_at;
        self.state = None;
        self.code_verifier = None;
        self.error_message = None;
        self.status = ConnectionStatus::Connected;
        self.updated_at = now;
    }

    /// Replace tokens after a refresh. A missing new refresh token keeps the
    /// previous one (providers commonly omit it on refresh).
    pub fn update_tokens(
        &mut self,
        access_token: Sealed,
        refresh_token: Option<Sealed>,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) {
        self.access_token = Some(access_token);
        if refresh_token.is_some() {
            self.refresh_token = refresh_token;
        }
        self.access_token_expires_at = expires_at;
        self.last_refresh_at = Some(now);
        self.error_message = None;
        self.status = ConnectionStatus::Connected;
        self.updated_at = now;
    }

    /// Attach userinfo fields fetched after the token exchange.
    pub fn set_account(
        &mut self,
        account_id: Option<String>,
        email: Option<String>,
        name: Option<String>,
        raw: Option<Value>,
        now: DateTime<Utc>,
    ) {
        self.account_id = account_id;
        self.account_email = email;
        self.account_name = name;
        self.raw_userinfo = raw;
        self.updated_at = now;
    }

    pub fn mark_expired(&mut self, now: DateTime<Utc>) {
        self.status = ConnectionStatus::Expired;
        self.updated_at = now;
    }

    pub fn mark_error(&mut self, message: impl Into<String>, now: DateTime<Utc>) {
        self.status = ConnectionStatus::Error;
        self.error_message = Some(message.into());
        self.updated_at = now;
    }

    pub fn mark_revoked(&mut self, now: DateTime<Utc>) {
        self.status = ConnectionStatus::Revoked;
        self.access_token = None;
        self.refresh_token = None;
        self.access_token_expires_at = None;
        self.updated_at = now;
    }

    /// Stamp a successful token read.
    pub fn record_usage(&mut self, now: DateTime<Utc>) {
        self.last_used_at = Some(now);
        self.updated_at = now;
    }

    /// True when the access token's expiry has passed.
    pub fn is_access_token_expired(&self, now: DateTime<Utc>) -> bool {
        self.access_token_expires_at.is_some_and(|at| at <= now)
    }
}

crate::builder! {
    pub struct OAuth2ConnectionBuilder => OAuth2Connection {
        into {
            token_type: String = "Bearer",
        }
        set {
            id: ConnectionId = ConnectionId::new(),
            tenant_id: TenantId = TenantId::new(),
            credential_id: CredentialId = CredentialId::new(),
            app_id: OAuth2AppId = OAuth2AppId::new(),
            status: ConnectionStatus = ConnectionStatus::Pending,
        }
        option {
            access_token: Sealed = None,
            refresh_token: Sealed = None,
            access_token_expires_at: DateTime<Utc> = None,
            state: String = None,
            code_verifier: String = None,
            account_id: String = None,
            account_email: String = None,
            account_name: String = None,
            raw_userinfo: Value = None,
            last_refresh_at: DateTime<Utc> = None,
            last_used_at: DateTime<Utc> = None,
            error_message: String = None,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
            updated_at: DateTime<Utc> = Utc::now(),
        }
    }
}

#[cfg(test)]
#[path = "oauth2_tests.rs"]
mod tests;
