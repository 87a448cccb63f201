// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Token lifecycle: refresh, the execution-time read path, and revocation.

use chrono::Duration;
use orq_core::{
    Clock, ConnectionId, ConnectionStatus, CredentialId, Error, OAuth2Connection, Resource,
    Result,
};
use std::sync::Arc;

use super::http::RefreshRequest;
use super::OAuth2Service;

impl<C: Clock> OAuth2Service<C> {
    /// Refresh a connection's tokens. Serialized per connection: a
    /// concurrent refresher waits, then observes the refreshed token on
    /// re-read.
    pub async fn refresh(&self, connection_id: ConnectionId) -> Result<OAuth2Connection> {
        let lock = self.refresh_lock(connection_id);
        let _guard = lock.lock().await;
        self.refresh_locked(connection_id).await
    }

    async fn refresh_locked(&self, connection_id: ConnectionId) -> Result<OAuth2Connection> {
        let mut connection = self.require_connection(connection_id).await?;
        if connection.status != ConnectionStatus::Connected {
            return Err(Error::OAuth2RefreshFailed(format!(
                "connection is {}, not connected",
                connection.status
            )));
        }
        let Some(sealed_refresh) = connection.refresh_token.clone() else {
            return Err(Error::OAuth2RefreshFailed("no refresh token stored".into()));
        };

        let app = self
            .apps
            .get(connection.app_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::OAuth2App, connection.app_id))?;
        let provider = self
            .providers
            .get(app.provider_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::OAuth2Provider, app.provider_id))?;

        let request = RefreshRequest {
            token_url: provider.token_url.clone(),
            refresh_token: self.cipher.open(&sealed_refresh)?,
            client_id: self.cipher.open(&app.client_id)?,
            client_secret: self.cipher.open(&app.client_secret)?,
        };

        let now = self.clock.now();
        let response = match self.client.refresh(request).await {
            Ok(response) => response,
            Err(err) => {
                connection.mark_error(err.to_string(), now);
                self.connections.update(&connection).await?;
                return Err(Error::OAuth2RefreshFailed(err.to_string()));
            }
        };

        let access_token = self.cipher.seal(&response.access_token)?;
        let refresh_token =
            response.refresh_token.as_deref().map(|t| self.cipher.seal(t)).transpose()?;
        let expires_at = response
            .expires_in
            .map(|secs| now + Duration::seconds(secs.min(i64::MAX as u64) as i64));

        // A response without a refresh token keeps the previous one.
        connection.update_tokens(access_token, refresh_token, expires_at, now);
        self.connections.update(&connection).await?;
        tracing::info!(connection_id = %connection_id, "oauth2 tokens refreshed");
        Ok(connection)
    }

    /// The read path used by executing steps: a plaintext access token,
    /// refreshing at most once when expired.
    pub async fn get_valid_access_token(&self, credential_id: CredentialId) -> Result<String> {
        let mut connection = self
            .connections
            .get_by_credential(credential_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::OAuth2Connection, credential_id))?;

        if connection.status != ConnectionStatus::Connected {
            return Err(Error::OAuth2TokenExpired);
        }

        let now = self.clock.now();
        if connection.is_access_token_expired(now) {
            if connection.refresh_token.is_some() {
                self.refresh(connection.id).await?;
                connection = self.require_connection(connection.id).await?;
            } else {
                connection.mark_expired(now);
                self.connections.update(&connection).await?;
                return Err(Error::OAuth2TokenExpired);
            }
        }

        let sealed = connection
            .access_token
            .clone()
            .ok_or_else(|| Error::OAuth2RefreshFailed("connection holds no access token".into()))?;
        let plaintext = self.cipher.open(&sealed)?;

        connection.record_usage(self.clock.now());
        self.connections.update(&connection).await?;
        Ok(plaintext)
    }

    /// Revoke at the provider (best-effort) and mark the connection revoked.
    pub async fn revoke(&self, connection_id: ConnectionId) -> Result<OAuth2Connection> {
        let mut connection = self.require_connection(connection_id).await?;
        let app = self
            .apps
            .get(connection.app_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::OAuth2App, connection.app_id))?;
        let provider = self
            .providers
            .get(app.provider_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::OAuth2Provider, app.provider_id))?;

        if let (Some(revoke_url), Some(sealed)) =
            (provider.revoke_url.as_deref(), connection.access_token.clone())
        {
            let token = self.cipher.open(&sealed)?;
            if let Err(err) = self.client.revoke(revoke_url, &token).await {
                tracing::warn!(error = %err, "provider revocation failed; continuing");
            }
        }

        connection.mark_revoked(self.clock.now());
        self.connections.update(&connection).await?;
        tracing::info!(connection_id = %connection_id, "oauth2 connection revoked");
        Ok(connection)
    }

    pub(crate) async fn require_connection(
        &self,
        connection_id: ConnectionId,
    ) -> Result<OAuth2Connection> {
        self.connections
            .get(connection_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::OAuth2Connection, connection_id))
    }

    fn refresh_lock(&self, connection_id: ConnectionId) -> Arc<tokio::sync::Mutex<()>> {
        self.refresh_locks.lock().entry(connection_id).or_default().clone()
    }
}
