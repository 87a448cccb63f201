// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth2 authorization-code flow and connection lifecycle.

mod http;
mod pkce;
mod tokens;

pub use http::{HttpTokenClient, RefreshRequest, TokenClient, TokenRequest, TokenResponse};
pub use pkce::{code_challenge, generate_code_verifier, generate_state};

use chrono::Duration;
use orq_core::{
    Clock, ConnectionId, Credential, CredentialId, CredentialScope, CredentialStatus,
    CredentialType, Error, OAuth2App, OAuth2Connection, OAuth2Provider, ProjectId, Resource,
    Result, TenantId, UserId,
};
use orq_storage::{
    CredentialRepo, OAuth2AppRepo, OAuth2ConnectionRepo, OAuth2ProviderRepo,
};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use url::Url;

use crate::crypto::SecretCipher;

/// Everything the browser redirect needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartAuthorization {
    pub authorization_url: String,
    pub state: String,
    pub credential_id: CredentialId,
}

/// Inputs for starting an authorization.
#[derive(Debug, Clone)]
pub struct StartRequest {
    pub tenant: TenantId,
    pub user: UserId,
    pub provider_slug: String,
    pub scope: CredentialScope,
    /// Becomes the credential name; unique per tenant.
    pub credential_name: String,
    pub owner_project_id: Option<ProjectId>,
    pub extra_scopes: Vec<String>,
}

/// The OAuth2 subsystem: authorization handshake, token exchange, refresh,
/// and the execution-time token read path.
pub struct OAuth2Service<C: Clock> {
    pub(crate) providers: Arc<dyn OAuth2ProviderRepo>,
    pub(crate) apps: Arc<dyn OAuth2AppRepo>,
    pub(crate) connections: Arc<dyn OAuth2ConnectionRepo>,
    pub(crate) credentials: Arc<dyn CredentialRepo>,
    pub(crate) cipher: SecretCipher,
    pub(crate) client: Arc<dyn TokenClient>,
    pub(crate) redirect_base: String,
    pub(crate) clock: C,
    /// Per-connection refresh serialization.
    pub(crate) refresh_locks: Mutex<HashMap<ConnectionId, Arc<tokio::sync::Mutex<()>>>>,
}

impl<C: Clock> OAuth2Service<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        providers: Arc<dyn OAuth2ProviderRepo>,
        apps: Arc<dyn OAuth2AppRepo>,
        connections: Arc<dyn OAuth2ConnectionRepo>,
        credentials: Arc<dyn CredentialRepo>,
        cipher: SecretCipher,
        client: Arc<dyn TokenClient>,
        redirect_base: impl Into<String>,
        clock: C,
    ) -> Self {
        Self {
            providers,
            apps,
            connections,
            credentials,
            cipher,
            client,
            redirect_base: redirect_base.into(),
            clock,
            refresh_locks: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn redirect_uri(&self) -> String {
        format!("{}/oauth2/callback", self.redirect_base.trim_end_matches('/'))
    }

    /// Begin the authorization-code flow: create the credential shell and a
    /// pending connection, and build the provider redirect URL.
    pub async fn start(&self, req: StartRequest) -> Result<StartAuthorization> {
        let provider = self.require_provider_by_slug(&req.provider_slug).await?;
        let app = self
            .apps
            .find(req.tenant, provider.id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::OAuth2App, &req.provider_slug))?;
        let client_id = self.cipher.open(&app.client_id)?;

        let now = self.clock.now();
        let credential = Credential {
            id: CredentialId::new(),
            tenant_id: req.tenant,
            name: req.credential_name.clone(),
            credential_type: CredentialType::OAuth2,
            scope: req.scope,
            owner_user_id: (req.scope == CredentialScope::Personal).then_some(req.user),
            owner_project_id: req.owner_project_id,
            status: CredentialStatus::Active,
            data: Default::default(),
            created_at: now,
            updated_at: now,
        };
        credential.validate_scope()?;
        self.credentials.create(&credential).await?;

        let state = pkce::generate_state();
        let code_verifier = provider.requires_pkce.then(pkce::generate_code_verifier);

        let connection = OAuth2Connection::pending(
            req.tenant,
            credential.id,
            app.id,
            state.clone(),
            code_verifier.clone(),
            now,
        );
        if let Err(err) = self.connections.create(&connection).await {
            // Compensate: the credential shell is useless without its
            // connection. Best-effort, the original failure wins.
            if let Err(cleanup) = self.credentials.delete(credential.id).await {
                tracing::warn!(error = %cleanup, "credential cleanup after connection failure failed");
            }
            return Err(err.into());
        }

        let scopes = self.collect_scopes(&provider, &app, &req.extra_scopes);
        let mut url = Url::parse(&provider.authorization_url)
            .map_err(|e| Error::validation("authorization_url", e.to_string()))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &client_id);
            query.append_pair("redirect_uri", &self.redirect_uri());
            query.append_pair("response_type", "code");
            query.append_pair("state", &state);
            if !scopes.is_empty() {
                query.append_pair("scope", &scopes.join(" "));
            }
            if let Some(verifier) = &code_verifier {
                query.append_pair("code_challenge", &pkce::code_challenge(verifier));
                query.append_pair("code_challenge_method", "S256");
            }
        }

        tracing::info!(
            provider = %provider.slug,
            credential_id = %credential.id,
            pkce = code_verifier.is_some(),
            "oauth2 authorization started"
        );
        Ok(StartAuthorization {
            authorization_url: url.into(),
            state,
            credential_id: credential.id,
        })
    }

    /// Handle the provider redirect: exchange the code, seal the tokens,
    /// and mark the connection connected.
    pub async fn callback(
        &self,
        code: &str,
        state: &str,
        error: Option<&str>,
    ) -> Result<OAuth2Connection> {
        if let Some(error) = error.filter(|e| !e.is_empty()) {
            return Err(Error::TokenEndpoint(format!("provider returned error: {error}")));
        }

        // Single use: claiming clears the stored state, so a replayed
        // callback with the same state misses.
        let mut connection = self
            .connections
            .claim_by_state(state)
            .await?
            .ok_or_else(|| Error::not_found(Resource::OAuth2Connection, state))?;

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

        let token_request = TokenRequest {
            token_url: provider.token_url.clone(),
            code: code.to_string(),
            redirect_uri: self.redirect_uri(),
            client_id: self.cipher.open(&app.client_id)?,
            client_secret: self.cipher.open(&app.client_secret)?,
            code_verifier: connection.code_verifier.clone(),
        };

        let now = self.clock.now();
        let response = match self.client.exchange_code(token_request).await {
            Ok(response) => response,
            Err(err) => {
                connection.mark_error(err.to_string(), now);
                self.connections.update(&connection).await?;
                return Err(err);
            }
        };

        let access_token = self.cipher.seal(&response.access_token)?;
        let refresh_token =
            response.refresh_token.as_deref().map(|t| self.cipher.seal(t)).transpose()?;
        let expires_at =
            response.expires_in.map(|secs| now + Duration::seconds(secs.min(i64::MAX as u64) as i64));
        let token_type = response.token_type.unwrap_or_else(|| "Bearer".to_string());

        connection.mark_connected(access_token, refresh_token, token_type, expires_at, now);

        // Userinfo enrichment is best-effort; failures never fail the flow.
        if let Some(userinfo_url) = provider.userinfo_url.as_deref() {
            match self.client.fetch_userinfo(userinfo_url, &response.access_token).await {
                Ok(info) => {
                    let field = |key: &str| {
                        info.get(key).and_then(|v| v.as_str()).map(str::to_string)
                    };
                    let account_id = field("id").or_else(|| field("sub"));
                    connection.set_account(
                        account_id,
                        field("email"),
                        field("name"),
                        Some(info),
                        now,
                    );
                }
                Err(err) => {
                    tracing::warn!(error = %err, "userinfo fetch failed; continuing");
                }
            }
        }

        self.connections.update(&connection).await?;
        tracing::info!(
            connection_id = %connection.id,
            credential_id = %connection.credential_id,
            "oauth2 connection established"
        );
        Ok(connection)
    }

    fn collect_scopes(
        &self,
        provider: &OAuth2Provider,
        app: &OAuth2App,
        extra: &[String],
    ) -> Vec<String> {
        let mut scopes: Vec<String> = provider.default_scopes.clone();
        for scope in app.custom_scopes.iter().chain(extra) {
            if !scopes.iter().any(|s| s == scope) {
                scopes.push(scope.clone());
            }
        }
        scopes
    }

    pub(crate) async fn require_provider_by_slug(&self, slug: &str) -> Result<OAuth2Provider> {
        self.providers
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| Error::not_found(Resource::OAuth2Provider, slug))
    }
}

#[cfg(test)]
#[path = "../oauth2_tests.rs"]
mod tests;
