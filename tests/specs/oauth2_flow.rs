// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OAuth2 happy path against a stubbed PKCE-required provider.

use super::common::env;
use async_trait::async_trait;
use orq_core::{
    Clock, ConnectionStatus, CredentialScope, OAuth2App, OAuth2AppStatus, OAuth2Provider,
    ProviderId, UserId,
};
use orq_credentials::{
    OAuth2Service, RefreshRequest, SecretCipher, StartRequest, TokenClient, TokenRequest,
    TokenResponse,
};
use orq_storage::{OAuth2AppRepo, OAuth2ProviderRepo};
use serde_json::{json, Value};
use std::sync::Arc;

/// A provider that accepts any code and returns fixed tokens.
struct FixedProvider;

#[async_trait]
impl TokenClient for FixedProvider {
    async fn exchange_code(&self, req: TokenRequest) -> orq_core::Result<TokenResponse> {
        assert!(req.code_verifier.is_some(), "PKCE provider must receive a verifier");
        Ok(TokenResponse {
            access_token: "ya29.fresh-token".into(),
            refresh_token: Some("1//refresh".into()),
            expires_in: Some(3599),
            token_type: Some("Bearer".into()),
            scope: None,
        })
    }

    async fn refresh(&self, _req: RefreshRequest) -> orq_core::Result<TokenResponse> {
        Ok(TokenResponse {
            access_token: "ya29.refreshed".into(),
            refresh_token: None,
            expires_in: Some(3599),
            token_type: Some("Bearer".into()),
            scope: None,
        })
    }

    async fn fetch_userinfo(&self, _url: &str, _token: &str) -> orq_core::Result<Value> {
        Ok(json!({"sub": "1047", "email": "dev@example.com", "name": "Dev"}))
    }

    async fn revoke(&self, _url: &str, _token: &str) -> orq_core::Result<()> {
        Ok(())
    }
}

#[tokio::test]
async fn authorization_code_happy_path() {
    let env = env();
    let cipher = SecretCipher::new([9u8; 32]);
    let now = env.clock.now();

    let provider = OAuth2Provider {
        id: ProviderId::new(),
        slug: "google".into(),
        name: "Google".into(),
        authorization_url: "https://accounts.google.com/o/oauth2/v2/auth".into(),
        token_url: "https://oauth2.googleapis.com/token".into(),
        userinfo_url: Some("https://openidconnect.googleapis.com/v1/userinfo".into()),
        revoke_url: Some("https://oauth2.googleapis.com/revoke".into()),
        requires_pkce: true,
        default_scopes: vec!["openid".into()],
        is_preset: true,
        created_at: now,
        updated_at: now,
    };
    OAuth2ProviderRepo::create(env.store.as_ref(), &provider).await.unwrap();

    let app = OAuth2App {
        id: orq_core::OAuth2AppId::new(),
        tenant_id: env.tenant,
        provider_id: provider.id,
        name: "workspace".into(),
        client_id: cipher.seal("tenant-client-id").unwrap(),
        client_secret: cipher.seal("tenant-client-secret").unwrap(),
        custom_scopes: vec![],
        status: OAuth2AppStatus::Active,
        created_at: now,
        updated_at: now,
    };
    OAuth2AppRepo::create(env.store.as_ref(), &app).await.unwrap();

    let service = OAuth2Service::new(
        env.store.clone(),
        env.store.clone(),
        env.store.clone(),
        env.store.clone(),
        cipher.clone(),
        Arc::new(FixedProvider),
        "https://orq.example.com",
        env.clock.clone(),
    );

    // Start: URL carries the PKCE challenge, the tenant client id, and a
    // 32-char state.
    let started = service
        .start(StartRequest {
            tenant: env.tenant,
            user: UserId::new(),
            provider_slug: "google".into(),
            scope: CredentialScope::Organization,
            credential_name: "google-workspace".into(),
            owner_project_id: None,
            extra_scopes: vec![],
        })
        .await
        .unwrap();
    assert!(started.authorization_url.contains("code_challenge_method=S256"));
    assert!(started.authorization_url.contains("client_id=tenant-client-id"));
    assert_eq!(started.state.len(), 32);

    // Callback: pending -> connected, tokens sealed, handshake cleared.
    let connection = service.callback("4/code", &started.state, None).await.unwrap();
    assert_eq!(connection.status, ConnectionStatus::Connected);
    assert!(connection.state.is_none());
    assert!(connection.code_verifier.is_none());
    assert_eq!(connection.account_email.as_deref(), Some("dev@example.com"));

    let expires_at = connection.access_token_expires_at.unwrap();
    assert!(expires_at > env.clock.now());

    let sealed = connection.access_token.as_ref().unwrap();
    assert_ne!(sealed.ciphertext, "ya29.fresh-token");
    assert_eq!(cipher.open(sealed).unwrap(), "ya29.fresh-token");

    // Execution-time read returns the plaintext token.
    let token = service.get_valid_access_token(connection.credential_id).await.unwrap();
    assert_eq!(token, "ya29.fresh-token");

    // After expiry, one refresh happens and the new token is returned.
    env.clock.advance(std::time::Duration::from_secs(7200));
    let token = service.get_valid_access_token(connection.credential_id).await.unwrap();
    assert_eq!(token, "ya29.refreshed");
}
