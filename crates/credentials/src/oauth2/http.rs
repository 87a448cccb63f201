// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound HTTP to provider endpoints, behind a trait so tests can stub
//! providers without a network.

use async_trait::async_trait;
use orq_core::{Error, Result};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

/// Timeout for token, userinfo, and revoke endpoints.
const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// Authorization-code exchange request.
#[derive(Debug, Clone)]
pub struct TokenRequest {
    pub token_url: String,
    pub code: String,
    pub redirect_uri: String,
    pub client_id: String,
    pub client_secret: String,
    pub code_verifier: Option<String>,
}

/// Refresh-grant request.
#[derive(Debug, Clone)]
pub struct RefreshRequest {
    pub token_url: String,
    pub refresh_token: String,
    pub client_id: String,
    pub client_secret: String,
}

/// Token endpoint response, shared by both grants.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Provider endpoint calls made during the OAuth2 lifecycle.
#[async_trait]
pub trait TokenClient: Send + Sync {
    async fn exchange_code(&self, req: TokenRequest) -> Result<TokenResponse>;
    async fn refresh(&self, req: RefreshRequest) -> Result<TokenResponse>;
    async fn fetch_userinfo(&self, url: &str, access_token: &str) -> Result<Value>;
    /// Best-effort revocation post.
    async fn revoke(&self, url: &str, token: &str) -> Result<()>;
}

/// Production client over reqwest.
pub struct HttpTokenClient {
    client: reqwest::Client,
}

impl HttpTokenClient {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(PROVIDER_TIMEOUT)
            .build()
            .map_err(|e| Error::TokenEndpoint(format!("http client init failed: {e}")))?;
        Ok(Self { client })
    }

    async fn post_token_form(
        &self,
        token_url: &str,
        form: &[(&str, &str)],
    ) -> Result<TokenResponse> {
        let response = self
            .client
            .post(token_url)
            .form(form)
            .send()
            .await
            .map_err(|e| Error::TokenEndpoint(format!("token endpoint unreachable: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::TokenEndpoint(format!("token endpoint read failed: {e}")))?;
        if !status.is_success() {
            return Err(Error::TokenEndpoint(format!("token endpoint returned {status}: {body}")));
        }
        serde_json::from_str(&body)
            .map_err(|e| Error::TokenEndpoint(format!("token endpoint response malformed: {e}")))
    }
}

#[async_trait]
impl TokenClient for HttpTokenClient {
    async fn exchange_code(&self, req: TokenRequest) -> Result<TokenResponse> {
        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", req.code.as_str()),
            ("redirect_uri", req.redirect_uri.as_str()),
            ("client_id", req.client_id.as_str()),
            ("client_secret", req.client_secret.as_str()),
        ];
        if let Some(verifier) = req.code_verifier.as_deref() {
            form.push(("code_verifier", verifier));
        }
        self.post_token_form(&req.token_url, &form).await
    }

    async fn refresh(&self, req: RefreshRequest) -> Result<TokenResponse> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", req.refresh_token.as_str()),
            ("client_id", req.client_id.as_str()),
            ("client_secret", req.client_secret.as_str()),
        ];
        self.post_token_form(&req.token_url, &form).await
    }

    async fn fetch_userinfo(&self, url: &str, access_token: &str) -> Result<Value> {
        let response = self
            .client
            .get(url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| Error::TokenEndpoint(format!("userinfo unreachable: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::TokenEndpoint(format!(
                "userinfo returned {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| Error::TokenEndpoint(format!("userinfo response malformed: {e}")))
    }

    async fn revoke(&self, url: &str, token: &str) -> Result<()> {
        let response = self
            .client
            .post(url)
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| Error::TokenEndpoint(format!("revoke endpoint unreachable: {e}")))?;
        if !response.status().is_success() {
            return Err(Error::TokenEndpoint(format!(
                "revoke endpoint returned {}",
                response.status()
            )));
        }
        Ok(())
    }
}
