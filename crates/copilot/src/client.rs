// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OpenAI-compatible chat client.

use async_trait::async_trait;
use orq_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::env;

/// One message in a chat-completions request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".into(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".into(), content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: "assistant".into(), content: content.into() }
    }
}

/// The LLM seam. Implementations return the assistant's raw text.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String>;
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Production client posting to `{base_url}/chat/completions`.
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiClient {
    /// Build from the environment. Fails when no API key is configured.
    pub fn from_env() -> Result<Self> {
        let api_key = env::api_key()
            .ok_or_else(|| Error::LlmCallFailed("no OpenAI API key configured".into()))?;
        let client = reqwest::Client::builder()
            .timeout(env::llm_timeout())
            .build()
            .map_err(|e| Error::LlmCallFailed(format!("http client init failed: {e}")))?;
        Ok(Self {
            client,
            base_url: env::base_url(),
            api_key,
            model: env::model(),
            temperature: 0.2,
            max_tokens: 4096,
        })
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::LlmCallFailed(format!("chat endpoint unreachable: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::LlmCallFailed(format!("chat endpoint returned {status}: {body}")));
        }
        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::LlmCallFailed(format!("chat response malformed: {e}")))?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::LlmCallFailed("chat response had no content".into()))
    }
}

/// Strip a surrounding markdown code fence, if any. Models regularly wrap
/// JSON answers in ```json fences despite instructions.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else { return trimmed };
    let Some(inner) = inner.strip_suffix("```") else { return trimmed };
    // Drop the language tag on the opening fence.
    match inner.split_once('\n') {
        Some((first_line, rest)) if !first_line.contains('{') && !first_line.contains('[') => {
            rest.trim()
        }
        _ => inner.trim(),
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
