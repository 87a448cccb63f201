// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the copilot crate.

use std::time::Duration;

/// Default chat-completions base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
/// Default model when none is configured.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// LLM API key: `ORQ_OPENAI_API_KEY` overrides `OPENAI_API_KEY`.
pub fn api_key() -> Option<String> {
    std::env::var("ORQ_OPENAI_API_KEY")
        .or_else(|_| std::env::var("OPENAI_API_KEY"))
        .ok()
        .filter(|s| !s.is_empty())
}

/// Chat-completions base URL (`OPENAI_BASE_URL`).
pub fn base_url() -> String {
    std::env::var("OPENAI_BASE_URL")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
}

/// Model override (`ORQ_COPILOT_MODEL`).
pub fn model() -> String {
    std::env::var("ORQ_COPILOT_MODEL")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_MODEL.to_string())
}

/// LLM request timeout (default 60s, configurable via `ORQ_LLM_TIMEOUT_MS`).
pub fn llm_timeout() -> Duration {
    std::env::var("ORQ_LLM_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(60))
}
