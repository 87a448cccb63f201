// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! orq-copilot: LLM-driven authoring helpers.
//!
//! Everything here is advisory: proposals and generated flows are returned
//! to the caller, and actual project mutation still goes through the
//! authoring engine.

pub mod client;
pub mod env;
pub mod service;

pub use client::{ChatClient, ChatMessage, OpenAiClient};
pub use service::{
    CopilotService, GeneratedEdge, GeneratedProject, GeneratedStep, ProjectProposal,
};
