// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy for the orchestration core.
//!
//! Services across the workspace return this one error type so callers can
//! branch on kind (retry external failures, surface validation messages)
//! without unwrapping crate-specific enums.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resource names used in not-found errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    Project,
    Step,
    Edge,
    BlockGroup,
    BlockDefinition,
    Run,
    StepRun,
    Version,
    Webhook,
    Credential,
    CredentialShare,
    OAuth2Provider,
    OAuth2App,
    OAuth2Connection,
    Session,
}

crate::simple_display! {
    Resource {
        Project => "project",
        Step => "step",
        Edge => "edge",
        BlockGroup => "block group",
        BlockDefinition => "block definition",
        Run => "run",
        StepRun => "step run",
        Version => "version",
        Webhook => "webhook",
        Credential => "credential",
        CredentialShare => "credential share",
        OAuth2Provider => "oauth2 provider",
        OAuth2App => "oauth2 app",
        OAuth2Connection => "oauth2 connection",
        Session => "session",
    }
}

/// Broad classification of an [`Error`], used for retry and surfacing decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    Policy,
    Structural,
    External,
    Duplicate,
    Internal,
}

/// Unified error type for domain and service operations.
#[derive(Debug, Error)]
pub enum Error {
    // -- not found --
    #[error("{0} not found: {1}")]
    NotFound(Resource, String),

    // -- validation --
    #[error("validation failed on {field}: {message}")]
    Validation { field: String, message: String },

    // -- policy --
    #[error("project is not editable: {0}")]
    ProjectNotEditable(String),
    #[error("system projects cannot be deleted")]
    ForbiddenDeleteSystem,
    #[error("start steps cannot be members of a block group")]
    StepCannotBeInGroup,
    #[error("branching step {0:?} must be inside a block group")]
    BranchOutsideGroup(String),
    #[error("access to credential denied")]
    CredentialAccessDenied,
    #[error("run cannot be cancelled in status {0}")]
    RunNotCancellable(String),
    #[error("run is not resumable in status {0}")]
    RunNotResumable(String),
    #[error("webhook is disabled")]
    WebhookDisabled,
    #[error("webhook signature verification failed")]
    WebhookInvalidSecret,

    // -- structural --
    #[error("project contains a cycle")]
    ProjectHasCycle,
    #[error("step {0:?} is not connected to any edge")]
    ProjectHasUnconnected(String),
    #[error("edge would create a cycle")]
    EdgeCreatesCycle,
    #[error("edge connects a node to itself")]
    EdgeSelfLoop,
    #[error("source port {port:?} not declared by block {block}")]
    SourcePortNotFound { port: String, block: String },
    #[error("target port {port:?} not declared by block {block}")]
    TargetPortNotFound { port: String, block: String },

    // -- external --
    #[error("oauth2 refresh failed: {0}")]
    OAuth2RefreshFailed(String),
    #[error("oauth2 access token expired")]
    OAuth2TokenExpired,
    #[error("token endpoint error: {0}")]
    TokenEndpoint(String),
    #[error("llm call failed: {0}")]
    LlmCallFailed(String),
    #[error("crypto error: {0}")]
    Crypto(String),

    // -- duplicate --
    #[error("credential share already exists for that target")]
    CredentialShareDuplicate,
    #[error("oauth2 app already exists for that provider")]
    OAuth2AppAlreadyExists,

    // -- plumbing --
    #[error("storage error: {0}")]
    Storage(String),
    #[error("queue error: {0}")]
    Queue(String),
}

impl Error {
    /// Shorthand for a field validation failure.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation { field: field.into(), message: message.into() }
    }

    /// Shorthand for a not-found error with a displayable identifier.
    pub fn not_found(resource: Resource, id: impl std::fmt::Display) -> Self {
        Self::NotFound(resource, id.to_string())
    }

    /// Broad classification used for retry and surfacing decisions.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(..) => ErrorKind::NotFound,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::ProjectNotEditable(_)
            | Self::ForbiddenDeleteSystem
            | Self::StepCannotBeInGroup
            | Self::BranchOutsideGroup(_)
            | Self::CredentialAccessDenied
            | Self::RunNotCancellable(_)
            | Self::RunNotResumable(_)
            | Self::WebhookDisabled
            | Self::WebhookInvalidSecret => ErrorKind::Policy,
            Self::ProjectHasCycle
            | Self::ProjectHasUnconnected(_)
            | Self::EdgeCreatesCycle
            | Self::EdgeSelfLoop
            | Self::SourcePortNotFound { .. }
            | Self::TargetPortNotFound { .. } => ErrorKind::Structural,
            Self::OAuth2RefreshFailed(_)
            | Self::OAuth2TokenExpired
            | Self::TokenEndpoint(_)
            | Self::LlmCallFailed(_)
            | Self::Crypto(_) => ErrorKind::External,
            Self::CredentialShareDuplicate | Self::OAuth2AppAlreadyExists => ErrorKind::Duplicate,
            Self::Storage(_) | Self::Queue(_) => ErrorKind::Internal,
        }
    }

    /// True when the error is a missing-version lookup, which the dispatch
    /// engine treats as "fall back to the current draft" rather than fatal.
    pub fn is_version_not_found(&self) -> bool {
        matches!(self, Self::NotFound(Resource::Version, _))
    }
}

/// Convenience alias used across service crates.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
