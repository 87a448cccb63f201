// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook trigger binding.

use crate::id::TenantId;
use crate::project::ProjectId;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

crate::define_id! {
    /// Unique identifier for a webhook. Part of the public trigger URL.
    pub struct WebhookId;
}

/// Binds an HTTP trigger to one project version.
///
/// Lookup is by id alone; the HMAC signature is what guards access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: WebhookId,
    pub tenant_id: TenantId,
    pub project_id: ProjectId,
    /// Captured at creation; runs triggered here execute this version.
    pub project_version: u32,
    /// HMAC-SHA256 key for payload signatures.
    pub secret: String,
    pub enabled: bool,
    /// Output key -> JSONPath-style source expression over the payload.
    /// Empty or absent means the raw payload passes through verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_mapping: Option<IndexMap<String, String>>,
    #[serde(default)]
    pub trigger_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_triggered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Webhook {
    /// Bump usage counters after a successful trigger.
    pub fn record_trigger(&mut self, now: DateTime<Utc>) {
        self.trigger_count += 1;
        self.last_triggered_at = Some(now);
        self.updated_at = now;
    }
}

crate::builder! {
    pub struct WebhookBuilder => Webhook {
        into {
            secret: String = "test-secret",
        }
        set {
            id: WebhookId = WebhookId::new(),
            tenant_id: TenantId = TenantId::new(),
            project_id: ProjectId = ProjectId::new(),
            project_version: u32 = 1,
            enabled: bool = true,
            trigger_count: u64 = 0,
        }
        option {
            input_mapping: IndexMap<String, String> = None,
            last_triggered_at: DateTime<Utc> = None,
        }
        computed {
            created_at: DateTime<Utc> = Utc::now(),
            updated_at: DateTime<Utc> = Utc::now(),
        }
    }
}
