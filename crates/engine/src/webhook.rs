// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook trigger path: signature verification, payload projection, run
//! creation.

use orq_core::{
    Clock, Error, Resource, Result, Run, RunId, RunStatus, Step, TenantId, TriggeredBy, TriggerType,
    WebhookId,
};
use orq_storage::{RunRepo, StepRepo, WebhookRepo};
use orq_wire::{ExecutionMode, JobQueue, RunJob};
use serde_json::Value;
use std::sync::Arc;

use crate::mapping::apply_input_mapping;
use crate::signature::verify_signature;

/// Handles inbound webhook posts. Lookup is by id alone; the HMAC signature
/// is the access control.
pub struct WebhookTrigger<C: Clock> {
    webhooks: Arc<dyn WebhookRepo>,
    steps: Arc<dyn StepRepo>,
    runs: Arc<dyn RunRepo>,
    queue: Arc<dyn JobQueue>,
    clock: C,
}

impl<C: Clock> WebhookTrigger<C> {
    pub fn new(
        webhooks: Arc<dyn WebhookRepo>,
        steps: Arc<dyn StepRepo>,
        runs: Arc<dyn RunRepo>,
        queue: Arc<dyn JobQueue>,
        clock: C,
    ) -> Self {
        Self { webhooks, steps, runs, queue, clock }
    }

    /// Verify and fire a webhook. Returns the created run.
    ///
    /// `raw_payload` is the request body exactly as received — the signature
    /// covers the raw bytes, not a re-serialization.
    pub async fn trigger(
        &self,
        webhook_id: WebhookId,
        raw_payload: &[u8],
        signature: &str,
    ) -> Result<Run> {
        let mut webhook = self
            .webhooks
            .get(webhook_id)
            .await?
            .ok_or_else(|| Error::not_found(Resource::Webhook, webhook_id))?;
        if !webhook.enabled {
            return Err(Error::WebhookDisabled);
        }
        if !verify_signature(&webhook.secret, raw_payload, signature) {
            tracing::warn!(webhook_id = %webhook_id, "webhook signature rejected");
            return Err(Error::WebhookInvalidSecret);
        }

        let payload: Value = serde_json::from_slice(raw_payload)
            .map_err(|e| Error::validation("payload", format!("payload is not JSON: {e}")))?;
        let input = apply_input_mapping(&payload, webhook.input_mapping.as_ref())?;

        let start = self.find_webhook_start(webhook.tenant_id, webhook.project_id).await?;

        let now = self.clock.now();
        let run = Run {
            id: RunId::new(),
            tenant_id: webhook.tenant_id,
            project_id: webhook.project_id,
            project_version: webhook.project_version,
            status: RunStatus::Pending,
            input: input.clone(),
            triggered_by: TriggeredBy::Webhook,
            triggered_by_user: None,
            start_step_id: start.as_ref().map(|s| s.id),
            internal_trigger_source: None,
            internal_trigger_metadata: None,
            started_at: None,
            finished_at: None,
            created_at: now,
            updated_at: now,
        };
        self.runs.create(&run).await?;

        self.queue
            .enqueue(&RunJob {
                tenant_id: run.tenant_id,
                project_id: run.project_id,
                project_version: run.project_version,
                run_id: run.id,
                input,
                execution_mode: ExecutionMode::Full,
                target_step_id: run.start_step_id,
                step_input: None,
                injected_outputs: None,
                project_tenant_id: None,
            })
            .await?;

        webhook.record_trigger(now);
        self.webhooks.update(&webhook).await?;

        tracing::info!(webhook_id = %webhook_id, run_id = %run.id, "webhook run enqueued");
        Ok(run)
    }

    /// The webhook-triggered start step, falling back to any start block.
    /// `None` defers flow selection to the worker.
    async fn find_webhook_start(
        &self,
        _tenant: TenantId,
        project: orq_core::ProjectId,
    ) -> Result<Option<Step>> {
        let steps = self.steps.list_by_project(project).await?;
        let webhook_start = steps
            .iter()
            .find(|s| s.is_start() && s.trigger_type == Some(TriggerType::Webhook))
            .cloned();
        Ok(webhook_start.or_else(|| steps.into_iter().find(|s| s.is_start())))
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
