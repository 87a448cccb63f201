// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::signature::sign_payload;
use indexmap::IndexMap;
use orq_core::{FakeClock, Project, Step, Webhook, WebhookId};
use orq_storage::{MemoryStore, ProjectRepo, RunRepo, StepRepo, WebhookRepo};
use orq_wire::MemoryQueue;
use serde_json::json;
use std::sync::Arc;

struct Fixture {
    store: Arc<MemoryStore>,
    queue: Arc<MemoryQueue>,
    trigger: WebhookTrigger<FakeClock>,
}

fn fixture() -> Fixture {
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(MemoryQueue::new());
    let trigger =
        WebhookTrigger::new(store.clone(), store.clone(), store.clone(), queue.clone(), FakeClock::new());
    Fixture { store, queue, trigger }
}

impl Fixture {
    /// Webhook bound to a project with a webhook-trigger start step.
    async fn webhook(&self, mapping: Option<IndexMap<String, String>>) -> (Webhook, Step) {
        let project = Project::builder().build();
        ProjectRepo::create(self.store.as_ref(), &project).await.unwrap();

        let start = Step::builder()
            .tenant_id(project.tenant_id)
            .project_id(project.id)
            .step_type("webhook_trigger")
            .name("hook")
            .trigger_type(orq_core::TriggerType::Webhook)
            .build();
        StepRepo::create(self.store.as_ref(), &start).await.unwrap();

        let mut webhook = Webhook::builder()
            .tenant_id(project.tenant_id)
            .project_id(project.id)
            .project_version(1)
            .secret("s")
            .build();
        webhook.input_mapping = mapping;
        WebhookRepo::create(self.store.as_ref(), &webhook).await.unwrap();
        (webhook, start)
    }
}

#[tokio::test]
async fn trigger_with_mapping_projects_payload() {
    let f = fixture();
    let mut mapping = IndexMap::new();
    mapping.insert("event".to_string(), "$.action".to_string());
    mapping.insert("name".to_string(), "$.repository.name".to_string());
    let (webhook, start) = f.webhook(Some(mapping)).await;

    let payload = br#"{"action":"opened","repository":{"name":"repo-1"}}"#;
    let signature = sign_payload("s", payload);

    let run = f.trigger.trigger(webhook.id, payload, &signature).await.unwrap();
    assert_eq!(run.input, json!({"event": "opened", "name": "repo-1"}));
    assert_eq!(run.triggered_by, orq_core::TriggeredBy::Webhook);
    assert_eq!(run.project_version, 1);
    assert_eq!(run.start_step_id, Some(start.id));

    let jobs = f.queue.drain();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].execution_mode, orq_wire::ExecutionMode::Full);
    assert_eq!(jobs[0].input, json!({"event": "opened", "name": "repo-1"}));

    // Usage counters bumped.
    let stored = WebhookRepo::get(f.store.as_ref(), webhook.id).await.unwrap().unwrap();
    assert_eq!(stored.trigger_count, 1);
    assert!(stored.last_triggered_at.is_some());
}

#[tokio::test]
async fn trigger_without_mapping_passes_payload_verbatim() {
    let f = fixture();
    let (webhook, _) = f.webhook(None).await;

    let payload = br#"{"anything": [1, 2, 3]}"#;
    let signature = sign_payload("s", payload);

    let run = f.trigger.trigger(webhook.id, payload, &signature).await.unwrap();
    assert_eq!(run.input, json!({"anything": [1, 2, 3]}));
}

#[tokio::test]
async fn wrong_signature_creates_no_run() {
    let f = fixture();
    let (webhook, _) = f.webhook(None).await;

    let payload = br#"{"a":1}"#;
    let err = f.trigger.trigger(webhook.id, payload, "deadbeef").await.unwrap_err();
    assert!(matches!(err, orq_core::Error::WebhookInvalidSecret));

    let err = f.trigger.trigger(webhook.id, payload, "").await.unwrap_err();
    assert!(matches!(err, orq_core::Error::WebhookInvalidSecret));

    assert!(f.queue.is_empty());
    let runs = RunRepo::list_by_project(f.store.as_ref(), webhook.project_id).await.unwrap();
    assert!(runs.is_empty());
}

#[tokio::test]
async fn disabled_webhook_is_rejected() {
    let f = fixture();
    let (mut webhook, _) = f.webhook(None).await;
    webhook.enabled = false;
    WebhookRepo::update(f.store.as_ref(), &webhook).await.unwrap();

    let payload = b"{}";
    let signature = sign_payload("s", payload);
    let err = f.trigger.trigger(webhook.id, payload, &signature).await.unwrap_err();
    assert!(matches!(err, orq_core::Error::WebhookDisabled));
}

#[tokio::test]
async fn unknown_webhook_is_not_found() {
    let f = fixture();
    let err = f.trigger.trigger(WebhookId::new(), b"{}", "sig").await.unwrap_err();
    assert!(matches!(err, orq_core::Error::NotFound(..)));
}

#[tokio::test]
async fn non_json_payload_is_rejected_after_verification() {
    let f = fixture();
    let (webhook, _) = f.webhook(None).await;

    let payload = b"not json";
    let signature = sign_payload("s", payload);
    let err = f.trigger.trigger(webhook.id, payload, &signature).await.unwrap_err();
    assert!(matches!(err, orq_core::Error::Validation { .. }));
}
