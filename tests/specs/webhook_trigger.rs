// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook trigger: HMAC verification and payload projection.

use super::common::env;
use indexmap::IndexMap;
use orq_core::{Error, Step, Webhook};
use orq_engine::sign_payload;
use orq_storage::{RunRepo, StepRepo, WebhookRepo};
use serde_json::json;

#[tokio::test]
async fn mapped_payload_creates_run() {
    let env = env();
    let project = env.authoring.create_project(env.tenant, "P", "").await.unwrap();

    let start = Step::builder()
        .tenant_id(env.tenant)
        .project_id(project.id)
        .step_type("webhook_trigger")
        .name("hook")
        .trigger_type(orq_core::TriggerType::Webhook)
        .build();
    StepRepo::create(env.store.as_ref(), &start).await.unwrap();

    let mut mapping = IndexMap::new();
    mapping.insert("event".to_string(), "$.action".to_string());
    mapping.insert("name".to_string(), "$.repository.name".to_string());
    let mut webhook = Webhook::builder()
        .tenant_id(env.tenant)
        .project_id(project.id)
        .project_version(1)
        .secret("s")
        .build();
    webhook.input_mapping = Some(mapping);
    WebhookRepo::create(env.store.as_ref(), &webhook).await.unwrap();

    let payload = br#"{"action":"opened","repository":{"name":"repo-1"}}"#;
    let signature = sign_payload("s", payload);

    let run = env.webhooks.trigger(webhook.id, payload, &signature).await.unwrap();
    assert_eq!(run.input, json!({"event": "opened", "name": "repo-1"}));

    let jobs = env.queue.drain();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].input, json!({"event": "opened", "name": "repo-1"}));
}

#[tokio::test]
async fn wrong_signature_creates_nothing() {
    let env = env();
    let project = env.authoring.create_project(env.tenant, "P", "").await.unwrap();

    let webhook = Webhook::builder()
        .tenant_id(env.tenant)
        .project_id(project.id)
        .project_version(1)
        .secret("s")
        .build();
    WebhookRepo::create(env.store.as_ref(), &webhook).await.unwrap();

    let payload = br#"{"action":"opened"}"#;
    let forged = sign_payload("wrong-secret", payload);

    let err = env.webhooks.trigger(webhook.id, payload, &forged).await.unwrap_err();
    assert!(matches!(err, Error::WebhookInvalidSecret));

    assert!(env.queue.is_empty());
    assert!(RunRepo::list_by_project(env.store.as_ref(), project.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn identity_mapping_law() {
    // applyInputMapping(X, {"all": "$"}) == {"all": X} for any payload.
    let payloads = [
        json!({"a": 1}),
        json!([1, 2, 3]),
        json!("scalar"),
        json!(null),
        json!({"nested": {"deep": {"x": true}}}),
    ];
    let mut mapping = IndexMap::new();
    mapping.insert("all".to_string(), "$".to_string());
    for payload in payloads {
        let mapped = orq_engine::apply_input_mapping(&payload, Some(&mapping)).unwrap();
        assert_eq!(mapped, json!({"all": payload}));
    }
}
