// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Publish a project, then execute it.

use super::common::{edge, env, step};
use orq_core::{RunStatus, TriggeredBy};
use orq_engine::{CreateRun, SaveProject};
use orq_wire::ExecutionMode;
use serde_json::json;

#[tokio::test]
async fn publish_then_execute() {
    let env = env();
    let project = env.authoring.create_project(env.tenant, "P", "").await.unwrap();

    // First save: an implicit initial version.
    let s1 = step("start", "S1");
    let single = SaveProject {
        name: "P".into(),
        description: String::new(),
        variables: json!({}),
        steps: vec![s1.clone()],
        edges: vec![],
    };
    env.authoring.save(env.tenant, project.id, single).await.unwrap();

    // Second save: start -> function.
    let s2 = step("function", "S2");
    let payload = SaveProject {
        name: "P".into(),
        description: String::new(),
        variables: json!({}),
        steps: vec![s1.clone(), s2.clone()],
        edges: vec![edge(&s1, &s2)],
    };
    let details = env.authoring.save(env.tenant, project.id, payload).await.unwrap();
    assert_eq!(details.project.version, 2);

    // The version-2 snapshot exists and matches.
    let snapshot = env.authoring.versions().get(project.id, 2).await.unwrap();
    assert_eq!(snapshot.definition.steps.len(), 2);

    let run = env
        .dispatcher
        .create(CreateRun {
            tenant: env.tenant,
            project_id: project.id,
            version: None,
            input: json!({"x": 1}),
            triggered_by: TriggeredBy::Manual,
            user: None,
            start_step_id: s1.id,
        })
        .await
        .unwrap();

    assert_eq!(run.status, RunStatus::Pending);
    assert_eq!(run.project_version, 2);
    assert_eq!(run.input, json!({"x": 1}));

    let jobs = env.queue.drain();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].execution_mode, ExecutionMode::Full);
    assert_eq!(jobs[0].target_step_id, Some(s1.id));
    assert_eq!(jobs[0].project_version, 2);
}

#[tokio::test]
async fn sequential_saves_bump_versions_by_one() {
    let env = env();
    let project = env.authoring.create_project(env.tenant, "P", "").await.unwrap();

    for expected in 1..=4u32 {
        let s = step("start", "S1");
        let payload = SaveProject {
            name: "P".into(),
            description: String::new(),
            variables: json!({}),
            steps: vec![s],
            edges: vec![],
        };
        let details = env.authoring.save(env.tenant, project.id, payload).await.unwrap();
        assert_eq!(details.project.version, expected);
        assert_eq!(
            env.authoring.versions().latest(project.id).await.unwrap().unwrap().version,
            expected
        );
    }
}

#[tokio::test]
async fn save_round_trips_definition_content() {
    let env = env();
    let project = env.authoring.create_project(env.tenant, "P", "").await.unwrap();

    let s1 = step("start", "ingest");
    let s2 = step("llm", "summarize");
    let payload = SaveProject {
        name: "P".into(),
        description: "summarizer".into(),
        variables: json!({"model": "small"}),
        steps: vec![s1.clone(), s2.clone()],
        edges: vec![edge(&s1, &s2)],
    };
    env.authoring.save(env.tenant, project.id, payload).await.unwrap();

    let snapshot = env.authoring.versions().get(project.id, 1).await.unwrap();
    let definition = snapshot.definition;
    assert_eq!(definition.description, "summarizer");
    assert_eq!(definition.variables, json!({"model": "small"}));

    let ids: Vec<_> = definition.steps.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![s1.id, s2.id]);
    assert_eq!(definition.edges.len(), 1);
    assert_eq!(definition.edges[0].source_step_id, Some(s1.id));
    assert_eq!(definition.edges[0].target_step_id, Some(s2.id));
}
