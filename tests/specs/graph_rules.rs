// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structural rules: cycle rejection and branching containment.

use super::common::{edge, env, step};
use orq_core::{BlockGroupType, Error};
use orq_engine::{EdgeInput, GroupInput, SaveProject, StepInput};
use serde_json::json;

#[tokio::test]
async fn adding_a_closing_edge_is_rejected() {
    let env = env();
    let project = env.authoring.create_project(env.tenant, "P", "").await.unwrap();

    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let step = env
            .authoring
            .create_step(env.tenant, project.id, StepInput::new(name, "function"))
            .await
            .unwrap();
        ids.push(step.id);
    }
    env.authoring
        .create_edge(env.tenant, project.id, EdgeInput::between(ids[0], ids[1]))
        .await
        .unwrap();
    env.authoring
        .create_edge(env.tenant, project.id, EdgeInput::between(ids[1], ids[2]))
        .await
        .unwrap();

    let err = env
        .authoring
        .create_edge(env.tenant, project.id, EdgeInput::between(ids[2], ids[0]))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EdgeCreatesCycle));

    // No edge row was inserted.
    let details = env.authoring.get_with_details(env.tenant, project.id).await.unwrap();
    assert_eq!(details.edges.len(), 2);
}

#[tokio::test]
async fn branch_outside_group_fails_until_wrapped() {
    let env = env();
    let project = env.authoring.create_project(env.tenant, "P", "").await.unwrap();

    let start = step("start", "start");
    let cond = step("condition", "decide");
    let yes = step("function", "yes");
    let no = step("function", "no");
    let edges = vec![edge(&start, &cond), edge(&cond, &yes), edge(&cond, &no)];

    let payload = SaveProject {
        name: "P".into(),
        description: String::new(),
        variables: json!({}),
        steps: vec![start.clone(), cond.clone(), yes.clone(), no.clone()],
        edges: edges.clone(),
    };
    let err = env.authoring.save(env.tenant, project.id, payload).await.unwrap_err();
    assert!(matches!(err, Error::BranchOutsideGroup(_)));

    // Wrap the conditional and both sinks in a try_catch group; retry.
    let group = env
        .authoring
        .create_group(env.tenant, project.id, GroupInput::new("branch", BlockGroupType::TryCatch))
        .await
        .unwrap();
    let mut grouped = vec![start, cond, yes, no];
    for step in grouped.iter_mut().skip(1) {
        step.block_group_id = Some(group.id);
        step.group_role = Some("body".into());
    }
    let payload = SaveProject {
        name: "P".into(),
        description: String::new(),
        variables: json!({}),
        steps: grouped,
        edges,
    };
    let details = env.authoring.save(env.tenant, project.id, payload).await.unwrap();
    assert_eq!(details.project.version, 1);

    // The snapshot embeds the group.
    let snapshot = env.authoring.versions().get(project.id, 1).await.unwrap();
    assert_eq!(snapshot.definition.block_groups.len(), 1);
}
