// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Draft overlay round-trip laws.

use super::common::{edge, env, step};
use orq_engine::SaveProject;
use serde_json::json;

#[tokio::test]
async fn draft_overlays_then_discard_restores() {
    let env = env();
    let project = env.authoring.create_project(env.tenant, "P", "").await.unwrap();

    // Persisted content.
    let s1 = step("start", "persisted");
    env.authoring
        .save(
            env.tenant,
            project.id,
            SaveProject {
                name: "saved-name".into(),
                description: String::new(),
                variables: json!({}),
                steps: vec![s1.clone()],
                edges: vec![],
            },
        )
        .await
        .unwrap();

    // Draft content.
    let d1 = step("start", "draft-start");
    let d2 = step("function", "draft-work");
    env.authoring
        .save_draft(
            env.tenant,
            project.id,
            SaveProject {
                name: "draft-name".into(),
                description: "drafting".into(),
                variables: json!({"k": "v"}),
                steps: vec![d1.clone(), d2.clone()],
                edges: vec![edge(&d1, &d2)],
            },
        )
        .await
        .unwrap();

    // Reads overlay the draft.
    let details = env.authoring.get_with_details(env.tenant, project.id).await.unwrap();
    assert_eq!(details.project.name, "draft-name");
    assert_eq!(details.project.variables, json!({"k": "v"}));
    let names: Vec<_> = details.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["draft-start", "draft-work"]);
    assert_eq!(details.edges.len(), 1);

    // The persisted rows and version table never moved.
    assert_eq!(details.project.version, 1);
    assert!(env.authoring.versions().get(project.id, 2).await.is_err());

    // Discard returns the pre-draft persisted state.
    let details = env.authoring.discard_draft(env.tenant, project.id).await.unwrap();
    assert_eq!(details.project.name, "saved-name");
    let names: Vec<_> = details.steps.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["persisted"]);
    assert!(details.edges.is_empty());
}
