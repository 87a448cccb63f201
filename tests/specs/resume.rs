// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resume-from-step and single-step re-execution.

use super::common::{edge, env, step};
use orq_core::{Clock, Run, RunStatus, StepRun, StepRunStatus};
use orq_engine::SaveProject;
use orq_storage::{RunRepo, StepRunRepo};
use orq_wire::ExecutionMode;
use serde_json::json;

#[tokio::test]
async fn resume_from_middle_of_chain() {
    let env = env();
    let project = env.authoring.create_project(env.tenant, "P", "").await.unwrap();

    // A -> B -> C -> D.
    let steps: Vec<_> =
        ["A", "B", "C", "D"].iter().enumerate().map(|(i, name)| {
            step(if i == 0 { "start" } else { "function" }, name)
        }).collect();
    let edges = steps.windows(2).map(|p| edge(&p[0], &p[1])).collect();
    env.authoring
        .save(
            env.tenant,
            project.id,
            SaveProject {
                name: "P".into(),
                description: String::new(),
                variables: json!({}),
                steps: steps.clone(),
                edges,
            },
        )
        .await
        .unwrap();

    // A terminated run with completed attempts for all four steps.
    let run = Run::builder()
        .tenant_id(env.tenant)
        .project_id(project.id)
        .project_version(1)
        .status(RunStatus::Completed)
        .build();
    RunRepo::create(env.store.as_ref(), &run).await.unwrap();
    for (i, s) in steps.iter().enumerate() {
        let mut sr = StepRun::new_attempt(
            run.id,
            s.id,
            s.name.clone(),
            (i + 1) as u32,
            json!({"in": s.name}),
            env.clock.now(),
        );
        sr.sequence_number = Some((i + 1) as u32);
        sr.status = StepRunStatus::Completed;
        sr.output = json!({"out": s.name});
        StepRunRepo::create(env.store.as_ref(), &sr).await.unwrap();
    }

    // Resume from B with no input override.
    let plan = env
        .dispatcher
        .resume_from_step(env.tenant, run.id, steps[1].id, None)
        .await
        .unwrap();
    assert_eq!(plan.steps_to_execute, vec![steps[1].id, steps[2].id, steps[3].id]);

    let jobs = env.queue.drain();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].execution_mode, ExecutionMode::Resume);

    // Only A's output ships; B's previous input is the step input.
    let injected = jobs[0].injected_outputs.clone().unwrap();
    assert_eq!(injected.len(), 1);
    assert_eq!(injected[&steps[0].id.to_string()], json!({"out": "A"}));
    assert_eq!(jobs[0].step_input, Some(json!({"in": "B"})));
}

#[tokio::test]
async fn single_step_attempt_exceeds_every_existing_attempt() {
    let env = env();
    let project = env.authoring.create_project(env.tenant, "P", "").await.unwrap();

    let s1 = step("start", "S1");
    let s2 = step("function", "S2");
    env.authoring
        .save(
            env.tenant,
            project.id,
            SaveProject {
                name: "P".into(),
                description: String::new(),
                variables: json!({}),
                steps: vec![s1.clone(), s2.clone()],
                edges: vec![edge(&s1, &s2)],
            },
        )
        .await
        .unwrap();

    let run = Run::builder()
        .tenant_id(env.tenant)
        .project_id(project.id)
        .project_version(1)
        .status(RunStatus::Failed)
        .build();
    RunRepo::create(env.store.as_ref(), &run).await.unwrap();

    for attempt in 1..=3u32 {
        let mut sr = StepRun::new_attempt(
            run.id,
            s2.id,
            "S2",
            attempt,
            json!({}),
            env.clock.now(),
        );
        sr.status = StepRunStatus::Completed;
        StepRunRepo::create(env.store.as_ref(), &sr).await.unwrap();
    }

    let next = env
        .dispatcher
        .execute_single_step(env.tenant, run.id, s2.id, None)
        .await
        .unwrap();
    assert_eq!(next.attempt, 4);

    // Again: strictly increasing against the run-wide maximum.
    let next = env
        .dispatcher
        .execute_single_step(env.tenant, run.id, s1.id, Some(json!({})))
        .await
        .unwrap();
    assert_eq!(next.attempt, 4, "attempt is computed per enqueue, not persisted here");
}
