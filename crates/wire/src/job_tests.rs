// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use orq_core::{ProjectId, RunId, StepId, TenantId};
use serde_json::json;
use std::collections::HashMap;

fn sample_job() -> RunJob {
    RunJob {
        tenant_id: TenantId::new(),
        project_id: ProjectId::new(),
        project_version: 3,
        run_id: RunId::new(),
        input: json!({"x": 1}),
        execution_mode: ExecutionMode::Full,
        target_step_id: Some(StepId::new()),
        step_input: None,
        injected_outputs: None,
        project_tenant_id: None,
    }
}

#[test]
fn encode_decode_round_trip() {
    let job = sample_job();
    let bytes = encode(&job).unwrap();
    let decoded = decode(&bytes).unwrap();
    assert_eq!(decoded, job);
}

#[test]
fn optional_fields_are_omitted() {
    let job = sample_job();
    let value: serde_json::Value = serde_json::from_slice(&encode(&job).unwrap()).unwrap();
    let obj = value.as_object().unwrap();
    assert!(!obj.contains_key("step_input"));
    assert!(!obj.contains_key("injected_outputs"));
    assert!(!obj.contains_key("project_tenant_id"));
}

#[test]
fn execution_mode_wire_names() {
    assert_eq!(serde_json::to_value(ExecutionMode::Full).unwrap(), "full");
    assert_eq!(serde_json::to_value(ExecutionMode::SingleStep).unwrap(), "single_step");
    assert_eq!(serde_json::to_value(ExecutionMode::Resume).unwrap(), "resume");
}

#[test]
fn injected_outputs_key_by_step_id_string() {
    let step = StepId::new();
    let mut outputs = HashMap::new();
    outputs.insert(step.to_string(), json!({"rows": 42}));

    let mut job = sample_job();
    job.execution_mode = ExecutionMode::Resume;
    job.injected_outputs = Some(outputs);

    let decoded = decode(&encode(&job).unwrap()).unwrap();
    let outputs = decoded.injected_outputs.unwrap();
    assert_eq!(outputs[&step.to_string()], json!({"rows": 42}));
}

#[test]
fn decode_rejects_garbage() {
    assert!(decode(b"not json").is_err());
}

#[test]
fn partition_is_tenant_scoped() {
    let job = sample_job();
    assert_eq!(job.partition(), job.tenant_id.to_string());
}
