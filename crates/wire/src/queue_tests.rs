// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::job::{ExecutionMode, RunJob};
use orq_core::{ProjectId, RunId, TenantId};
use serde_json::json;

fn job_for(tenant: TenantId, tag: u32) -> RunJob {
    RunJob {
        tenant_id: tenant,
        project_id: ProjectId::new(),
        project_version: 1,
        run_id: RunId::new(),
        input: json!({ "tag": tag }),
        execution_mode: ExecutionMode::Full,
        target_step_id: None,
        step_input: None,
        injected_outputs: None,
        project_tenant_id: None,
    }
}

#[tokio::test]
async fn enqueue_preserves_fifo_per_partition() {
    let queue = MemoryQueue::new();
    let tenant = TenantId::new();

    for tag in 0..3 {
        queue.enqueue(&job_for(tenant, tag)).await.unwrap();
    }

    let partition = tenant.to_string();
    for expected in 0..3 {
        let job = queue.pop(&partition).unwrap();
        assert_eq!(job.input["tag"], expected);
    }
    assert!(queue.pop(&partition).is_none());
}

#[tokio::test]
async fn partitions_are_independent() {
    let queue = MemoryQueue::new();
    let a = TenantId::new();
    let b = TenantId::new();

    queue.enqueue(&job_for(a, 1)).await.unwrap();
    queue.enqueue(&job_for(b, 2)).await.unwrap();

    assert_eq!(queue.len(), 2);
    assert_eq!(queue.pop(&a.to_string()).unwrap().input["tag"], 1);
    assert_eq!(queue.pop(&b.to_string()).unwrap().input["tag"], 2);
    assert!(queue.is_empty());
}

#[tokio::test]
async fn drain_empties_everything() {
    let queue = MemoryQueue::new();
    queue.enqueue(&job_for(TenantId::new(), 1)).await.unwrap();
    queue.enqueue(&job_for(TenantId::new(), 2)).await.unwrap();

    let drained = queue.drain();
    assert_eq!(drained.len(), 2);
    assert!(queue.is_empty());
}
