// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::clock::{Clock, FakeClock};
use yare::parameterized;

#[test]
fn lifecycle_pending_running_completed() {
    let clock = FakeClock::new();
    let mut run = Run::builder().build();
    assert_eq!(run.status, RunStatus::Pending);

    run.start(clock.now());
    assert_eq!(run.status, RunStatus::Running);
    assert!(run.started_at.is_some());

    run.complete(clock.now());
    assert_eq!(run.status, RunStatus::Completed);
    assert!(run.is_terminal());
}

#[test]
fn start_is_idempotent_once_running() {
    let clock = FakeClock::new();
    let mut run = Run::builder().build();
    run.start(clock.now());
    let started = run.started_at;

    clock.advance(std::time::Duration::from_secs(10));
    run.start(clock.now());
    assert_eq!(run.started_at, started);
}

#[parameterized(
    pending = { RunStatus::Pending },
    running = { RunStatus::Running },
)]
fn cancel_accepted_while_live(status: RunStatus) {
    let clock = FakeClock::new();
    let mut run = Run::builder().status(status).build();
    run.cancel(clock.now()).unwrap();
    assert_eq!(run.status, RunStatus::Cancelled);
    assert!(run.finished_at.is_some());
}

#[parameterized(
    completed = { RunStatus::Completed },
    failed = { RunStatus::Failed },
    cancelled = { RunStatus::Cancelled },
)]
fn cancel_rejected_when_terminal(status: RunStatus) {
    let clock = FakeClock::new();
    let mut run = Run::builder().status(status).build();
    let err = run.cancel(clock.now()).unwrap_err();
    assert!(matches!(err, crate::Error::RunNotCancellable(_)));
    assert_eq!(run.status, status);
}

#[test]
fn version_zero_is_the_draft_sentinel() {
    let run = Run::builder().project_version(VERSION_CURRENT_DRAFT).build();
    assert_eq!(run.project_version, 0);
}

#[test]
fn triggered_by_serializes_snake_case() {
    let json = serde_json::to_value(TriggeredBy::Webhook).unwrap();
    assert_eq!(json, "webhook");
}
