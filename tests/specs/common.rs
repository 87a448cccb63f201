// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared fixture: every service wired over one in-memory store and queue.

use orq_core::{Edge, FakeClock, Step, TenantId};
use orq_engine::{Authoring, Dispatcher, VersionStore, WebhookTrigger};
use orq_storage::MemoryStore;
use orq_wire::MemoryQueue;
use std::sync::Arc;

pub struct Env {
    pub store: Arc<MemoryStore>,
    pub queue: Arc<MemoryQueue>,
    pub clock: FakeClock,
    pub authoring: Authoring<FakeClock>,
    pub dispatcher: Dispatcher<FakeClock>,
    pub webhooks: WebhookTrigger<FakeClock>,
    pub tenant: TenantId,
}

pub fn env() -> Env {
    let store = Arc::new(MemoryStore::new());
    let queue = Arc::new(MemoryQueue::new());
    let clock = FakeClock::new();

    let authoring = Authoring::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        VersionStore::new(store.clone()),
        Some(store.clone()),
        clock.clone(),
    );
    let dispatcher = Dispatcher::new(
        store.clone(),
        store.clone(),
        store.clone(),
        VersionStore::new(store.clone()),
        store.clone(),
        store.clone(),
        Some(store.clone()),
        queue.clone(),
        clock.clone(),
    );
    let webhooks = WebhookTrigger::new(
        store.clone(),
        store.clone(),
        store.clone(),
        queue.clone(),
        clock.clone(),
    );

    Env { store, queue, clock, authoring, dispatcher, webhooks, tenant: TenantId::new() }
}

/// A step for save payloads.
pub fn step(step_type: &str, name: &str) -> Step {
    Step::builder().step_type(step_type).name(name).build()
}

/// Step-to-step edge on default ports.
pub fn edge(source: &Step, target: &Step) -> Edge {
    Edge::builder().source_step_id(source.id).target_step_id(target.id).build()
}
