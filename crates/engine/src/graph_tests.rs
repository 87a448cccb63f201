// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use orq_core::{Edge, StepId};

fn edge(source: StepId, target: StepId) -> Edge {
    Edge::builder().source_step_id(source).target_step_id(target).build()
}

#[test]
fn would_cycle_detects_back_edge() {
    let (a, b, c) = (StepId::new(), StepId::new(), StepId::new());
    let edges = vec![edge(a, b), edge(b, c)];

    // c -> a closes the loop a -> b -> c -> a.
    assert!(would_cycle(&edges, c, a));
    // a -> c is a forward shortcut, no cycle.
    assert!(!would_cycle(&edges, a, c));
}

#[test]
fn would_cycle_rejects_self_edge() {
    let a = StepId::new();
    assert!(would_cycle(&[], a, a));
}

#[test]
fn has_cycle_on_straight_line() {
    let (a, b, c) = (StepId::new(), StepId::new(), StepId::new());
    assert!(!has_cycle(&[edge(a, b), edge(b, c)]));
}

#[test]
fn has_cycle_on_loop() {
    let (a, b, c) = (StepId::new(), StepId::new(), StepId::new());
    assert!(has_cycle(&[edge(a, b), edge(b, c), edge(c, a)]));
}

#[test]
fn has_cycle_ignores_group_edges() {
    let (a, b) = (StepId::new(), StepId::new());
    let group_edge = Edge::builder()
        .source_step_id(a)
        .target_block_group_id(orq_core::BlockGroupId::new())
        .build();
    assert!(!has_cycle(&[edge(a, b), group_edge]));
}

#[test]
fn has_cycle_diamond_is_fine() {
    // a -> b, a -> c, b -> d, c -> d: two paths converge without a cycle.
    let (a, b, c, d) = (StepId::new(), StepId::new(), StepId::new(), StepId::new());
    assert!(!has_cycle(&[edge(a, b), edge(a, c), edge(b, d), edge(c, d)]));
}

#[test]
fn forward_closure_collects_reachable() {
    let (a, b, c, d) = (StepId::new(), StepId::new(), StepId::new(), StepId::new());
    let edges = vec![edge(a, b), edge(b, c), edge(c, d)];

    let closure = forward_closure(&edges, b);
    assert_eq!(closure, vec![b, c, d]);

    let closure = forward_closure(&edges, d);
    assert_eq!(closure, vec![d]);
}

#[test]
fn forward_closure_handles_branches() {
    let (a, b, c, d) = (StepId::new(), StepId::new(), StepId::new(), StepId::new());
    let edges = vec![edge(a, b), edge(a, c), edge(c, d)];

    let closure = forward_closure(&edges, a);
    assert_eq!(closure.len(), 4);
    assert_eq!(closure[0], a);
    assert!(closure.contains(&b) && closure.contains(&c) && closure.contains(&d));
}

#[test]
fn adjacency_skips_group_endpoints() {
    let (a, b) = (StepId::new(), StepId::new());
    let group_edge = Edge::builder()
        .source_block_group_id(orq_core::BlockGroupId::new())
        .target_step_id(b)
        .build();
    let adjacency = step_adjacency(&[edge(a, b), group_edge]);
    assert_eq!(adjacency.len(), 1);
    assert_eq!(adjacency[&a], vec![b]);
}
