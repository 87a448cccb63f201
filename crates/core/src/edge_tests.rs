// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::block_group::BlockGroupId;
use crate::step::StepId;

#[test]
fn step_endpoints_resolve() {
    let source = StepId::new();
    let target = StepId::new();
    let edge = Edge::builder().source_step_id(source).target_step_id(target).build();

    assert_eq!(edge.source().unwrap(), Endpoint::Step(source));
    assert_eq!(edge.target().unwrap(), Endpoint::Step(target));
    assert!(!edge.is_self_loop());
}

#[test]
fn group_endpoint_resolves() {
    let group = BlockGroupId::new();
    let edge = Edge::builder()
        .source_step_id(StepId::new())
        .target_block_group_id(group)
        .target_port(GROUP_INPUT_PORT)
        .build();

    assert_eq!(edge.target().unwrap(), Endpoint::Group(group));
}

#[test]
fn both_set_is_invalid() {
    let edge = Edge::builder()
        .source_step_id(StepId::new())
        .source_block_group_id(BlockGroupId::new())
        .target_step_id(StepId::new())
        .build();

    assert!(edge.source().is_err());
}

#[test]
fn neither_set_is_invalid() {
    let edge = Edge::builder().target_step_id(StepId::new()).build();
    assert!(edge.source().is_err());
}

#[test]
fn self_loop_on_step() {
    let step = StepId::new();
    let edge = Edge::builder().source_step_id(step).target_step_id(step).build();
    assert!(edge.is_self_loop());
}

#[test]
fn self_loop_on_group() {
    let group = BlockGroupId::new();
    let edge = Edge::builder()
        .source_block_group_id(group)
        .target_block_group_id(group)
        .build();
    assert!(edge.is_self_loop());
}

#[test]
fn step_to_group_same_project_is_not_self_loop() {
    let edge = Edge::builder()
        .source_step_id(StepId::new())
        .target_block_group_id(BlockGroupId::new())
        .build();
    assert!(!edge.is_self_loop());
}
