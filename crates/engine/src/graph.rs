// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adjacency helpers over the step subgraph.
//!
//! Steps and edges are stored flatly; cycle checks build adjacency maps on
//! the fly so no cyclic object graph is ever held.

use orq_core::{Edge, StepId};
use std::collections::{HashMap, HashSet, VecDeque};

/// Step-to-step adjacency. Edges touching block groups are ignored: group
/// boundaries cannot form step cycles.
pub fn step_adjacency(edges: &[Edge]) -> HashMap<StepId, Vec<StepId>> {
    let mut adjacency: HashMap<StepId, Vec<StepId>> = HashMap::new();
    for edge in edges {
        if let (Some(source), Some(target)) = (edge.source_step_id, edge.target_step_id) {
            adjacency.entry(source).or_default().push(target);
        }
    }
    adjacency
}

/// Would adding source -> target close a cycle? DFS from `target`: a path
/// back to `source` means the candidate edge completes a loop.
pub fn would_cycle(edges: &[Edge], source: StepId, target: StepId) -> bool {
    if source == target {
        return true;
    }
    let adjacency = step_adjacency(edges);
    let mut stack = vec![target];
    let mut seen = HashSet::new();
    while let Some(node) = stack.pop() {
        if node == source {
            return true;
        }
        if !seen.insert(node) {
            continue;
        }
        if let Some(next) = adjacency.get(&node) {
            stack.extend(next.iter().copied());
        }
    }
    false
}

/// True when the step subgraph already contains a cycle.
pub fn has_cycle(edges: &[Edge]) -> bool {
    let adjacency = step_adjacency(edges);

    // Iterative DFS with colors: 0 unvisited, 1 in progress, 2 done.
    let mut color: HashMap<StepId, u8> = HashMap::new();
    for &start in adjacency.keys() {
        if color.get(&start).copied().unwrap_or(0) != 0 {
            continue;
        }
        let mut stack = vec![(start, false)];
        while let Some((node, children_done)) = stack.pop() {
            if children_done {
                color.insert(node, 2);
                continue;
            }
            match color.get(&node).copied().unwrap_or(0) {
                1 => continue,
                2 => continue,
                _ => {}
            }
            color.insert(node, 1);
            stack.push((node, true));
            for &next in adjacency.get(&node).into_iter().flatten() {
                match color.get(&next).copied().unwrap_or(0) {
                    1 => return true,
                    0 => stack.push((next, false)),
                    _ => {}
                }
            }
        }
    }
    false
}

/// BFS forward closure: `from` plus every step reachable from it.
///
/// Used by resume-from-step to decide which steps re-execute.
pub fn forward_closure(edges: &[Edge], from: StepId) -> Vec<StepId> {
    let adjacency = step_adjacency(edges);
    let mut queue = VecDeque::from([from]);
    let mut seen = HashSet::from([from]);
    let mut order = vec![from];
    while let Some(node) = queue.pop_front() {
        for &next in adjacency.get(&node).into_iter().flatten() {
            if seen.insert(next) {
                order.push(next);
                queue.push_back(next);
            }
        }
    }
    order
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
