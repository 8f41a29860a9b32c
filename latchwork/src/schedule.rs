// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dependency-ordered validation scheduling.

use crate::flags::{Flag, FlagSet};
use crate::graph::ValidationGraph;

/// Runs the callbacks of every invalid node in `mask`, dependencies first.
///
/// Each requested flag is resolved by a depth-first walk into its invalid
/// dependencies, so a node's callback only runs once everything it reads is
/// valid. Validity is re-checked immediately before each callback rather
/// than pre-snapshotted: a callback that invalidates a flag scheduled later
/// in the same pass still gets that flag recomputed, and a nested
/// [`validate`](ValidationGraph::validate) issued from inside a callback
/// leaves nothing for the outer pass to re-run.
///
/// Returns exactly the flags this call flipped invalid -> valid.
pub(crate) fn validate(graph: &mut ValidationGraph, mask: FlagSet) -> FlagSet {
    let mut visiting = FlagSet::EMPTY;
    let mut validated = FlagSet::EMPTY;
    for flag in mask & graph.table.registered() {
        validate_flag(graph, flag, &mut visiting, &mut validated);
    }
    validated
}

fn validate_flag(
    graph: &mut ValidationGraph,
    flag: Flag,
    visiting: &mut FlagSet,
    validated: &mut FlagSet,
) {
    // Revisiting a flag on the active traversal stack would recurse forever
    // on a cycle of invalid nodes; skipping it is the termination rule.
    if graph.valid.contains(flag) || visiting.contains(flag) || !graph.table.contains(flag) {
        return;
    }

    visiting.insert(flag);
    let dependencies = graph.table.dependencies_of(flag);
    for dep in dependencies & !graph.valid {
        validate_flag(graph, dep, visiting, validated);
    }
    visiting.remove(flag);

    // A dependency's callback may have validated this flag through a nested
    // call, or removed it outright.
    if graph.valid.contains(flag) || !graph.table.contains(flag) {
        return;
    }

    let Some(mut callback) = graph.table.take_validate(flag) else {
        // The callback is executing somewhere up the stack: a nested call
        // looped back into a node mid-callback.
        debug_assert!(
            false,
            "validate re-entered a node whose callback is still running"
        );
        return;
    };
    callback(graph);
    graph.table.restore_validate(flag, callback);

    if graph.table.contains(flag) {
        graph.valid.insert(flag);
        validated.insert(flag);
    }
}
