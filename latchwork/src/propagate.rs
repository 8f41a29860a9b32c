// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invalidation propagation over the dependents relation.

use crate::flags::FlagSet;
use crate::node::NodeTable;
use crate::trace::InvalidationTrace;

/// Flips every node reachable over the dependents relation to invalid.
///
/// Starting from the registered flags in `mask`, walks the transitive
/// closure of dependent edges breadth-first. Propagation continues through
/// nodes that are already invalid (their dependents may have been validated
/// since), but each node is visited at most once per call, which makes
/// diamond- and cycle-shaped dependent graphs loop-safe.
///
/// Returns exactly the flags that flipped valid -> invalid.
pub(crate) fn invalidate(table: &NodeTable, valid: &mut FlagSet, mask: FlagSet) -> FlagSet {
    let mut reached = mask & table.registered();
    let mut frontier = reached;
    while !frontier.is_empty() {
        let mut next = FlagSet::EMPTY;
        for flag in frontier {
            next |= table.dependents_of(flag);
        }
        frontier = next & !reached;
        reached |= frontier;
    }

    let changed = reached & *valid;
    *valid &= !reached;
    changed
}

/// [`invalidate`] with an observation hook for each root and propagation edge.
///
/// `trace` sees every registered root in `mask` and, for each node first
/// reached during this call, the edge it was reached through. The
/// `newly_invalid` argument tells the sink whether the node actually flipped.
pub(crate) fn invalidate_with_trace(
    table: &NodeTable,
    valid: &mut FlagSet,
    mask: FlagSet,
    trace: &mut dyn InvalidationTrace,
) -> FlagSet {
    let roots = mask & table.registered();
    for flag in roots {
        trace.root(flag, valid.contains(flag));
    }

    let mut reached = roots;
    let mut frontier = roots;
    while !frontier.is_empty() {
        let mut next = FlagSet::EMPTY;
        for flag in frontier {
            let fresh = table.dependents_of(flag) & !reached & !next;
            for dependent in fresh {
                trace.caused_by(dependent, flag, valid.contains(dependent));
            }
            next |= fresh;
        }
        frontier = next;
        reached |= next;
    }

    let changed = reached & *valid;
    *valid &= !reached;
    changed
}
