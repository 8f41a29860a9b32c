// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Builder-based node registration.
//!
//! [`ValidationGraph::add_node`] takes every edge mask positionally. For
//! owners wiring more than a couple of nodes, the builder form reads closer
//! to the dependency declaration it encodes, and it is the only way to seed
//! a node valid at registration (for values that are already current when
//! the node is wired in).

use core::fmt;

use crate::flags::{Flag, FlagSet};
use crate::graph::ValidationGraph;
use crate::node::AddNodeError;

/// A builder that configures and performs one node registration.
///
/// Construct this via [`ValidationGraph::node`].
///
/// # Example
///
/// ```
/// use latchwork::{Flag, ValidationGraph};
///
/// const STYLE: Flag = Flag::new(0);
/// const LAYOUT: Flag = Flag::new(1);
/// const PAINT: Flag = Flag::new(2);
///
/// let mut graph = ValidationGraph::new();
/// graph.node(STYLE).register(|_| {}).unwrap();
/// graph.node(LAYOUT).depends_on(STYLE).register(|_| {}).unwrap();
/// graph
///     .node(PAINT)
///     .depends_on(LAYOUT)
///     .register(|_| {})
///     .unwrap();
///
/// assert_eq!(graph.validate(PAINT.mask()).len(), 3);
/// ```
pub struct NodeBuilder<'g> {
    graph: &'g mut ValidationGraph,
    flag: FlagSet,
    dependencies: FlagSet,
    dependents: FlagSet,
    seed_valid: bool,
}

impl fmt::Debug for NodeBuilder<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeBuilder")
            .field("flag", &self.flag)
            .field("dependencies", &self.dependencies)
            .field("dependents", &self.dependents)
            .field("seed_valid", &self.seed_valid)
            .finish_non_exhaustive()
    }
}

impl<'g> NodeBuilder<'g> {
    pub(crate) fn new(graph: &'g mut ValidationGraph, flag: FlagSet) -> Self {
        Self {
            graph,
            flag,
            dependencies: FlagSet::EMPTY,
            dependents: FlagSet::EMPTY,
            seed_valid: false,
        }
    }

    /// Adds flags this node reads to its dependency mask.
    #[must_use]
    pub fn depends_on(mut self, mask: impl Into<FlagSet>) -> Self {
        self.dependencies |= mask.into();
        self
    }

    /// Adds flags that read this node to its dependent mask.
    #[must_use]
    pub fn required_by(mut self, mask: impl Into<FlagSet>) -> Self {
        self.dependents |= mask.into();
        self
    }

    /// Registers the node as already valid.
    ///
    /// Use this when the derived value is current at wiring time; the node's
    /// callback will first run after the next invalidation reaches it.
    #[must_use]
    pub fn seeded_valid(mut self) -> Self {
        self.seed_valid = true;
        self
    }

    /// Performs the registration.
    ///
    /// # Errors
    ///
    /// Exactly the [`ValidationGraph::add_node`] errors; a failed
    /// registration leaves the graph untouched.
    pub fn register<F>(self, validate: F) -> Result<Flag, AddNodeError>
    where
        F: FnMut(&mut ValidationGraph) + 'static,
    {
        let flag = self
            .graph
            .add_node(self.flag, self.dependencies, self.dependents, validate)?;
        if self.seed_valid {
            self.graph.valid.insert(flag);
        }
        Ok(flag)
    }
}
