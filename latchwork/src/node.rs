// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Node table: per-flag registration and bidirectional edge bookkeeping.

use alloc::boxed::Box;
use core::fmt;

use hashbrown::HashMap;

use crate::flags::{Flag, FlagSet};
use crate::graph::ValidationGraph;

/// Recompute callback stored per node.
///
/// The callback receives the owning graph so it can issue re-entrant
/// [`validate`](ValidationGraph::validate) / [`invalidate`](ValidationGraph::invalidate)
/// calls. It must not register new nodes from inside the callback.
pub type ValidateFn = Box<dyn FnMut(&mut ValidationGraph)>;

/// Error returned when node registration violates a structural invariant.
///
/// These are wiring bugs in the owning subsystem, not runtime conditions;
/// registration fails loudly and leaves the graph unchanged.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AddNodeError {
    /// The node flag is zero or has more than one bit set.
    InvalidFlag {
        /// The rejected flag mask.
        flag: FlagSet,
    },
    /// A live node already owns this flag.
    DuplicateFlag {
        /// The contested flag.
        flag: Flag,
    },
    /// The dependency mask references flags with no registered node.
    UnknownDependency {
        /// The subset of the dependency mask that is unregistered.
        missing: FlagSet,
    },
    /// The dependent mask references flags with no registered node.
    UnknownDependent {
        /// The subset of the dependent mask that is unregistered.
        missing: FlagSet,
    },
}

impl fmt::Display for AddNodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidFlag { flag } => {
                write!(f, "node flag {flag:?} must have exactly one bit set")
            }
            Self::DuplicateFlag { flag } => {
                write!(f, "{flag:?} already names a live node")
            }
            Self::UnknownDependency { missing } => {
                write!(f, "dependency mask names unregistered flags {missing:?}")
            }
            Self::UnknownDependent { missing } => {
                write!(f, "dependent mask names unregistered flags {missing:?}")
            }
        }
    }
}

impl core::error::Error for AddNodeError {}

/// One registered node: its edge masks and recompute callback.
///
/// Valid/invalid state is not stored here; the graph keeps it as a single
/// mask so state transitions stay bitwise.
pub(crate) struct Node {
    /// Flags this node reads. Mirrored into each referenced node's
    /// `dependents` mask.
    pub(crate) dependencies: FlagSet,
    /// Flags that read this node. Mirrored into each referenced node's
    /// `dependencies` mask.
    pub(crate) dependents: FlagSet,
    /// `None` exactly while the callback is executing; the taken slot is the
    /// mid-callback marker the scheduler's re-entrancy guard relies on.
    pub(crate) validate: Option<ValidateFn>,
}

/// The set of registered nodes, keyed by flag.
///
/// The table stores sparse nodes in a map keyed by bit position and caches
/// the union of live flags, so membership checks never hash.
#[derive(Default)]
pub(crate) struct NodeTable {
    nodes: HashMap<Flag, Node>,
    registered: FlagSet,
}

impl NodeTable {
    pub(crate) fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            registered: FlagSet::EMPTY,
        }
    }

    /// The union of all live flags.
    pub(crate) fn registered(&self) -> FlagSet {
        self.registered
    }

    pub(crate) fn contains(&self, flag: Flag) -> bool {
        self.registered.contains(flag)
    }

    /// Registers a node, validating every structural invariant first.
    ///
    /// On success the explicit edges are mirrored into the referenced nodes:
    /// each dependency gains `flag` as a dependent and each dependent gains
    /// `flag` as a dependency, keeping both relations authoritative.
    pub(crate) fn insert(
        &mut self,
        flag: FlagSet,
        dependencies: FlagSet,
        dependents: FlagSet,
        validate: ValidateFn,
    ) -> Result<Flag, AddNodeError> {
        let Some(bit) = Flag::from_mask(flag) else {
            return Err(AddNodeError::InvalidFlag { flag });
        };
        if self.registered.contains(bit) {
            return Err(AddNodeError::DuplicateFlag { flag: bit });
        }
        let missing = dependencies & !self.registered;
        if !missing.is_empty() {
            return Err(AddNodeError::UnknownDependency { missing });
        }
        let missing = dependents & !self.registered;
        if !missing.is_empty() {
            return Err(AddNodeError::UnknownDependent { missing });
        }

        for dep in dependencies {
            self.nodes
                .get_mut(&dep)
                .expect("dependency is registered")
                .dependents
                .insert(bit);
        }
        for dependent in dependents {
            self.nodes
                .get_mut(&dependent)
                .expect("dependent is registered")
                .dependencies
                .insert(bit);
        }

        self.nodes.insert(
            bit,
            Node {
                dependencies,
                dependents,
                validate: Some(validate),
            },
        );
        self.registered.insert(bit);
        Ok(bit)
    }

    /// Removes a node and scrubs its flag from every remaining node's masks.
    ///
    /// Returns `true` if the node existed. The bidirectional mirror invariant
    /// means the removed node's own masks name exactly the nodes that
    /// reference it.
    pub(crate) fn remove(&mut self, flag: Flag) -> bool {
        let Some(node) = self.nodes.remove(&flag) else {
            return false;
        };
        self.registered.remove(flag);

        for dep in node.dependencies {
            if let Some(n) = self.nodes.get_mut(&dep) {
                n.dependents.remove(flag);
            }
        }
        for dependent in node.dependents {
            if let Some(n) = self.nodes.get_mut(&dependent) {
                n.dependencies.remove(flag);
            }
        }
        true
    }

    /// Direct dependencies of `flag`, or the empty set for an absent node.
    pub(crate) fn dependencies_of(&self, flag: Flag) -> FlagSet {
        self.nodes
            .get(&flag)
            .map_or(FlagSet::EMPTY, |n| n.dependencies)
    }

    /// Direct dependents of `flag`, or the empty set for an absent node.
    pub(crate) fn dependents_of(&self, flag: Flag) -> FlagSet {
        self.nodes
            .get(&flag)
            .map_or(FlagSet::EMPTY, |n| n.dependents)
    }

    /// Takes the node's callback out of its slot for the duration of a call.
    ///
    /// Returns `None` if the node is absent or its callback is already
    /// executing somewhere up the stack.
    pub(crate) fn take_validate(&mut self, flag: Flag) -> Option<ValidateFn> {
        self.nodes.get_mut(&flag).and_then(|n| n.validate.take())
    }

    /// Restores a callback taken with [`take_validate`](Self::take_validate).
    ///
    /// A no-op if the node was removed while its callback ran.
    pub(crate) fn restore_validate(&mut self, flag: Flag, validate: ValidateFn) {
        if let Some(n) = self.nodes.get_mut(&flag) {
            n.validate = Some(validate);
        }
    }
}
