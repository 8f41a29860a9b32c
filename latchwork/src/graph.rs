// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The validation graph: flag-keyed nodes, masked invalidation, ordered
//! revalidation.

use core::fmt;

use alloc::boxed::Box;

use crate::builder::NodeBuilder;
use crate::flags::{Flag, FlagSet};
use crate::node::{AddNodeError, NodeTable};
use crate::propagate;
use crate::schedule;
use crate::trace::InvalidationTrace;

/// A flag-based incremental validation graph.
///
/// Each registered node owns one single-bit flag and a recompute callback.
/// [`invalidate`](Self::invalidate) spreads staleness over the dependents
/// relation; [`validate`](Self::validate) recomputes exactly the stale nodes
/// in scope, dependencies first, each at most once per pass. State
/// transitions and traversals operate on plain bitmasks, so neither call
/// allocates.
///
/// The graph is single-threaded and synchronous. Callbacks may re-enter the
/// graph (`validate` / `invalidate`) but must not register nodes; callers
/// needing thread safety serialize access externally.
///
/// # Example
///
/// ```
/// use latchwork::{Flag, FlagSet, ValidationGraph};
///
/// const STYLE: Flag = Flag::new(0);
/// const LAYOUT: Flag = Flag::new(1);
///
/// let mut graph = ValidationGraph::new();
/// graph
///     .add_node(STYLE.mask(), FlagSet::EMPTY, FlagSet::EMPTY, |_| {})
///     .unwrap();
/// graph
///     .add_node(LAYOUT.mask(), STYLE.mask(), FlagSet::EMPTY, |_| {})
///     .unwrap();
///
/// // Everything starts stale; the first pass runs both callbacks.
/// assert_eq!(graph.validate_all(), STYLE.mask() | LAYOUT.mask());
///
/// // A style mutation reaches layout through the dependents relation.
/// assert_eq!(graph.invalidate(STYLE.mask()), STYLE.mask() | LAYOUT.mask());
/// assert_eq!(graph.validate(LAYOUT.mask()), STYLE.mask() | LAYOUT.mask());
/// ```
///
/// # See Also
///
/// - [`Flag`] and [`FlagSet`]: The identity and mask types.
/// - [`NodeBuilder`]: Ergonomic registration with optional valid seeding.
/// - [`InvalidationTrace`]: Observation hook for propagation.
#[derive(Default)]
pub struct ValidationGraph {
    pub(crate) table: NodeTable,
    /// One bit per registered node; set while the node's value is current.
    pub(crate) valid: FlagSet,
}

impl fmt::Debug for ValidationGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValidationGraph")
            .field("registered", &self.table.registered())
            .field("valid", &self.valid)
            .finish_non_exhaustive()
    }
}

impl ValidationGraph {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: NodeTable::new(),
            valid: FlagSet::EMPTY,
        }
    }

    /// Returns `true` if no nodes are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.registered().is_empty()
    }

    /// The set of currently registered flags.
    #[must_use]
    pub fn flags(&self) -> FlagSet {
        self.table.registered()
    }

    /// The set of registered flags that are currently invalid.
    #[must_use]
    pub fn invalid_flags(&self) -> FlagSet {
        self.table.registered() & !self.valid
    }

    /// Registers a node for `flag` with the given edges and callback.
    ///
    /// `flag` must be a single-bit mask not yet owned by a live node, and
    /// every bit of `dependencies` and `dependents` must name a registered
    /// node; violations fail with [`AddNodeError`] and leave the graph
    /// untouched. On success the edges are mirrored into the referenced
    /// nodes and the new node starts invalid.
    ///
    /// # Errors
    ///
    /// - [`AddNodeError::InvalidFlag`]: `flag` is zero or multi-bit.
    /// - [`AddNodeError::DuplicateFlag`]: a live node already owns `flag`.
    /// - [`AddNodeError::UnknownDependency`] / [`AddNodeError::UnknownDependent`]:
    ///   an edge mask names an unregistered flag.
    ///
    /// # See Also
    ///
    /// - [`node`](Self::node): Builder form with optional valid seeding.
    pub fn add_node<F>(
        &mut self,
        flag: FlagSet,
        dependencies: FlagSet,
        dependents: FlagSet,
        validate: F,
    ) -> Result<Flag, AddNodeError>
    where
        F: FnMut(&mut Self) + 'static,
    {
        self.table
            .insert(flag, dependencies, dependents, Box::new(validate))
    }

    /// Starts a builder-style registration for `flag`.
    ///
    /// See [`NodeBuilder`] for the available knobs. The terminal
    /// [`register`](NodeBuilder::register) performs the same validation as
    /// [`add_node`](Self::add_node).
    pub fn node(&mut self, flag: impl Into<FlagSet>) -> NodeBuilder<'_> {
        NodeBuilder::new(self, flag.into())
    }

    /// Removes the node named by `flag`, returning whether it existed.
    ///
    /// The flag is scrubbed from every remaining node's edge masks, and the
    /// removed flag subsequently reads as valid. Total over any mask: empty
    /// or multi-bit masks, and flags with no live node, return `false`.
    pub fn remove_node(&mut self, flag: FlagSet) -> bool {
        let Some(bit) = flag.single() else {
            return false;
        };
        if !self.table.remove(bit) {
            return false;
        }
        self.valid.remove(bit);
        true
    }

    /// Returns `true` if every registered flag in `mask` is valid.
    ///
    /// Flags without a live node are vacuously valid, so the empty mask and
    /// masks of removed or never-registered flags report `true`.
    #[must_use]
    pub fn is_valid(&self, mask: FlagSet) -> bool {
        (mask & self.table.registered() & !self.valid).is_empty()
    }

    /// Marks the nodes in `mask` and all their transitive dependents invalid.
    ///
    /// Already-invalid nodes are left untouched but still propagated
    /// through, since an earlier partial validation may have revalidated
    /// nodes downstream of them. Unregistered bits are ignored.
    ///
    /// Returns exactly the flags that flipped valid -> invalid in this call;
    /// invalidating only already-invalid nodes returns the empty set.
    pub fn invalidate(&mut self, mask: FlagSet) -> FlagSet {
        propagate::invalidate(&self.table, &mut self.valid, mask)
    }

    /// [`invalidate`](Self::invalidate) over every registered flag.
    pub fn invalidate_all(&mut self) -> FlagSet {
        self.invalidate(FlagSet::ALL)
    }

    /// [`invalidate`](Self::invalidate) with an observation hook.
    ///
    /// `trace` sees each requested root and, for every node reached during
    /// propagation, the edge it was first reached through. See
    /// [`CauseRecorder`](crate::CauseRecorder) for a ready-made sink.
    pub fn invalidate_with_trace<T>(&mut self, mask: FlagSet, trace: &mut T) -> FlagSet
    where
        T: InvalidationTrace,
    {
        propagate::invalidate_with_trace(&self.table, &mut self.valid, mask, trace)
    }

    /// Recomputes every invalid node in `mask`, dependencies first.
    ///
    /// Invalid dependencies of the requested nodes are pulled into the pass
    /// even when they are outside `mask`, so each callback observes valid
    /// inputs. Every callback runs at most once per pass and its node is
    /// marked valid immediately after it returns. Callbacks may call
    /// [`validate`](Self::validate) or [`invalidate`](Self::invalidate)
    /// re-entrantly; a nested validation composes with the enclosing pass
    /// (nothing is re-run).
    ///
    /// Returns exactly the flags this call flipped invalid -> valid.
    /// Requesting already-valid or unregistered flags contributes nothing.
    pub fn validate(&mut self, mask: FlagSet) -> FlagSet {
        schedule::validate(self, mask)
    }

    /// [`validate`](Self::validate) over every registered flag.
    pub fn validate_all(&mut self) -> FlagSet {
        self.validate(FlagSet::ALL)
    }
}
