// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Explainability helpers for invalidation.
//!
//! The graph intentionally stores no provenance for why a flag became
//! invalid. For many embedders it is useful to answer questions like:
//! "why is layout stale this frame?".
//!
//! This module provides a minimal, additive hook:
//! [`ValidationGraph::invalidate_with_trace`](crate::ValidationGraph::invalidate_with_trace),
//! plus a small recorder, [`CauseRecorder`], which stores **one plausible
//! cause path** per flag (a spanning forest over the propagation edges).

use alloc::vec::Vec;

use crate::flags::{Flag, FlagSet};

/// The recorded cause of invalidity for a flag.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InvalidCause {
    /// The flag was named in the invalidation mask (a root).
    Root,
    /// The flag was reached because it depends on `because`.
    Because {
        /// The immediate upstream flag propagation came through.
        because: Flag,
    },
}

/// A callback sink for invalidation tracing.
///
/// See [`ValidationGraph::invalidate_with_trace`](crate::ValidationGraph::invalidate_with_trace).
pub trait InvalidationTrace {
    /// Called for each registered root flag in the invalidation mask.
    ///
    /// `newly_invalid` indicates whether the flag actually flipped, or was
    /// already invalid.
    fn root(&mut self, flag: Flag, newly_invalid: bool);

    /// Called when `flag` is first reached from `because` during propagation.
    ///
    /// `newly_invalid` indicates whether `flag` actually flipped, or was
    /// already invalid.
    fn caused_by(&mut self, flag: Flag, because: Flag, newly_invalid: bool);
}

/// Records one parent pointer per invalidated flag (a spanning forest).
///
/// When a flag has multiple possible upstream causes, the first one observed
/// wins.
///
/// # Example
///
/// ```
/// use latchwork::{CauseRecorder, Flag, FlagSet, ValidationGraph};
///
/// const STYLE: Flag = Flag::new(0);
/// const LAYOUT: Flag = Flag::new(1);
/// const PAINT: Flag = Flag::new(2);
///
/// let mut graph = ValidationGraph::new();
/// graph.add_node(STYLE.mask(), FlagSet::EMPTY, FlagSet::EMPTY, |_| {}).unwrap();
/// graph.add_node(LAYOUT.mask(), STYLE.mask(), FlagSet::EMPTY, |_| {}).unwrap();
/// graph.add_node(PAINT.mask(), LAYOUT.mask(), FlagSet::EMPTY, |_| {}).unwrap();
/// graph.validate_all();
///
/// let mut recorder = CauseRecorder::new();
/// graph.invalidate_with_trace(STYLE.mask(), &mut recorder);
///
/// assert_eq!(recorder.explain_path(PAINT).unwrap(), [STYLE, LAYOUT, PAINT]);
/// ```
#[derive(Debug, Clone)]
pub struct CauseRecorder {
    /// One slot per bit position; flat-indexed like the graph itself.
    causes: [Option<InvalidCause>; 64],
}

impl Default for CauseRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl CauseRecorder {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self { causes: [None; 64] }
    }

    /// Clears all recorded causes.
    pub fn clear(&mut self) {
        self.causes = [None; 64];
    }

    /// Returns the recorded cause for `flag`, if any.
    #[must_use]
    pub fn cause(&self, flag: Flag) -> Option<InvalidCause> {
        self.causes[flag.index() as usize]
    }

    /// Returns one plausible path from an invalidation root to `flag`.
    ///
    /// The returned vector is ordered from root to `flag` (inclusive).
    #[must_use]
    pub fn explain_path(&self, flag: Flag) -> Option<Vec<Flag>> {
        let mut out = Vec::new();
        let mut seen = FlagSet::EMPTY;

        let mut current = flag;
        loop {
            if seen.contains(current) {
                return None;
            }
            seen.insert(current);
            out.push(current);

            match self.cause(current)? {
                InvalidCause::Root => break,
                InvalidCause::Because { because } => current = because,
            }
        }

        out.reverse();
        Some(out)
    }
}

impl InvalidationTrace for CauseRecorder {
    fn root(&mut self, flag: Flag, _newly_invalid: bool) {
        self.causes[flag.index() as usize].get_or_insert(InvalidCause::Root);
    }

    fn caused_by(&mut self, flag: Flag, because: Flag, _newly_invalid: bool) {
        self.causes[flag.index() as usize].get_or_insert(InvalidCause::Because { because });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ValidationGraph;

    const ONE: Flag = Flag::new(0);
    const TWO: Flag = Flag::new(1);
    const THREE: Flag = Flag::new(2);

    /// ONE <- TWO <- THREE.
    fn chain() -> ValidationGraph {
        let mut graph = ValidationGraph::new();
        graph
            .add_node(ONE.mask(), FlagSet::EMPTY, FlagSet::EMPTY, |_| {})
            .unwrap();
        graph
            .add_node(TWO.mask(), ONE.mask(), FlagSet::EMPTY, |_| {})
            .unwrap();
        graph
            .add_node(THREE.mask(), TWO.mask(), FlagSet::EMPTY, |_| {})
            .unwrap();
        graph
    }

    #[test]
    fn records_one_parent_path() {
        let mut graph = chain();
        graph.validate_all();

        let mut rec = CauseRecorder::new();
        let changed = graph.invalidate_with_trace(ONE.mask(), &mut rec);

        assert_eq!(changed, ONE.mask() | TWO.mask() | THREE.mask());
        assert_eq!(rec.cause(ONE), Some(InvalidCause::Root));
        assert_eq!(rec.explain_path(THREE).unwrap(), [ONE, TWO, THREE]);
    }

    #[test]
    fn first_observed_cause_wins() {
        let mut graph = chain();
        graph.validate_all();

        let mut rec = CauseRecorder::new();
        // TWO is both a root and a dependent of ONE; the root report arrives
        // first.
        graph.invalidate_with_trace(ONE.mask() | TWO.mask(), &mut rec);

        assert_eq!(rec.cause(TWO), Some(InvalidCause::Root));
        assert_eq!(rec.explain_path(TWO).unwrap(), [TWO]);
    }

    #[test]
    fn unreached_flags_have_no_cause() {
        let mut graph = chain();
        graph.validate_all();

        let mut rec = CauseRecorder::new();
        graph.invalidate_with_trace(TWO.mask(), &mut rec);

        assert_eq!(rec.cause(ONE), None);
        assert!(rec.explain_path(ONE).is_none());

        rec.clear();
        assert_eq!(rec.cause(TWO), None);
    }

    #[test]
    fn reports_already_invalid_flags() {
        struct Flips(FlagSet);
        impl InvalidationTrace for Flips {
            fn root(&mut self, flag: Flag, newly_invalid: bool) {
                if newly_invalid {
                    self.0.insert(flag);
                }
            }
            fn caused_by(&mut self, flag: Flag, _because: Flag, newly_invalid: bool) {
                if newly_invalid {
                    self.0.insert(flag);
                }
            }
        }

        let mut graph = chain();
        graph.validate(ONE.mask() | TWO.mask());

        // THREE is still invalid; only ONE and TWO flip.
        let mut flips = Flips(FlagSet::EMPTY);
        let changed = graph.invalidate_with_trace(ONE.mask(), &mut flips);
        assert_eq!(changed, ONE.mask() | TWO.mask());
        assert_eq!(flips.0, changed);
    }
}
