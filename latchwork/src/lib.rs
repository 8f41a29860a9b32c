// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Latchwork: a flag-based incremental validation graph.
//!
//! This crate provides the invalidation engine underneath retained-mode UI
//! runtimes, where every derived per-node value — layout, concatenated
//! transform, resolved style, draw order — is named by a single-bit flag and
//! recomputed at most once per change. It models the engine as:
//!
//! - **Flags and masks** ([`Flag`], [`FlagSet`]): Single-bit identities and
//!   their bitwise unions, the currency of every operation.
//! - **A validation graph** ([`ValidationGraph`]): One node per flag, each
//!   with dependency/dependent edge masks and a recompute callback.
//!   [`invalidate`](ValidationGraph::invalidate) fans staleness out to
//!   dependents; [`validate`](ValidationGraph::validate) recomputes the
//!   stale subgraph dependencies-first.
//! - **Builder registration** ([`NodeBuilder`]): Declarative wiring with
//!   optional valid seeding.
//! - **Flag interning** ([`intern::FlagInterner`]): Bit assignment for
//!   embedders whose derivable values are discovered at runtime.
//! - **Explainability** ([`InvalidationTrace`], [`CauseRecorder`]): An
//!   additive hook answering "why is this flag stale?".
//!
//! ## Quick Start
//!
//! ```rust
//! use latchwork::{Flag, FlagSet, ValidationGraph};
//!
//! const STYLE: Flag = Flag::new(0);
//! const LAYOUT: Flag = Flag::new(1);
//! const PAINT: Flag = Flag::new(2);
//!
//! let mut graph = ValidationGraph::new();
//! graph.node(STYLE).register(|_| { /* resolve style */ }).unwrap();
//! graph
//!     .node(LAYOUT)
//!     .depends_on(STYLE)
//!     .register(|_| { /* measure and arrange */ })
//!     .unwrap();
//! graph
//!     .node(PAINT)
//!     .depends_on(LAYOUT)
//!     .register(|_| { /* rebuild display list */ })
//!     .unwrap();
//!
//! // First frame: everything is stale and runs once, dependencies first.
//! assert_eq!(graph.validate_all(), STYLE.mask() | LAYOUT.mask() | PAINT.mask());
//!
//! // A style mutation invalidates the dependent closure...
//! graph.invalidate(STYLE.mask());
//!
//! // ...and the next frame recomputes exactly the stale flags.
//! assert_eq!(
//!     graph.validate_all(),
//!     STYLE.mask() | LAYOUT.mask() | PAINT.mask(),
//! );
//! assert_eq!(graph.validate_all(), FlagSet::EMPTY);
//! ```
//!
//! ## Re-entrancy
//!
//! A node's callback receives the graph and may call
//! [`validate`](ValidationGraph::validate) or
//! [`invalidate`](ValidationGraph::invalidate) on it re-entrantly — for
//! example to force an out-of-band dependency to resolve early. Nested calls
//! are ordinary recursion: already-valid nodes are skipped, so nothing runs
//! twice and pathological cycles terminate. Callbacks must not register new
//! nodes.
//!
//! ## Capacity
//!
//! A [`FlagSet`] is a `u64`, so one graph holds at most 64 nodes. This is a
//! hard limit by design: it keeps every set operation a single bitwise
//! instruction and the whole engine allocation-free outside registration.
//! Owners needing more derived values partition them across graphs.
//!
//! ## Threading
//!
//! The graph is single-threaded and synchronous: every operation runs to
//! completion on the calling thread, and there is no locking. Confine each
//! graph to the thread that owns it.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. It does not depend on `std`.
//!
//! ## Features
//!
//! This crate currently has no optional features. All functionality is
//! always available.

#![no_std]

extern crate alloc;

mod builder;
mod flags;
mod graph;
pub mod intern;
mod node;
mod propagate;
mod schedule;
mod trace;

pub use builder::NodeBuilder;
pub use flags::{Flag, FlagSet, FlagSetIter};
pub use graph::ValidationGraph;
pub use node::{AddNodeError, ValidateFn};
pub use trace::{CauseRecorder, InvalidCause, InvalidationTrace};
