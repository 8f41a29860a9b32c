// Copyright 2026 the Latchwork Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flag assignment for owned or structured names.
//!
//! Flag constants are normally owned by the embedder (`const LAYOUT: Flag =
//! Flag::new(1)`). Embedders whose derivable values are discovered at
//! runtime — style property names, plugin-defined channels — instead need to
//! *allocate* bit positions. This module provides a small `no_std + alloc`
//! interner that maps owned keys to [`Flag`]s in first-come bit order.
//!
//! Because a [`FlagSet`](crate::FlagSet) holds at most 64 flags, interning
//! surfaces the capacity limit as a loud [`FlagsExhausted`] error instead of
//! silently wrapping.
//!
//! ## Example
//!
//! ```rust
//! use latchwork::{intern::FlagInterner, FlagSet, ValidationGraph};
//!
//! let mut names = FlagInterner::<&'static str>::new();
//! let style = names.intern("style").unwrap();
//! let layout = names.intern("layout").unwrap();
//!
//! let mut graph = ValidationGraph::new();
//! graph.add_node(style.mask(), FlagSet::EMPTY, FlagSet::EMPTY, |_| {}).unwrap();
//! graph.add_node(layout.mask(), style.mask(), FlagSet::EMPTY, |_| {}).unwrap();
//!
//! // Interning an equal key returns the existing flag.
//! assert_eq!(names.intern("style").unwrap(), style);
//!
//! // Best-effort debug lookup:
//! assert_eq!(names.get(layout), Some(&"layout"));
//! ```

use alloc::vec::Vec;
use core::fmt;
use core::hash::{BuildHasher, Hash};

use hashbrown::DefaultHashBuilder;
use hashbrown::HashMap;

use crate::flags::{Flag, FlagSet};

/// Error returned when all 64 flag bits have been assigned.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct FlagsExhausted;

impl fmt::Display for FlagsExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "all 64 flag bits are already assigned")
    }
}

impl core::error::Error for FlagsExhausted {}

/// Interns owned keys into [`Flag`]s, one bit per distinct key.
///
/// Keys are stored once in an internal table indexed by bit position.
/// Lookups use a hash-bucket index (hash -> small list of candidate flags)
/// to avoid storing duplicate key copies.
#[derive(Debug, Clone)]
pub struct FlagInterner<K> {
    keys: Vec<K>,
    buckets: HashMap<u64, Vec<Flag>>,
    build_hasher: DefaultHashBuilder,
}

impl<K> Default for FlagInterner<K>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> FlagInterner<K>
where
    K: Eq + Hash,
{
    /// Creates an empty interner.
    #[must_use]
    pub fn new() -> Self {
        Self {
            keys: Vec::new(),
            buckets: HashMap::new(),
            build_hasher: DefaultHashBuilder::default(),
        }
    }

    /// Returns the number of assigned flags.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns `true` if no flags have been assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The set of all assigned flags.
    #[must_use]
    pub fn flags(&self) -> FlagSet {
        if self.keys.is_empty() {
            FlagSet::EMPTY
        } else {
            FlagSet::from_bits((u64::MAX) >> (64 - self.keys.len()))
        }
    }

    /// Returns the key for an assigned flag, if any.
    #[must_use]
    pub fn get(&self, flag: Flag) -> Option<&K> {
        self.keys.get(flag.index() as usize)
    }

    /// Returns the flag previously assigned to `key`, without assigning one.
    #[must_use]
    pub fn flag_of(&self, key: &K) -> Option<Flag> {
        let hash = self.hash(key);
        let ids = self.buckets.get(&hash)?;
        ids.iter()
            .copied()
            .find(|&flag| &self.keys[flag.index() as usize] == key)
    }

    /// Interns `key` and returns its [`Flag`].
    ///
    /// If an equal key was already interned, this returns the existing flag
    /// and drops `key`.
    ///
    /// # Errors
    ///
    /// [`FlagsExhausted`] once all 64 bits are assigned; the interner is
    /// unchanged.
    pub fn intern(&mut self, key: K) -> Result<Flag, FlagsExhausted> {
        let hash = self.hash(&key);
        if let Some(ids) = self.buckets.get(&hash) {
            for &flag in ids {
                if self.keys[flag.index() as usize] == key {
                    return Ok(flag);
                }
            }
        }

        if self.keys.len() >= 64 {
            return Err(FlagsExhausted);
        }
        #[expect(clippy::cast_possible_truncation, reason = "len < 64")]
        let flag = Flag::new(self.keys.len() as u8);
        self.keys.push(key);
        self.buckets.entry(hash).or_default().push(flag);
        Ok(flag)
    }

    fn hash<Q>(&self, key: &Q) -> u64
    where
        Q: Hash + ?Sized,
    {
        self.build_hasher.hash_one(key)
    }
}
