//! Key collection, normalization, and deduplication.
//!
//! The collector is the build phase's front door: raw keys come in, get
//! classified by shape, lowercased, hashed, and deduplicated, and leave as
//! three clean key sets ready for table construction. All of its storage is
//! charged to a temporary arena and discarded once construction completes.

use std::mem;

use crate::arena::Arena;
use crate::array::GrowableArray;
use crate::error::{BuildError, Result};
use crate::hash::{hash_key, HashKey};
use crate::list::SegmentedList;

/// Expected key-count scale; sizes the dedup index and initial storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyScale {
    Small,
    Large,
}

impl KeyScale {
    /// Dedup index slot count (a small prime keeps `hash % slots` spread).
    fn index_size(self) -> usize {
        match self {
            KeyScale::Small => 107,
            KeyScale::Large => 10007,
        }
    }

    /// Initial per-category segment capacity.
    fn initial_capacity(self) -> usize {
        match self {
            KeyScale::Small => 4,
            KeyScale::Large => 16384,
        }
    }
}

/// Per-key registration flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyFlags {
    /// Interpret wildcard shapes (`*.`, `.*`, leading `.`). When unset the
    /// key is stored verbatim as exact.
    pub wildcard: bool,
    /// Refuse any later registration of the same key.
    pub read_only: bool,
}

impl Default for KeyFlags {
    fn default() -> Self {
        Self {
            wildcard: true,
            read_only: false,
        }
    }
}

impl KeyFlags {
    /// Verbatim keys: no wildcard interpretation at all.
    pub fn exact_only() -> Self {
        Self {
            wildcard: false,
            read_only: false,
        }
    }

    /// Wildcard-aware and locked against overrides.
    pub fn read_only() -> Self {
        Self {
            wildcard: true,
            read_only: true,
        }
    }
}

/// What to do when an overridable key is registered twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergePolicy {
    /// Replace the stored value; the registration reports `Replaced`.
    #[default]
    LastWins,
    /// Fail the second registration with a duplicate-key error.
    Reject,
}

/// Outcome of a successful [`KeyCollector::add_key`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Inserted,
    Replaced,
}

#[derive(Debug)]
struct KeyEntry<V> {
    key: String,
    key_hash: usize,
    value: V,
    read_only: bool,
}

/// One category's entries plus its chained dedup index.
///
/// Entries live in a segmented list so they never move while the index
/// refers to them; index chains are growable arrays of entry indices.
#[derive(Debug)]
struct Category<'a, V> {
    arena: &'a Arena,
    entries: SegmentedList<'a, KeyEntry<V>>,
    index: Vec<Option<GrowableArray<'a, u32>>>,
}

impl<'a, V> Category<'a, V> {
    fn new(arena: &'a Arena, scale: KeyScale) -> Result<Self> {
        let index_size = scale.index_size();
        arena.charge(index_size * mem::size_of::<Option<GrowableArray<'a, u32>>>())?;
        let mut index = Vec::with_capacity(index_size);
        index.resize_with(index_size, || None);
        Ok(Self {
            arena,
            entries: SegmentedList::new(arena, scale.initial_capacity())?,
            index,
        })
    }

    fn add(
        &mut self,
        key: &str,
        key_hash: usize,
        value: V,
        read_only: bool,
        policy: MergePolicy,
    ) -> Result<AddOutcome> {
        let slot = key_hash % self.index.len();
        if let Some(chain) = self.index[slot].as_ref() {
            for &entry_index in chain.as_slice() {
                let entry = match self.entries.get_mut(entry_index as usize) {
                    Some(entry) => entry,
                    None => continue,
                };
                if entry.key != key {
                    continue;
                }
                return if entry.read_only && read_only {
                    Err(BuildError::DuplicateKey(key.to_string()))
                } else if entry.read_only != read_only {
                    Err(BuildError::IncompatibleKeyFlags(key.to_string()))
                } else {
                    match policy {
                        MergePolicy::LastWins => {
                            entry.value = value;
                            Ok(AddOutcome::Replaced)
                        }
                        MergePolicy::Reject => Err(BuildError::DuplicateKey(key.to_string())),
                    }
                };
            }
        }

        self.arena.charge(key.len())?;
        let entry_index = self.entries.len() as u32;
        self.entries.push(KeyEntry {
            key: key.to_string(),
            key_hash,
            value,
            read_only,
        })?;
        if self.index[slot].is_none() {
            self.index[slot] = Some(GrowableArray::create(self.arena, 4)?);
        }
        if let Some(chain) = self.index[slot].as_mut() {
            chain.push(entry_index)?;
        }
        Ok(AddOutcome::Inserted)
    }

    fn into_keys(self) -> Vec<HashKey<V>> {
        self.entries
            .into_iter()
            .map(|entry| HashKey {
                key: entry.key,
                key_hash: entry.key_hash,
                value: entry.value,
            })
            .collect()
    }
}

/// Normalized, deduplicated key sets produced by [`KeyCollector::finish`].
#[derive(Debug)]
pub struct CollectedKeys<V> {
    pub exact: Vec<HashKey<V>>,
    /// Head wildcards in canonical reversed-label form (`com.example.`).
    pub wc_head: Vec<HashKey<V>>,
    /// Tail wildcards in canonical dot-terminated form (`www.example.`).
    pub wc_tail: Vec<HashKey<V>>,
}

/// Accumulates candidate keys during the build phase.
pub struct KeyCollector<'a, V> {
    policy: MergePolicy,
    exact: Category<'a, V>,
    wc_head: Category<'a, V>,
    wc_tail: Category<'a, V>,
}

impl<'a, V: Clone> KeyCollector<'a, V> {
    /// Create a collector whose storage is charged to `temp`.
    pub fn new(temp: &'a Arena, scale: KeyScale) -> Result<Self> {
        Ok(Self {
            policy: MergePolicy::default(),
            exact: Category::new(temp, scale)?,
            wc_head: Category::new(temp, scale)?,
            wc_tail: Category::new(temp, scale)?,
        })
    }

    /// Choose duplicate handling for overridable keys.
    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Register one key.
    ///
    /// Shape decides the category: `*.rest` is a head wildcard, `rest.*` a
    /// tail wildcard, `.rest` registers `rest` both exactly and as a head
    /// wildcard, anything else is exact. All bytes are lowercased first;
    /// wildcards are stored in canonical dot-terminated label order.
    pub fn add_key(&mut self, key: &str, value: V, flags: KeyFlags) -> Result<AddOutcome> {
        if key.is_empty() {
            return Err(BuildError::InvalidKey(key.to_string()));
        }
        let lower = key.to_lowercase();

        if !flags.wildcard {
            let key_hash = hash_key(lower.as_bytes());
            return self
                .exact
                .add(&lower, key_hash, value, flags.read_only, self.policy);
        }

        if let Some(rest) = lower.strip_prefix("*.") {
            if !valid_name(rest) {
                return Err(BuildError::InvalidKey(key.to_string()));
            }
            let canonical = reverse_labels(rest);
            let key_hash = hash_key(canonical.as_bytes());
            return self
                .wc_head
                .add(&canonical, key_hash, value, flags.read_only, self.policy);
        }

        if let Some(rest) = lower.strip_suffix(".*") {
            if !valid_name(rest) {
                return Err(BuildError::InvalidKey(key.to_string()));
            }
            let mut canonical = String::with_capacity(rest.len() + 1);
            canonical.push_str(rest);
            canonical.push('.');
            let key_hash = hash_key(canonical.as_bytes());
            return self
                .wc_tail
                .add(&canonical, key_hash, value, flags.read_only, self.policy);
        }

        if let Some(rest) = lower.strip_prefix('.') {
            // ".example.com" covers the domain itself and every subdomain:
            // one exact entry plus one head wildcard sharing the value.
            if !valid_name(rest) {
                return Err(BuildError::InvalidKey(key.to_string()));
            }
            let outcome = self.exact.add(
                rest,
                hash_key(rest.as_bytes()),
                value.clone(),
                flags.read_only,
                self.policy,
            )?;
            let canonical = reverse_labels(rest);
            self.wc_head.add(
                &canonical,
                hash_key(canonical.as_bytes()),
                value,
                flags.read_only,
                self.policy,
            )?;
            return Ok(outcome);
        }

        if lower.contains('*') {
            return Err(BuildError::InvalidKey(key.to_string()));
        }
        let key_hash = hash_key(lower.as_bytes());
        self.exact
            .add(&lower, key_hash, value, flags.read_only, self.policy)
    }

    /// Hand the normalized key sets to the builders.
    pub fn finish(self) -> CollectedKeys<V> {
        CollectedKeys {
            exact: self.exact.into_keys(),
            wc_head: self.wc_head.into_keys(),
            wc_tail: self.wc_tail.into_keys(),
        }
    }
}

/// A usable domain body: non-empty labels, no stray `*`.
fn valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('*')
        && !name.starts_with('.')
        && !name.ends_with('.')
        && !name.contains("..")
}

/// Reversed-label canonical form: `example.com` → `com.example.`.
fn reverse_labels(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 1);
    for label in name.rsplit('.') {
        out.push_str(label);
        out.push('.');
    }
    out
}
