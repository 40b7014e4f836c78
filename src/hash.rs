//! Static exact-match hash table.
//!
//! Tables are laid out once by [`HashInit::build`] and never mutated again.
//! Each bucket is a contiguous run of elements; the builder searches for the
//! smallest bucket count whose per-bucket byte footprint stays within
//! `bucket_size`, so lookups touch one short, cache-friendly run.

use std::mem;

use tracing::debug;

use crate::arena::Arena;
use crate::error::{BuildError, Result};

/// Default upper bound on the bucket count search.
pub const DEFAULT_MAX_SIZE: usize = 512;

/// Default byte budget for one bucket's element run.
pub const DEFAULT_BUCKET_SIZE: usize = 64;

const PTR_SIZE: usize = mem::size_of::<usize>();

/// Rolling hash over raw bytes: `h = h * 31 + byte`, starting at 0.
///
/// Callers hash lowercase bytes; the tables store keys lowercased, so mixed
/// case must be normalized before hashing.
pub fn hash_key(data: &[u8]) -> usize {
    let mut key = 0usize;
    for &b in data {
        key = key.wrapping_mul(31).wrapping_add(b as usize);
    }
    key
}

/// Byte footprint one element contributes to its bucket: a pointer-aligned
/// header (value pointer plus a short length field) followed by the key
/// bytes.
fn elt_footprint(key_len: usize) -> usize {
    let unaligned = PTR_SIZE + 2 + key_len;
    (unaligned + PTR_SIZE - 1) & !(PTR_SIZE - 1)
}

/// One key scheduled for table construction.
#[derive(Debug, Clone)]
pub struct HashKey<V> {
    /// Lowercase key bytes.
    pub key: String,
    /// Precomputed [`hash_key`] of `key`.
    pub key_hash: usize,
    pub value: V,
}

impl<V> HashKey<V> {
    pub fn new(key: impl Into<String>, value: V) -> Self {
        let key = key.into();
        Self {
            key_hash: hash_key(key.as_bytes()),
            key,
            value,
        }
    }
}

/// Build parameters for one table.
///
/// `name` labels error messages and build logs so a failing configuration
/// points at the table that overflowed.
pub struct HashInit<'a> {
    pub name: &'static str,
    /// Largest bucket count the feasibility search will try.
    pub max_size: usize,
    /// Byte budget for one bucket, sentinel included.
    pub bucket_size: usize,
    pub arena: &'a Arena,
    /// Scratch arena for build-phase temporaries; its lifetime ends with the
    /// build.
    pub temp: &'a Arena,
}

impl<'a> HashInit<'a> {
    pub fn new(name: &'static str, arena: &'a Arena, temp: &'a Arena) -> Self {
        Self {
            name,
            max_size: DEFAULT_MAX_SIZE,
            bucket_size: DEFAULT_BUCKET_SIZE,
            arena,
            temp,
        }
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }

    pub fn with_bucket_size(mut self, bucket_size: usize) -> Self {
        self.bucket_size = bucket_size;
        self
    }

    /// Lay out an immutable table for `keys`.
    ///
    /// Finds the smallest bucket count in `[start, max_size]` where no
    /// bucket's element run outgrows `bucket_size`, then charges the arena
    /// for the bucket array and every run. Any failure aborts the whole
    /// build; no partial table escapes.
    pub fn build<V>(&self, keys: Vec<HashKey<V>>) -> Result<HashTable<V>> {
        let limit = self.bucket_size.saturating_sub(PTR_SIZE);
        for key in &keys {
            if elt_footprint(key.key.len()) + PTR_SIZE > self.bucket_size {
                return Err(BuildError::NoFeasibleBucketSize {
                    name: self.name,
                    max_size: self.max_size,
                    bucket_size: self.bucket_size,
                });
            }
        }

        let nelts = keys.len();
        let mut start = (nelts / (self.bucket_size / (2 * PTR_SIZE)).max(1)).max(1);
        if self.max_size > 10000 && nelts > 0 && self.max_size / nelts < 100 {
            // Huge key sets start near the top instead of crawling upward.
            start = self.max_size - 1000;
        }

        let mut found = None;
        let mut test = vec![0usize; self.max_size.saturating_add(1)];
        'sizes: for size in start..=self.max_size {
            for slot in test.iter_mut().take(size) {
                *slot = 0;
            }
            for key in &keys {
                let bucket = key.key_hash % size;
                test[bucket] += elt_footprint(key.key.len());
                if test[bucket] > limit {
                    continue 'sizes;
                }
            }
            found = Some(size);
            break;
        }
        let size = found.ok_or_else(|| BuildError::NoFeasibleBucketSize {
            name: self.name,
            max_size: self.max_size,
            bucket_size: self.bucket_size,
        })?;

        self.arena.charge(size * PTR_SIZE)?;
        let mut runs: Vec<Vec<HashElement<V>>> = Vec::with_capacity(size);
        runs.resize_with(size, Vec::new);
        for key in keys {
            let bucket = key.key_hash % size;
            runs[bucket].push(HashElement {
                key: key.key.into_bytes().into_boxed_slice(),
                value: key.value,
            });
        }
        for run in &runs {
            if run.is_empty() {
                continue;
            }
            let bytes: usize = run.iter().map(|e| elt_footprint(e.key.len())).sum();
            self.arena.charge(bytes + PTR_SIZE)?;
        }

        debug!(name = self.name, size, nelts, "built hash table");

        let buckets = runs
            .into_iter()
            .map(|run| {
                if run.is_empty() {
                    None
                } else {
                    Some(run.into_boxed_slice())
                }
            })
            .collect::<Vec<_>>()
            .into_boxed_slice();
        Ok(HashTable { buckets })
    }
}

#[derive(Debug)]
struct HashElement<V> {
    key: Box<[u8]>,
    value: V,
}

/// Immutable hash table: a bucket array where each occupied bucket points at
/// one contiguous element run. Safe for concurrent reads once published.
#[derive(Debug)]
pub struct HashTable<V> {
    buckets: Box<[Option<Box<[HashElement<V>]>>]>,
}

impl<V> HashTable<V> {
    /// Look up `name` with its precomputed [`hash_key`].
    ///
    /// Scans the target bucket's run with a length-then-bytes comparison.
    /// Expected O(1); worst case the occupancy of one bucket.
    pub fn find(&self, key_hash: usize, name: &[u8]) -> Option<&V> {
        let run = self.buckets[key_hash % self.buckets.len()].as_deref()?;
        run.iter()
            .find(|elt| elt.key.len() == name.len() && *elt.key == *name)
            .map(|elt| &elt.value)
    }

    /// Bucket count chosen by the builder.
    pub fn size(&self) -> usize {
        self.buckets.len()
    }
}
