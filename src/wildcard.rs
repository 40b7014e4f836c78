//! Wildcard domain tables.
//!
//! Wildcard keys arrive in canonical form: labels reversed for head
//! wildcards (`*.example.com` → `com.example.`), kept in order for tail
//! wildcards (`www.example.*` → `www.example.`), always dot-terminated.
//! Construction consumes canonical labels left-to-right either way, so one
//! recursive builder serves both kinds; only the lookup direction differs.

use crate::array::GrowableArray;
use crate::error::{BuildError, Result};
use crate::hash::{hash_key, HashInit, HashKey, HashTable};

/// Value slot of one wildcard table element.
///
/// The discriminant keeps the three cases unambiguous: a wildcard that ends
/// at this label, one that continues deeper, or both at once (the terminal
/// then backs up the deeper walk).
#[derive(Debug)]
pub enum WildcardSlot<V> {
    Terminal(V),
    Nested(WildcardNode<V>),
    Both(V, WildcardNode<V>),
}

/// One level of a wildcard trie: a static table keyed by domain label.
///
/// Nodes form a tree; each nested node is owned by its parent's slot and
/// freed with the root.
#[derive(Debug)]
pub struct WildcardNode<V> {
    table: HashTable<WildcardSlot<V>>,
}

impl<'a> HashInit<'a> {
    /// Build a wildcard trie from one category's canonical keys.
    ///
    /// Returns `None` for an empty key set so callers can skip the walk
    /// entirely.
    pub fn build_wildcard<V>(&self, keys: Vec<HashKey<V>>) -> Result<Option<WildcardNode<V>>> {
        if keys.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.wildcard_node(keys)?))
    }

    fn wildcard_node<V>(&self, mut keys: Vec<HashKey<V>>) -> Result<WildcardNode<V>> {
        // Sorting makes equal-first-label groups contiguous ('.' sorts below
        // any label byte).
        keys.sort_by(|a, b| a.key.cmp(&b.key));

        let mut slots = GrowableArray::create(self.temp, keys.len())?;
        let mut label: Option<String> = None;
        let mut terminal: Option<V> = None;
        let mut deeper = GrowableArray::create(self.temp, 4)?;

        for key in keys {
            let (first, rest) = match key.key.split_once('.') {
                Some((first, rest)) => (first.to_string(), rest.to_string()),
                None => (key.key.clone(), String::new()),
            };
            if label.as_deref() != Some(first.as_str()) {
                if let Some(done) = label.take() {
                    let group = std::mem::replace(
                        &mut deeper,
                        GrowableArray::create(self.temp, 4)?,
                    );
                    slots.push(self.close_group(done, terminal.take(), group)?)?;
                }
                label = Some(first);
            }
            if rest.is_empty() {
                // The wildcard terminates exactly here.
                terminal = Some(key.value);
            } else {
                deeper.push(HashKey {
                    key_hash: hash_key(rest.as_bytes()),
                    key: rest,
                    value: key.value,
                })?;
            }
        }
        if let Some(done) = label {
            slots.push(self.close_group(done, terminal, deeper)?)?;
        }

        let table = self.build(slots.into_vec())?;
        Ok(WildcardNode { table })
    }

    fn close_group<V>(
        &self,
        label: String,
        terminal: Option<V>,
        deeper: GrowableArray<'_, HashKey<V>>,
    ) -> Result<HashKey<WildcardSlot<V>>> {
        let deeper = deeper.into_vec();
        let slot = match (terminal, deeper.is_empty()) {
            (Some(v), true) => WildcardSlot::Terminal(v),
            (Some(v), false) => WildcardSlot::Both(v, self.wildcard_node(deeper)?),
            (None, false) => WildcardSlot::Nested(self.wildcard_node(deeper)?),
            (None, true) => return Err(BuildError::InvalidKey(label)),
        };
        Ok(HashKey {
            key_hash: hash_key(label.as_bytes()),
            key: label,
            value: slot,
        })
    }
}

impl<V> WildcardNode<V> {
    /// Match `name` against head wildcards, walking labels from the domain
    /// suffix leftward.
    ///
    /// A terminal covers any remaining depth, including none, and the
    /// deepest applicable terminal wins; a `Both` slot records its terminal
    /// as the fallback before descending.
    pub fn find_wc_head(&self, name: &str) -> Option<&V> {
        let mut node = self;
        let mut best = None;
        let mut labels = name.rsplit('.').peekable();
        while let Some(label) = labels.next() {
            if label.is_empty() {
                return best;
            }
            let slot = match node.table.find(hash_key(label.as_bytes()), label.as_bytes()) {
                Some(slot) => slot,
                None => return best,
            };
            match slot {
                WildcardSlot::Terminal(v) => return Some(v),
                WildcardSlot::Nested(nested) => {
                    if labels.peek().is_none() {
                        return best;
                    }
                    node = nested;
                }
                WildcardSlot::Both(v, nested) => {
                    if labels.peek().is_none() {
                        return Some(v);
                    }
                    best = Some(v);
                    node = nested;
                }
            }
        }
        best
    }

    /// Match `name` against tail wildcards, walking labels left-to-right.
    ///
    /// The trailing `*` spans exactly one label: a terminal applies only
    /// when one query label remains, so an extra trailing label misses.
    pub fn find_wc_tail(&self, name: &str) -> Option<&V> {
        let mut node = self;
        let mut best = None;
        let mut labels = name.split('.');
        while let Some(label) = labels.next() {
            if label.is_empty() {
                return best;
            }
            let slot = match node.table.find(hash_key(label.as_bytes()), label.as_bytes()) {
                Some(slot) => slot,
                None => return best,
            };
            let remaining = labels.clone().count();
            match slot {
                WildcardSlot::Terminal(v) => {
                    return if remaining == 1 { Some(v) } else { best };
                }
                WildcardSlot::Nested(nested) => {
                    if remaining == 0 {
                        return best;
                    }
                    node = nested;
                }
                WildcardSlot::Both(v, nested) => {
                    if remaining == 1 {
                        best = Some(v);
                    }
                    if remaining == 0 {
                        return best;
                    }
                    node = nested;
                }
            }
        }
        best
    }
}
