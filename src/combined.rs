//! Combined three-tier lookup table.

use crate::collect::CollectedKeys;
use crate::error::Result;
use crate::hash::{hash_key, HashInit, HashTable};
use crate::wildcard::WildcardNode;

/// Exact, head-wildcard, and tail-wildcard tables queried in that fixed
/// order: an exact key always beats a wildcard. Built once; safe for
/// concurrent reads from any number of request handlers afterwards.
#[derive(Debug)]
pub struct CombinedTable<V> {
    exact: HashTable<V>,
    wc_head: Option<WildcardNode<V>>,
    wc_tail: Option<WildcardNode<V>>,
}

impl<V> CombinedTable<V> {
    /// Build all three tiers from collected keys. Wildcard tiers are only
    /// materialized when their key sets are non-empty.
    pub fn build(init: &HashInit<'_>, keys: CollectedKeys<V>) -> Result<Self> {
        let exact = init.build(keys.exact)?;
        let wc_head = init.build_wildcard(keys.wc_head)?;
        let wc_tail = init.build_wildcard(keys.wc_tail)?;
        Ok(Self {
            exact,
            wc_head,
            wc_tail,
        })
    }

    /// Look up `name`: exact match first, then head wildcards, then tail
    /// wildcards; the first hit wins.
    ///
    /// Tables store lowercase keys. Mixed-case input is normalized here,
    /// allocating only when an uppercase byte is actually present.
    pub fn find(&self, name: &str) -> Option<&V> {
        let lowered;
        let name = if name.bytes().any(|b| b.is_ascii_uppercase()) {
            lowered = name.to_lowercase();
            lowered.as_str()
        } else {
            name
        };

        if let Some(value) = self.exact.find(hash_key(name.as_bytes()), name.as_bytes()) {
            return Some(value);
        }
        if let Some(node) = &self.wc_head {
            if let Some(value) = node.find_wc_head(name) {
                return Some(value);
            }
        }
        if let Some(node) = &self.wc_tail {
            if let Some(value) = node.find_wc_tail(name) {
                return Some(value);
            }
        }
        None
    }

    pub fn exact(&self) -> &HashTable<V> {
        &self.exact
    }

    pub fn wc_head(&self) -> Option<&WildcardNode<V>> {
        self.wc_head.as_ref()
    }

    pub fn wc_tail(&self) -> Option<&WildcardNode<V>> {
        self.wc_tail.as_ref()
    }
}
