//! Build-once, read-many host lookup tables.
//!
//! This library provides the immutable lookup layer of a network server:
//! configuration-time code collects keys, builds the tables, then hands them
//! to request handlers for lock-free reads with zero allocation per lookup.
//!
//! - Exact keys (`www.example.com`)
//! - Head wildcards (`*.example.com`), matched suffix-first with
//!   longest-match precedence
//! - Tail wildcards (`www.example.*`), matched prefix-first
//! - A combined table querying the three tiers in fixed priority order
//!
//! Supporting containers (an arena-budgeted growable array and a segmented
//! append-only list) back the collection phase, whose scratch lives in a
//! temporary arena that goes away once construction completes.
//!
//! # Example
//!
//! ```rust
//! use hostmap::{Arena, CombinedTable, HashInit, KeyCollector, KeyFlags, KeyScale};
//!
//! let arena = Arena::unbounded();
//! let temp = Arena::unbounded();
//!
//! let mut keys = KeyCollector::new(&temp, KeyScale::Small).unwrap();
//! keys.add_key("www.example.com", "site", KeyFlags::default()).unwrap();
//! keys.add_key("*.example.com", "tenant", KeyFlags::default()).unwrap();
//! keys.add_key("static.cdn.*", "edge", KeyFlags::default()).unwrap();
//!
//! let init = HashInit::new("virtual_hosts", &arena, &temp);
//! let hosts = CombinedTable::build(&init, keys.finish()).unwrap();
//!
//! assert_eq!(hosts.find("www.example.com"), Some(&"site"));
//! assert_eq!(hosts.find("api.example.com"), Some(&"tenant"));
//! assert_eq!(hosts.find("static.cdn.org"), Some(&"edge"));
//! assert_eq!(hosts.find("other.net"), None);
//! ```
//!
//! # Key shapes
//!
//! | Shape | Example | Meaning |
//! |-------|---------|---------|
//! | Exact | `example.com` | Matches only `example.com` |
//! | Head wildcard | `*.example.com` | Matches the domain's subdomains (and the domain) |
//! | Leading dot | `.example.com` | Shorthand for exact + head wildcard |
//! | Tail wildcard | `www.example.*` | Matches one trailing label |
//!
//! Keys are lowercased on registration and lookups are case-insensitive.
//! Construction is single-threaded and synchronous; the finished tables are
//! frozen and need no synchronization for concurrent reads.

pub mod arena;
pub mod array;
pub mod collect;
pub mod combined;
pub mod error;
pub mod hash;
pub mod list;
pub mod wildcard;

// Re-export commonly used items
pub use arena::Arena;
pub use array::GrowableArray;
pub use collect::{AddOutcome, CollectedKeys, KeyCollector, KeyFlags, KeyScale, MergePolicy};
pub use combined::CombinedTable;
pub use error::{BuildError, Result};
pub use hash::{hash_key, HashInit, HashKey, HashTable, DEFAULT_BUCKET_SIZE, DEFAULT_MAX_SIZE};
pub use list::SegmentedList;
pub use wildcard::{WildcardNode, WildcardSlot};
