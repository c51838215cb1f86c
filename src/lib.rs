//! seqcache: an insertion-ordered hash map with fail-fast cursors, and a
//! bounded LRU map built on top of it.
//!
//! - [`map::SequencedMap`]: O(1) lookup, insert, update and removal, with
//!   iteration from the oldest write to the newest.
//! - [`policy::lru::LruMap`]: the same map with a maximum size; reads touch,
//!   and the oldest entry is evicted when a new key does not fit.
//!
//! ```
//! use seqcache::prelude::*;
//!
//! let mut map = SequencedMap::new();
//! map.set("a", 1);
//! map.set("b", 2);
//!
//! let mut keys = map.key_cursor();
//! assert_eq!(keys.next(&map), Ok(Some(&"a")));
//! map.set("c", 3);
//! assert!(keys.next(&map).is_err());
//! ```

pub mod builder;
pub mod ds;
pub mod error;
pub mod map;
pub mod policy;

#[cfg(feature = "metrics")]
pub mod metrics;

pub mod prelude;
pub mod traits;
