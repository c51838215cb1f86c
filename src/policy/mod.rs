//! Eviction policies layered over the ordered map.

pub mod lru;

#[cfg(feature = "concurrency")]
pub use lru::ConcurrentLruMap;
pub use lru::{DEFAULT_MAXIMUM_SIZE, LruMap};
