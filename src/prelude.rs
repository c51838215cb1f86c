pub use crate::builder::MapBuilder;
pub use crate::ds::{SentinelRing, SlotArena, SlotId};
pub use crate::error::{ConcurrentModificationError, ConfigError, InvariantError};
pub use crate::map::{
    Cursor, EntryCursor, Iter, KeyCursor, Keys, SequencedMap, SyncRoot, ValueCursor, Values,
};
#[cfg(feature = "metrics")]
pub use crate::metrics::snapshot::{LruMapMetricsSnapshot, SequencedMapMetricsSnapshot};
#[cfg(feature = "concurrency")]
pub use crate::policy::lru::ConcurrentLruMap;
pub use crate::policy::lru::LruMap;
pub use crate::traits::{ConcurrentCache, CoreCache, LruCacheTrait, MutableCache};
