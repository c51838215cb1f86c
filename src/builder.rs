//! Builder for both map flavours.
//!
//! Collects the two sizing knobs in one place so callers do not have to
//! remember which constructor takes which argument.
//!
//! ## Example
//!
//! ```rust
//! use seqcache::builder::MapBuilder;
//!
//! let mut lru = MapBuilder::new()
//!     .maximum_size(2)
//!     .build_lru::<u64, String>();
//! lru.set(1, "one".to_string());
//! lru.set(2, "two".to_string());
//! lru.set(3, "three".to_string());
//! assert_eq!(lru.len(), 2);
//!
//! let ordered = MapBuilder::new()
//!     .initial_capacity(64)
//!     .build_sequenced::<u64, String>();
//! assert!(ordered.is_empty());
//! ```

use crate::error::ConfigError;
use crate::map::sequenced::SequencedMap;
use crate::policy::lru::{DEFAULT_MAXIMUM_SIZE, LruMap};

/// Sizing configuration for [`SequencedMap`] and [`LruMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MapBuilder {
    initial_capacity: Option<usize>,
    maximum_size: usize,
}

impl MapBuilder {
    pub fn new() -> Self {
        Self {
            initial_capacity: None,
            maximum_size: DEFAULT_MAXIMUM_SIZE,
        }
    }

    /// Pre-allocation hint for the key index and node arena.
    pub fn initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = Some(capacity);
        self
    }

    /// Entry bound for [`build_lru`](Self::build_lru). Ignored by
    /// [`build_sequenced`](Self::build_sequenced).
    pub fn maximum_size(mut self, maximum_size: usize) -> Self {
        self.maximum_size = maximum_size;
        self
    }

    /// Builds an unbounded ordered map.
    pub fn build_sequenced<K, V>(self) -> SequencedMap<K, V> {
        SequencedMap::with_capacity(self.initial_capacity.unwrap_or(0))
    }

    /// Builds a bounded map. An `initial_capacity` above `maximum_size` is
    /// clamped; use [`try_build_lru`](Self::try_build_lru) to reject it.
    pub fn build_lru<K, V>(self) -> LruMap<K, V> {
        match self.initial_capacity {
            Some(capacity) => LruMap::with_capacity(self.maximum_size, capacity),
            None => LruMap::new(self.maximum_size),
        }
    }

    /// Like [`build_lru`](Self::build_lru) but fails on an `initial_capacity`
    /// larger than `maximum_size`.
    pub fn try_build_lru<K, V>(self) -> Result<LruMap<K, V>, ConfigError> {
        if let Some(capacity) = self.initial_capacity {
            if capacity > self.maximum_size {
                return Err(ConfigError::new(format!(
                    "initial_capacity ({capacity}) exceeds maximum_size ({})",
                    self.maximum_size
                )));
            }
        }
        Ok(self.build_lru())
    }
}

impl Default for MapBuilder {
    fn default() -> Self {
        Self::new()
    }
}
