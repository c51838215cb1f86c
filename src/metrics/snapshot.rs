//! Plain-data copies of the live counters.

/// Snapshot of [`SequencedMap`](crate::map::SequencedMap) counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SequencedMapMetricsSnapshot {
    pub set_new: u64,
    pub set_updates: u64,
    pub removes_found: u64,
    pub removes_missing: u64,
    pub touches: u64,
    pub clears: u64,
    pub cursors_created: u64,
    pub cursor_invalidations: u64,

    pub len: usize,
    pub revision: u64,
}

/// Snapshot of [`LruMap`](crate::policy::lru::LruMap) counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LruMapMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub insert_rejected: u64,

    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub capacity_shrinks: u64,
    pub clears: u64,

    pub pop_lru_calls: u64,
    pub pop_lru_found: u64,
    pub touch_calls: u64,
    pub touch_found: u64,
    pub peek_calls: u64,
    pub peek_hits: u64,
    pub recency_rank_calls: u64,
    pub recency_rank_found: u64,
    pub recency_rank_scan_steps: u64,

    pub map: SequencedMapMetricsSnapshot,
    pub maximum_size: usize,
}

impl LruMapMetricsSnapshot {
    /// Fraction of `get` calls that found their key; `0.0` before any call.
    pub fn hit_rate(&self) -> f64 {
        if self.get_calls == 0 {
            0.0
        } else {
            self.get_hits as f64 / self.get_calls as f64
        }
    }
}
