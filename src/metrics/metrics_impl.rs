use crate::metrics::cell::MetricsCell;
use crate::metrics::traits::{
    CoreMetricsRecorder, LruMetricsReadRecorder, LruMetricsRecorder, MetricsReset,
    SequencedMetricsReadRecorder, SequencedMetricsRecorder,
};

/// Counters kept by [`SequencedMap`](crate::map::SequencedMap).
#[derive(Debug, Default, Clone)]
pub struct SequencedMapMetrics {
    pub set_new: u64,
    pub set_updates: u64,
    pub removes_found: u64,
    pub removes_missing: u64,
    pub touches: u64,
    pub clears: u64,
    pub cursors_created: MetricsCell,
    pub cursor_invalidations: MetricsCell,
}

impl SequencedMetricsRecorder for SequencedMapMetrics {
    fn record_set_new(&mut self) {
        self.set_new += 1;
    }

    fn record_set_update(&mut self) {
        self.set_updates += 1;
    }

    fn record_remove_found(&mut self) {
        self.removes_found += 1;
    }

    fn record_remove_missing(&mut self) {
        self.removes_missing += 1;
    }

    fn record_touch(&mut self) {
        self.touches += 1;
    }

    fn record_clear(&mut self) {
        self.clears += 1;
    }
}

impl SequencedMetricsReadRecorder for SequencedMapMetrics {
    fn record_cursor_created(&self) {
        self.cursors_created.incr();
    }

    fn record_cursor_invalidated(&self) {
        self.cursor_invalidations.incr();
    }
}

impl MetricsReset for SequencedMapMetrics {
    fn reset_metrics(&mut self) {
        *self = Self::default();
    }
}

/// Counters kept by [`LruMap`](crate::policy::lru::LruMap).
#[derive(Debug, Default, Clone)]
pub struct LruMapMetrics {
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
    pub peek_calls: MetricsCell,
    pub peek_hits: MetricsCell,
    pub recency_rank_calls: MetricsCell,
    pub recency_rank_found: MetricsCell,
    pub recency_rank_scan_steps: MetricsCell,
}

impl LruMapMetrics {
    pub fn record_insert_rejected(&mut self) {
        self.insert_rejected += 1;
    }
}

impl CoreMetricsRecorder for LruMapMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    fn record_evict_call(&mut self) {
        self.evict_calls += 1;
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    fn record_clear(&mut self) {
        self.clears += 1;
    }
}

impl LruMetricsRecorder for LruMapMetrics {
    fn record_pop_lru_call(&mut self) {
        self.pop_lru_calls += 1;
    }

    fn record_pop_lru_found(&mut self) {
        self.pop_lru_found += 1;
    }

    fn record_touch_call(&mut self) {
        self.touch_calls += 1;
    }

    fn record_touch_found(&mut self) {
        self.touch_found += 1;
    }

    fn record_capacity_shrink(&mut self) {
        self.capacity_shrinks += 1;
    }
}

impl LruMetricsReadRecorder for LruMapMetrics {
    fn record_peek_call(&self) {
        self.peek_calls.incr();
    }

    fn record_peek_hit(&self) {
        self.peek_hits.incr();
    }

    fn record_recency_rank_call(&self) {
        self.recency_rank_calls.incr();
    }

    fn record_recency_rank_found(&self) {
        self.recency_rank_found.incr();
    }

    fn record_recency_rank_scan_step(&self) {
        self.recency_rank_scan_steps.incr();
    }
}

impl MetricsReset for LruMapMetrics {
    fn reset_metrics(&mut self) {
        *self = Self::default();
    }
}
