//! # Metrics Trait Hierarchy
//!
//! Recording, snapshotting, and resetting are separate, small traits so the
//! map code only ever depends on the recorder it needs.
//!
//! ## Architecture
//!
//! ```text
//!                 ┌─────────────────────────────┐
//!                 │     CoreMetricsRecorder     │
//!                 │  get_hit/get_miss/insert    │
//!                 │  evict/clear                │
//!                 └──────────────┬──────────────┘
//!                                │
//!                                ▼
//!                 ┌─────────────────────────────┐     ┌──────────────────────────┐
//!                 │     LruMetricsRecorder      │     │  LruMetricsReadRecorder  │
//!                 │  pop_lru/touch/shrink       │     │  peek/recency_rank (&self)│
//!                 └─────────────────────────────┘     └──────────────────────────┘
//!
//!   SequencedMetricsRecorder   ── ordered-map structural events
//!
//!   Consumption (decoupled from recording):
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsReset                 │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Common counters for any map with a lookup/insert/evict surface.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evict_call(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_clear(&mut self);
}

/// Structural events of the ordered map.
pub trait SequencedMetricsRecorder {
    fn record_set_new(&mut self);
    fn record_set_update(&mut self);
    fn record_remove_found(&mut self);
    fn record_remove_missing(&mut self);
    fn record_touch(&mut self);
    fn record_clear(&mut self);
}

/// Read-only ordered-map metrics for `&self` paths (interior mutability).
pub trait SequencedMetricsReadRecorder {
    fn record_cursor_created(&self);
    fn record_cursor_invalidated(&self);
}

/// Metrics for LRU behavior (recency order).
pub trait LruMetricsRecorder: CoreMetricsRecorder {
    fn record_pop_lru_call(&mut self);
    fn record_pop_lru_found(&mut self);
    fn record_touch_call(&mut self);
    fn record_touch_found(&mut self);
    fn record_capacity_shrink(&mut self);
}

/// Read-only LRU metrics for `&self` methods (e.g. `peek`, `recency_rank`).
pub trait LruMetricsReadRecorder {
    fn record_peek_call(&self);
    fn record_peek_hit(&self);
    fn record_recency_rank_call(&self);
    fn record_recency_rank_found(&self);
    fn record_recency_rank_scan_step(&self);
}

/// Produces a plain-data snapshot of the current counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Reset metrics between tests or benchmark iterations.
pub trait MetricsReset {
    fn reset_metrics(&mut self);
}
