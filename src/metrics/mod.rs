//! Operation counters for the ordered and bounded maps.
//!
//! Compiled only with the `metrics` feature. Recording is split from reading:
//! the maps write through the recorder traits in [`traits`], and callers read
//! plain-data snapshots from [`snapshot`].

pub mod cell;
pub mod metrics_impl;
pub mod snapshot;
pub mod traits;
