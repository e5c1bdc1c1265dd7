//! Size Estimation
//!
//! Approximates the memory footprint of cached values so the store can
//! enforce a byte ceiling. Estimates only need to be deterministic and
//! roughly proportional; they are not exact allocations.

use serde::Serialize;

// == Size Estimator ==
/// Maps a value to an approximate byte count.
pub trait SizeEstimator<V> {
    fn estimate(&self, value: &V) -> usize;
}

/// Any `Fn(&V) -> usize` closure is an estimator.
impl<V, F> SizeEstimator<V> for F
where
    F: Fn(&V) -> usize,
{
    fn estimate(&self, value: &V) -> usize {
        self(value)
    }
}

// == JSON Size Estimator ==
/// Measures the length of the value's JSON encoding.
///
/// Values that fail to serialize count as zero bytes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSizeEstimator;

impl<V: Serialize> SizeEstimator<V> for JsonSizeEstimator {
    fn estimate(&self, value: &V) -> usize {
        serde_json::to_vec(value).map(|bytes| bytes.len()).unwrap_or(0)
    }
}
